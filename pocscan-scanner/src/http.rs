use crate::document;
use crate::error::{Result, ScanError};
use crate::session::{BrowserSession, ElementSnapshot};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Session over plain HTTP. Holds the body of the last page fetched and
/// answers selector queries against it.
pub struct HttpSession {
    client: Client,
    current_url: Option<Url>,
    body: Option<String>,
}

impl HttpSession {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("pocscan/0.1 (https://github.com/trapdoorsec/pocscan)")
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            current_url: None,
            body: None,
        })
    }

    /// URL of the last page fetched, after redirects.
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_ref().map(Url::as_str)
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let parsed = Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
        debug!("Fetching {}", parsed);

        let start = Instant::now();
        let response = self.client.get(parsed).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ScanError::Navigation {
                url: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await?;
        debug!(
            "Fetched {} ({} bytes in {:?})",
            final_url,
            body.len(),
            start.elapsed()
        );

        self.current_url = Some(final_url);
        self.body = Some(body);
        Ok(())
    }

    async fn find_elements(&mut self, selector: &str) -> Result<Vec<ElementSnapshot>> {
        match self.body {
            Some(ref body) => document::select_snapshots(body, selector, self.current_url.as_ref()),
            None => Ok(Vec::new()),
        }
    }

    async fn find_element(&mut self, selector: &str) -> Result<Option<ElementSnapshot>> {
        match self.body {
            Some(ref body) => document::select_first(body, selector, self.current_url.as_ref()),
            None => Ok(None),
        }
    }

    async fn execute_script(&mut self, script: &str) -> Result<()> {
        debug!("HTTP session does not run scripts, skipping: {}", script);
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        self.current_url = None;
        self.body = None;
        Ok(())
    }
}
