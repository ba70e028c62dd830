use crate::document::collapse_whitespace;
use crate::error::{Result, ScanError};
use crate::session::{BrowserOptions, BrowserSession, ElementSnapshot};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde_json::Value;
use std::collections::HashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Flags passed to every Chrome launch. The advisory portal serves a reduced
/// page to clients that advertise automation.
pub const DEFAULT_CHROME_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--ignore-certificate-errors",
    "--disable-dev-shm-usage",
];

/// One Chrome tab driven over the DevTools protocol.
pub struct ChromeSession {
    browser: Option<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromeSession {
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(options.request_timeout);

        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(ref executable) = options.chrome_executable {
            builder = builder.chrome_executable(executable);
        }
        for arg in DEFAULT_CHROME_ARGS {
            builder = builder.arg(*arg);
        }
        for arg in &options.extra_args {
            builder = builder.arg(arg.as_str());
        }

        let config = builder.build().map_err(ScanError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScanError::Launch(e.to_string()))?;

        // The CDP connection only makes progress while its handler is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
            debug!("CDP handler finished");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(ScanError::Launch(e.to_string()));
            }
        };

        info!("Chrome session ready");
        Ok(Self {
            browser: Some(browser),
            page,
            handler_task,
        })
    }

    async fn snapshot(element: &Element) -> Result<ElementSnapshot> {
        let text = element.inner_text().await?.unwrap_or_default();

        // CDP reports attributes as a flat [name, value, name, value, ...] list
        let flat = element.attributes().await?;
        let mut attributes: HashMap<String, String> = flat
            .chunks(2)
            .filter_map(|pair| match pair {
                [name, value] => Some((name.clone(), value.clone())),
                _ => None,
            })
            .collect();

        // Report the resolved link, not the literal attribute
        if attributes.contains_key("href")
            && let Some(Value::String(resolved)) = element.property("href").await?
        {
            attributes.insert("href".to_string(), resolved);
        }

        Ok(ElementSnapshot::new(
            collapse_whitespace(std::iter::once(text.as_str())),
            attributes,
        ))
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.page.goto(url).await.map_err(|e| ScanError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    async fn find_elements(&mut self, selector: &str) -> Result<Vec<ElementSnapshot>> {
        let elements = self.page.find_elements(selector).await?;
        let mut snapshots = Vec::with_capacity(elements.len());
        for element in &elements {
            snapshots.push(Self::snapshot(element).await?);
        }
        Ok(snapshots)
    }

    async fn find_element(&mut self, selector: &str) -> Result<Option<ElementSnapshot>> {
        // querySelectorAll yields an empty list for no match, where
        // querySelector would surface an error
        let elements = self.page.find_elements(selector).await?;
        match elements.first() {
            Some(element) => Ok(Some(Self::snapshot(element).await?)),
            None => Ok(None),
        }
    }

    async fn execute_script(&mut self, script: &str) -> Result<()> {
        self.page.evaluate(script).await?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        info!("Closing Chrome session");
        let closed = browser.close().await;
        if let Err(ref e) = closed {
            // A dead CDP connection leaves the child running; wait() would hang on it
            warn!("Close command failed, killing Chrome: {}", e);
            if let Some(Err(e)) = browser.kill().await {
                warn!("Failed to kill Chrome: {}", e);
            }
        }
        if let Err(e) = browser.wait().await {
            warn!("Chrome process did not exit cleanly: {}", e);
        }
        self.handler_task.abort();

        closed.map(|_| ()).map_err(ScanError::from)
    }
}
