use crate::error::{Result, ScanError};
use crate::session::BrowserSession;
use std::time::Duration;
use tracing::debug;

/// How often readiness is re-checked while waiting on a page.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Condition over the rendered document that marks a page as loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// At least one element matches the CSS selector.
    ElementPresent(String),
}

impl Readiness {
    pub async fn is_satisfied(&self, session: &mut dyn BrowserSession) -> Result<bool> {
        match self {
            Readiness::ElementPresent(selector) => {
                Ok(session.find_element(selector).await?.is_some())
            }
        }
    }
}

/// Navigate to `url` and block until `readiness` holds.
///
/// Navigation and polling share one `timeout` budget. Running out of it yields
/// [`ScanError::Timeout`] so the caller can skip the page and carry on.
pub async fn load_page(
    session: &mut dyn BrowserSession,
    url: &str,
    readiness: &Readiness,
    timeout: Duration,
) -> Result<()> {
    match tokio::time::timeout(timeout, navigate_until_ready(session, url, readiness)).await {
        Ok(result) => result,
        Err(_) => Err(ScanError::Timeout {
            url: url.to_string(),
            waited: timeout,
        }),
    }
}

async fn navigate_until_ready(
    session: &mut dyn BrowserSession,
    url: &str,
    readiness: &Readiness,
) -> Result<()> {
    session.navigate(url).await?;
    loop {
        if readiness.is_satisfied(session).await? {
            return Ok(());
        }
        debug!("Waiting on {:?} for {}", readiness, url);
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
