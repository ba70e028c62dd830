use crate::chrome::ChromeSession;
use crate::error::Result;
use crate::http::HttpSession;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Owned copy of an element's rendered text and attributes.
///
/// Snapshots are taken at query time, so they stay valid after the session
/// navigates elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    text: String,
    attributes: HashMap<String, String>,
}

impl ElementSnapshot {
    pub fn new(text: impl Into<String>, attributes: HashMap<String, String>) -> Self {
        Self {
            text: text.into(),
            attributes,
        }
    }

    /// Visible text with runs of whitespace collapsed to single spaces.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A single browser tab driven by the scan.
///
/// Selectors are CSS. Lookups that match nothing are not errors: `find_elements`
/// returns an empty list and `find_element` returns `None`.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn find_elements(&mut self, selector: &str) -> Result<Vec<ElementSnapshot>>;

    async fn find_element(&mut self, selector: &str) -> Result<Option<ElementSnapshot>>;

    async fn execute_script(&mut self, script: &str) -> Result<()>;

    /// Release the underlying browser. Calling it twice is a no-op.
    async fn quit(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Headless Chrome over the DevTools protocol; runs page scripts.
    Chrome,
    /// Plain HTTP fetch of server-rendered HTML; no scripts.
    Http,
}

impl Backend {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Some(Backend::Chrome),
            "http" | "static" => Some(Backend::Http),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub backend: Backend,
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub extra_args: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            backend: Backend::Chrome,
            headless: true,
            chrome_executable: None,
            extra_args: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Start a session on the configured backend.
pub async fn launch_session(options: &BrowserOptions) -> Result<Box<dyn BrowserSession>> {
    match options.backend {
        Backend::Chrome => {
            info!("Launching Chrome session (headless: {})", options.headless);
            Ok(Box::new(ChromeSession::launch(options).await?))
        }
        Backend::Http => {
            info!("Starting HTTP session");
            Ok(Box::new(HttpSession::new(options.request_timeout)?))
        }
    }
}
