// In-memory browser session backed by canned HTML pages

#![allow(dead_code)]

use async_trait::async_trait;
use pocscan_scanner::document::{select_first, select_snapshots};
use pocscan_scanner::error::{Result, ScanError};
use pocscan_scanner::{BrowserSession, ElementSnapshot};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

pub const LISTING_URL: &str = "https://msrc.microsoft.com/update-guide/releaseNote/2025-Jan";

#[derive(Default)]
pub struct FixtureSession {
    pages: HashMap<String, String>,
    stalled: HashSet<String>,
    current: Option<String>,
    pub visited: Arc<Mutex<Vec<String>>>,
    pub scripts: Arc<Mutex<Vec<String>>>,
    pub quit_called: Arc<AtomicBool>,
}

impl FixtureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    /// Navigation to this URL never completes.
    pub fn with_stalled_page(mut self, url: &str) -> Self {
        self.stalled.insert(url.to_string());
        self
    }

    pub fn quit_flag(&self) -> Arc<AtomicBool> {
        self.quit_called.clone()
    }

    pub fn visited_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.visited.clone()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn current_html(&self) -> Option<&String> {
        self.current.as_ref().and_then(|url| self.pages.get(url))
    }
}

#[async_trait]
impl BrowserSession for FixtureSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        if self.stalled.contains(url) {
            std::future::pending::<()>().await;
        }
        if !self.pages.contains_key(url) {
            return Err(ScanError::Navigation {
                url: url.to_string(),
                reason: "HTTP 404".to_string(),
            });
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn find_elements(&mut self, selector: &str) -> Result<Vec<ElementSnapshot>> {
        match self.current_html() {
            Some(html) => select_snapshots(html, selector, None),
            None => Ok(Vec::new()),
        }
    }

    async fn find_element(&mut self, selector: &str) -> Result<Option<ElementSnapshot>> {
        match self.current_html() {
            Some(html) => select_first(html, selector, None),
            None => Ok(None),
        }
    }

    async fn execute_script(&mut self, script: &str) -> Result<()> {
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        self.quit_called.store(true, Ordering::SeqCst);
        self.current = None;
        Ok(())
    }
}

pub fn record_url(id: &str) -> String {
    format!("https://msrc.microsoft.com/update-guide/vulnerability/{}", id)
}

/// Listing page linking to each record, with some unrelated anchors mixed in.
pub fn listing_page(ids: &[&str]) -> String {
    let mut html = String::from(
        r#"<html><body><nav><a href="https://msrc.microsoft.com/update-guide/faq">FAQ</a></nav><div role="grid">"#,
    );
    for id in ids {
        html.push_str(&format!(
            r#"<div role="row"><a href="{}">{}</a></div>"#,
            record_url(id),
            id
        ));
    }
    html.push_str("</div></body></html>");
    html
}

/// Detail page with an optional maturity cell and an optional exploitability
/// section carrying the "Exploited" answer.
pub fn detail_page(maturity: Option<&str>, exploited: Option<&str>) -> String {
    let mut html = String::from(
        r#"<html><body><div role="grid">
            <div role="gridcell">Attack Vector</div><div role="gridcell">Network</div>
            <div role="gridcell">Attack Complexity</div><div role="gridcell">Low</div>"#,
    );
    if let Some(maturity) = maturity {
        html.push_str(&format!(
            r#"<div role="gridcell">Exploit Code Maturity</div><div role="gridcell"> {} </div>"#,
            maturity
        ));
    }
    html.push_str("</div>");

    if let Some(exploited) = exploited {
        html.push_str(&format!(
            r#"<section id="exploitability">
                <div>
                    <div><h3>Exploitability</h3></div>
                    <div>
                        <div>
                            <dl>
                                <dt>Publicly disclosed</dt><dd>No</dd>
                                <dt>Exploited</dt><dd>{}</dd>
                                <dt>Latest Software Release</dt><dd>Exploitation Less Likely</dd>
                            </dl>
                        </div>
                    </div>
                </div>
            </section>"#,
            exploited
        ));
    }

    html.push_str("</body></html>");
    html
}
