use crate::classify::classify;
use crate::extract::{check_weaponized, harvest_links, normalize_maturity, read_field};
use crate::model::{ClassificationResult, RecordFailure, RecordLink, ScanReport};
use crate::rules::ExtractionRules;
use chrono::Utc;
use pocscan_scanner::error::Result;
use pocscan_scanner::{BrowserOptions, BrowserSession, Readiness, launch_session, load_page};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Scrolling to the bottom makes the portal render its lazily loaded sections.
pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Options for a single scan of one release listing
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub listing_url: String,
    /// Upper bound on loading any one page.
    pub page_timeout: Duration,
    /// Fixed pause after scrolling a detail page.
    pub settle_delay: Duration,
    pub rules: ExtractionRules,
}

impl ScanOptions {
    pub fn new(listing_url: impl Into<String>) -> Self {
        Self {
            listing_url: listing_url.into(),
            page_timeout: Duration::from_secs(15),
            settle_delay: Duration::from_secs(2),
            rules: ExtractionRules::default(),
        }
    }
}

/// Progress notifications emitted while a scan runs
#[derive(Debug, Clone)]
pub enum ScanEvent {
    LinksHarvested(usize),
    Checking {
        index: usize,
        total: usize,
        link: RecordLink,
    },
    Matched(ClassificationResult),
    RecordFailed(RecordFailure),
}

/// Callback for reporting scan progress
pub type ScanEventCallback = Arc<dyn Fn(ScanEvent) + Send + Sync>;

/// Launch a browser session and scan the listing with it.
///
/// A session that fails to start aborts the scan.
pub async fn execute_scan(
    options: &ScanOptions,
    browser: &BrowserOptions,
    callback: Option<ScanEventCallback>,
) -> Result<ScanReport> {
    let session = launch_session(browser).await?;
    run_scan(session, options, callback).await
}

/// Scan the listing with an already started session, then quit it whether
/// or not the scan succeeded.
pub async fn run_scan(
    mut session: Box<dyn BrowserSession>,
    options: &ScanOptions,
    callback: Option<ScanEventCallback>,
) -> Result<ScanReport> {
    let outcome = scan_listing(session.as_mut(), options, callback.as_ref()).await;

    if let Err(e) = session.quit().await {
        warn!("Failed to close browser session: {}", e);
    }

    outcome
}

async fn scan_listing(
    session: &mut dyn BrowserSession,
    options: &ScanOptions,
    callback: Option<&ScanEventCallback>,
) -> Result<ScanReport> {
    let started_at = Utc::now();
    let rules = &options.rules;
    let emit = |event: ScanEvent| {
        if let Some(cb) = callback {
            cb(event);
        }
    };

    info!("Loading listing {}", options.listing_url);
    load_page(
        session,
        &options.listing_url,
        &Readiness::ElementPresent(rules.listing_ready.clone()),
        options.page_timeout,
    )
    .await?;

    let links = harvest_links(session, rules).await?;
    if links.is_empty() {
        warn!("No record links found on {}", options.listing_url);
    } else {
        info!("Found {} record links", links.len());
    }
    emit(ScanEvent::LinksHarvested(links.len()));

    let mut matches = Vec::new();
    let mut failures = Vec::new();

    for (idx, link) in links.iter().enumerate() {
        emit(ScanEvent::Checking {
            index: idx + 1,
            total: links.len(),
            link: link.clone(),
        });

        match check_record(session, link, options).await {
            Ok(Some(result)) => {
                info!("{} classified as {}", link, result.label);
                emit(ScanEvent::Matched(result.clone()));
                matches.push(result);
            }
            Ok(None) => {}
            Err(e) => {
                error!("{} - {}", link, e);
                let failure = RecordFailure {
                    link: link.clone(),
                    error: e.to_string(),
                };
                emit(ScanEvent::RecordFailed(failure.clone()));
                failures.push(failure);
            }
        }
    }

    Ok(ScanReport {
        listing_url: options.listing_url.clone(),
        links,
        matches,
        failures,
        started_at,
        finished_at: Utc::now(),
    })
}

/// Load one detail page and classify it. `Ok(None)` means the record was
/// read but does not qualify.
pub async fn check_record(
    session: &mut dyn BrowserSession,
    link: &RecordLink,
    options: &ScanOptions,
) -> Result<Option<ClassificationResult>> {
    let rules = &options.rules;

    load_page(
        session,
        link.as_str(),
        &Readiness::ElementPresent(rules.detail_ready.clone()),
        options.page_timeout,
    )
    .await?;
    session.execute_script(SCROLL_TO_BOTTOM).await?;
    tokio::time::sleep(options.settle_delay).await;

    let disclosed = read_field(session, &rules.maturity).await?;
    let maturity = disclosed.as_deref().map(normalize_maturity);
    let weaponized = check_weaponized(session, &rules.weaponized).await?;

    Ok(classify(maturity, weaponized)
        .map(|label| ClassificationResult::new(link.clone(), label, disclosed.clone())))
}
