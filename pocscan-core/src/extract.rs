use crate::model::RecordLink;
use crate::rules::{ExtractionRules, FieldRule};
use pocscan_scanner::BrowserSession;
use pocscan_scanner::error::Result;
use tracing::debug;

/// Maturity values treated as proof-of-concept code for alerting.
const FUNCTIONAL: &str = "Functional";
const PROOF_OF_CONCEPT: &str = "Proof-of-Concept";

/// Collect every record link on the loaded listing page, in document order.
///
/// Hrefs are returned verbatim; nothing is resolved or deduplicated.
pub async fn harvest_links(
    session: &mut dyn BrowserSession,
    rules: &ExtractionRules,
) -> Result<Vec<RecordLink>> {
    let anchors = session.find_elements(&rules.record_links).await?;

    Ok(anchors
        .iter()
        .filter_map(|anchor| anchor.attribute("href"))
        .map(RecordLink::new)
        .collect())
}

/// Read one field off the loaded page. Missing fields are `None`.
pub async fn read_field(session: &mut dyn BrowserSession, rule: &FieldRule) -> Result<Option<String>> {
    match rule {
        FieldRule::LabelAdjacent { cells, label } => {
            let cells = session.find_elements(cells).await?;
            let value = cells
                .iter()
                .position(|cell| cell.text().contains(label.as_str()))
                .and_then(|idx| cells.get(idx + 1))
                .map(|cell| cell.text().trim().to_string());

            if value.is_none() {
                debug!("No value found next to label '{}'", label);
            }
            Ok(value)
        }
        FieldRule::FixedPath { selector } => Ok(session
            .find_element(selector)
            .await?
            .map(|element| element.text().trim().to_string())),
    }
}

/// Functional exploit code counts as proof-of-concept; every other value
/// passes through untouched.
pub fn normalize_maturity(raw: &str) -> &str {
    if raw == FUNCTIONAL { PROOF_OF_CONCEPT } else { raw }
}

pub async fn extract_maturity(
    session: &mut dyn BrowserSession,
    rule: &FieldRule,
) -> Result<Option<String>> {
    Ok(read_field(session, rule)
        .await?
        .map(|raw| normalize_maturity(&raw).to_string()))
}

/// Whether the exploitability section marks the record as exploited. An
/// absent section reads as `false`.
pub async fn check_weaponized(session: &mut dyn BrowserSession, rule: &FieldRule) -> Result<bool> {
    Ok(read_field(session, rule)
        .await?
        .is_some_and(|value| value.eq_ignore_ascii_case("yes")))
}
