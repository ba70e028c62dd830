// Console report for a finished scan

use crate::model::{ClassificationResult, MaturityLabel, ScanReport};
use colored::Colorize;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// `<link> - <label>`, plus the disclosed maturity when normalization
/// changed it.
pub fn format_result(result: &ClassificationResult) -> String {
    match result.normalized_from() {
        Some(disclosed) => format!(
            "{} - {} (disclosed: {})",
            result.link, result.label, disclosed
        ),
        None => format!("{} - {}", result.link, result.label),
    }
}

/// Line printed as soon as a record matches.
pub fn format_match_line(result: &ClassificationResult) -> String {
    format!("[MATCH] {}", format_result(result)).red().to_string()
}

pub fn generate_scan_report(report: &ScanReport) -> String {
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("# Summary:\n");
    out.push_str(&format!("  Release:          {}\n", report.listing_url));
    out.push_str(&format!(
        "  Scanned:          {} ({}s)\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        (report.finished_at - report.started_at).num_seconds()
    ));
    out.push_str(&format!("  Records found:    {}\n", report.links.len()));
    out.push_str(&format!("  Records checked:  {}\n", report.checked()));
    out.push_str(&format!(
        "  Weaponized:       {}\n",
        report.count(MaturityLabel::Weaponized)
    ));
    out.push_str(&format!(
        "  Proof-of-Concept: {}\n",
        report.count(MaturityLabel::ProofOfConcept)
    ));
    if !report.failures.is_empty() {
        out.push_str(&format!("  Failed:           {}\n", report.failures.len()));
    }
    out.push_str(RULE);
    out.push_str("\n\n");

    out.push_str("[RESULTS] CVEs with Proof-of-Concept or Weaponized status:\n");
    if report.matches.is_empty() {
        out.push_str("  (none)\n");
    }
    for result in &report.matches {
        out.push_str(&format!("{}\n", format_result(result).red()));
    }

    if !report.failures.is_empty() {
        out.push_str("\n[ERRORS] Records that could not be checked:\n");
        for failure in &report.failures {
            out.push_str(&format!(
                "{}\n",
                format!("{} - {}", failure.link, failure.error).yellow()
            ));
        }
    }

    out
}
