use chrono::{DateTime, Utc};
use std::fmt;

/// Link to one vulnerability detail record, kept exactly as harvested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordLink(String);

impl RecordLink {
    pub fn new(href: impl Into<String>) -> Self {
        Self(href.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `CVE-…` segment of the link, if it has one.
    pub fn record_id(&self) -> Option<&str> {
        let (_, tail) = self.0.rsplit_once("/vulnerability/")?;
        let id = tail.split(['/', '?', '#']).next()?;
        id.starts_with("CVE-").then_some(id)
    }
}

impl fmt::Display for RecordLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaturityLabel {
    ProofOfConcept,
    Weaponized,
}

impl MaturityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaturityLabel::ProofOfConcept => "Proof-of-Concept",
            MaturityLabel::Weaponized => "Weaponized",
        }
    }
}

impl fmt::Display for MaturityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that matched, with the maturity text as the vendor disclosed it
/// before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub link: RecordLink,
    pub label: MaturityLabel,
    pub disclosed_maturity: Option<String>,
}

impl ClassificationResult {
    pub fn new(link: RecordLink, label: MaturityLabel, disclosed_maturity: Option<String>) -> Self {
        Self {
            link,
            label,
            disclosed_maturity,
        }
    }

    /// Disclosed maturity, only when normalization changed it.
    pub fn normalized_from(&self) -> Option<&str> {
        self.disclosed_maturity
            .as_deref()
            .filter(|disclosed| *disclosed != MaturityLabel::ProofOfConcept.as_str())
    }
}

/// A record whose page could not be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub link: RecordLink,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct ScanReport {
    pub listing_url: String,
    pub links: Vec<RecordLink>,
    pub matches: Vec<ClassificationResult>,
    pub failures: Vec<RecordFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn count(&self, label: MaturityLabel) -> usize {
        self.matches.iter().filter(|m| m.label == label).count()
    }

    pub fn checked(&self) -> usize {
        self.links.len().saturating_sub(self.failures.len())
    }
}
