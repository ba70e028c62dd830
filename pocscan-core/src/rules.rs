// Where each logical field lives on the vendor's pages

use pocscan_scanner::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_RECORD_LINKS: &str = "a[href*='/vulnerability/CVE-']";
pub const DEFAULT_DETAIL_READY: &str = "body";
pub const DEFAULT_GRID_CELLS: &str = "div[role='gridcell']";
pub const MATURITY_LABEL: &str = "Exploit Code Maturity";
pub const DEFAULT_WEAPONIZED_PATH: &str =
    "#exploitability > div > div:nth-of-type(2) > div > dl > dd:nth-of-type(2)";

/// Strategy for reading one field off a loaded page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum FieldRule {
    /// Scan `cells` in order; the value is the cell right after the first one
    /// whose text contains `label`.
    LabelAdjacent { cells: String, label: String },
    /// The value is the text of the first element matching `selector`.
    FixedPath { selector: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// Anchors on the listing page that point at detail records.
    pub record_links: String,
    /// Present once the listing has rendered its record links.
    pub listing_ready: String,
    /// Present once a detail page has rendered.
    pub detail_ready: String,
    pub maturity: FieldRule,
    pub weaponized: FieldRule,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            record_links: DEFAULT_RECORD_LINKS.to_string(),
            listing_ready: DEFAULT_RECORD_LINKS.to_string(),
            detail_ready: DEFAULT_DETAIL_READY.to_string(),
            maturity: FieldRule::LabelAdjacent {
                cells: DEFAULT_GRID_CELLS.to_string(),
                label: MATURITY_LABEL.to_string(),
            },
            weaponized: FieldRule::FixedPath {
                selector: DEFAULT_WEAPONIZED_PATH.to_string(),
            },
        }
    }
}

impl ExtractionRules {
    /// Parse rules from JSON. Keys left out keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScanError::Config(format!("invalid rules: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| match e {
            ScanError::Config(msg) => ScanError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }
}
