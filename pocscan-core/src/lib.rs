pub mod classify;
pub mod extract;
pub mod model;
pub mod report;
pub mod rules;
pub mod scan;

pub use classify::classify;
pub use model::{ClassificationResult, MaturityLabel, RecordFailure, RecordLink, ScanReport};
pub use rules::{ExtractionRules, FieldRule};
pub use scan::{ScanEvent, ScanEventCallback, ScanOptions, execute_scan, run_scan};

pub fn print_banner() {
    println!(
        r#"

   ___  ___  ____ ___ ____ ___ ____
  / _ \/ _ \/ __/(_-</ __/ _ `/ _ \
 / .__/\___/\__//___/\__/\_,_/_//_/
/_/   exploit maturity watch  v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
