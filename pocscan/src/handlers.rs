use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pocscan_core::report::{format_match_line, generate_scan_report};
use pocscan_core::{ExtractionRules, ScanEvent, ScanEventCallback, ScanOptions, execute_scan};
use pocscan_scanner::{Backend, BrowserOptions};
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

static RELEASE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}(/[^\s]*)?$")
        .expect("release URL pattern is valid")
});

const URL_FORMAT_HINT: &str = "https://msrc.microsoft.com/update-guide/releaseNote/YYYY-MMM";

// Helper functions for the scan handler

/// Check a user-supplied release URL against the accepted shape
pub fn is_valid_release_url(url: &str) -> bool {
    RELEASE_URL_PATTERN.is_match(url)
}

/// Add https:// when the URL was given without a scheme
pub fn normalize_release_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Value parser for the URL argument
pub fn parse_release_url(value: &str) -> Result<String, String> {
    let value = value.trim();
    if is_valid_release_url(value) {
        Ok(normalize_release_url(value))
    } else {
        Err(format!("expected a URL on the format {}", URL_FORMAT_HINT))
    }
}

/// Ask for the release URL until a valid one is entered
pub fn prompt_for_release_url<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<String> {
    loop {
        write!(
            output,
            "Enter the monthly URL on the format {} : ",
            URL_FORMAT_HINT
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no release URL entered",
            ));
        }

        match parse_release_url(&line) {
            Ok(url) => return Ok(url),
            Err(_) => writeln!(
                output,
                "Invalid URL. Please enter a valid URL on the format {}.",
                URL_FORMAT_HINT
            )?,
        }
    }
}

/// Load extraction rules from a JSON file, or the built-in defaults
pub fn load_rules(path: Option<&String>) -> anyhow::Result<ExtractionRules> {
    match path {
        Some(path) => {
            let expanded = shellexpand::tilde(path);
            ExtractionRules::from_file(Path::new(expanded.as_ref()))
                .with_context(|| format!("Failed to load rules from {}", path))
        }
        None => Ok(ExtractionRules::default()),
    }
}

/// Log filter for the number of -v flags; RUST_LOG wins when set
pub fn log_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbosity {
            0 => "off",
            1 => "info",
            _ => "debug",
        })
    })
}

/// Block until the user presses Enter
pub fn wait_for_acknowledgement<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<()> {
    write!(output, "Press Enter to exit...")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{pos}/{len}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Loading release listing...");
    pb
}

fn event_printer(pb: ProgressBar, quiet: bool) -> ScanEventCallback {
    Arc::new(move |event: ScanEvent| match event {
        ScanEvent::LinksHarvested(count) => {
            pb.set_length(count as u64);
            if !quiet {
                pb.suspend(|| println!("[INFO] Found {} CVE links.", count));
            }
        }
        ScanEvent::Checking { index, link, .. } => {
            pb.set_position(index.saturating_sub(1) as u64);
            pb.set_message(link.record_id().unwrap_or(link.as_str()).to_string());
            if !quiet {
                pb.suspend(|| println!("[INFO] Checking: {}", link));
            }
        }
        ScanEvent::Matched(result) => {
            pb.suspend(|| println!("{}", format_match_line(&result)));
        }
        ScanEvent::RecordFailed(failure) => {
            pb.suspend(|| {
                eprintln!(
                    "{}",
                    format!("[ERROR] {} - Exception occurred: {}", failure.link, failure.error)
                        .yellow()
                )
            });
        }
    })
}

pub async fn handle_scan(args: &ArgMatches) {
    let quiet = args.get_flag("quiet");

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.get_count("verbose")))
        .with_writer(io::stderr)
        .init();

    if args.get_flag("no-color") {
        colored::control::set_override(false);
    }

    let listing_url = match args.get_one::<String>("URL") {
        Some(url) => url.clone(),
        None => {
            let stdin = io::stdin();
            match prompt_for_release_url(&mut stdin.lock(), &mut io::stdout()) {
                Ok(url) => url,
                Err(e) => {
                    eprintln!("{} {}", "✗".red().bold(), e);
                    std::process::exit(1);
                }
            }
        }
    };
    if !quiet {
        println!("[INFO] Using URL: {}", listing_url);
    }

    let rules = match load_rules(args.get_one::<String>("rules")) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let backend = args
        .get_one::<String>("backend")
        .and_then(|b| Backend::from_str(b))
        .unwrap_or(Backend::Chrome);

    let browser = BrowserOptions {
        backend,
        headless: !args.get_flag("headful"),
        chrome_executable: args.get_one::<std::path::PathBuf>("chrome").cloned(),
        ..BrowserOptions::default()
    };

    let mut options = ScanOptions::new(listing_url);
    options.page_timeout = Duration::from_secs(*args.get_one::<u64>("timeout").unwrap_or(&15));
    options.settle_delay = Duration::from_millis(*args.get_one::<u64>("settle").unwrap_or(&2000));
    options.rules = rules;
    info!(
        "Scanning {} with the {:?} backend, {}s page timeout",
        options.listing_url,
        browser.backend,
        options.page_timeout.as_secs()
    );

    let pb = progress_bar(quiet);
    let report = match execute_scan(&options, &browser, Some(event_printer(pb.clone(), quiet))).await {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            eprintln!("{} Scan failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };
    pb.finish_and_clear();

    println!();
    print!("{}", generate_scan_report(&report));

    if !args.get_flag("no-wait") {
        let stdin = io::stdin();
        if let Err(e) = wait_for_acknowledgement(&mut stdin.lock(), &mut io::stdout()) {
            eprintln!("{} {}", "✗".red().bold(), e);
        }
    }
}
