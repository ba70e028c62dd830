use crate::CLAP_STYLING;
use clap::arg;
use pocscan::handlers::parse_release_url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("pocscan")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("pocscan")
        .styles(CLAP_STYLING)
        .about(
            "Checks every vulnerability in a monthly security release and flags those with \
            proof-of-concept or weaponized exploit code.",
        )
        .arg(
            arg!([URL])
                .required(false)
                .help(
                    "Monthly release URL, e.g. \
                    https://msrc.microsoft.com/update-guide/releaseNote/2025-Jan \
                    (prompted for when omitted)",
                )
                .value_parser(parse_release_url),
        )
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --verbose ... "Increase log verbosity (-v info, -vv debug)").required(false))
        .arg(
            arg!(-t --"timeout" <SECONDS>)
                .required(false)
                .help("Seconds to wait for each page to render")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("15"),
        )
        .arg(
            arg!(--"settle" <MILLIS>)
                .required(false)
                .help("Pause after scrolling a detail page, letting client-side content render")
                .value_parser(clap::value_parser!(u64))
                .default_value("2000"),
        )
        .arg(
            arg!(-r --"rules" <PATH>)
                .required(false)
                .help("JSON file overriding the selectors used to read the portal's pages"),
        )
        .arg(
            arg!(-b --"backend" <BACKEND>)
                .required(false)
                .help("chrome renders pages in headless Chrome; http fetches raw HTML only")
                .value_parser(["chrome", "http"])
                .default_value("chrome"),
        )
        .arg(
            arg!(--"chrome" <PATH>)
                .required(false)
                .help("Path to the Chrome/Chromium executable (default: auto-detect)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(--"headful")
                .required(false)
                .help("Show the browser window instead of running headless")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"no-color")
                .required(false)
                .help("Disable colored output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"no-wait")
                .required(false)
                .help("Exit without waiting for Enter once the report is printed")
                .action(clap::ArgAction::SetTrue),
        )
}
