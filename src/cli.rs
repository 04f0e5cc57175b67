//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use whalesounds_core::config::wait_from_secs;
use whalesounds_core::{Collection, DEFAULT_WORKERS};

/// Mirror the WHOI marine mammal sound archive.
///
/// Discovers every file of the chosen collection, downloads them in parallel,
/// expands zipped master tapes, and lists failed URLs in
/// `<output-dir>/unprocessed_urls.txt`.
#[derive(Parser, Debug)]
#[command(name = "whalesounds")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of parallel downloads (1-256)
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS as u16, value_parser = clap::value_parser!(u16).range(1..=256))]
    pub workers: u16,

    /// Wait time in seconds after each download, per worker (0 to disable)
    #[arg(long, default_value_t = 1.0, value_parser = parse_wait)]
    pub wait: f64,

    /// Collection to mirror: master-tapes or full-cuts
    #[arg(long, default_value_t = Collection::MasterTapes)]
    pub collection: Collection,

    /// Output directory (defaults to scraped_data/<collection>)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Override the collection's root page URL
    #[arg(long, hide = true)]
    pub root_url: Option<String>,

    /// Exit with status 2 when any file failed to download
    #[arg(long)]
    pub strict: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

/// Which settings were given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) workers: bool,
    pub(crate) wait: bool,
    pub(crate) collection: bool,
}

/// Parses process arguments, also reporting which values came from the command line.
pub(crate) fn parse_args_with_sources() -> (Args, CliValueSources) {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = CliValueSources::from_matches(&matches);
    (args, sources)
}

impl CliValueSources {
    pub(crate) fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            workers: is_commandline_value(matches, "workers"),
            wait: is_commandline_value(matches, "wait"),
            collection: is_commandline_value(matches, "collection"),
        }
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

fn parse_wait(raw: &str) -> Result<f64, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number of seconds"))?;
    wait_from_secs(secs).map_err(|e| e.to_string())?;
    Ok(secs)
}
