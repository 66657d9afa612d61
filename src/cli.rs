//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use clap::builder::BoolishValueParser;

use ggn_core::RunOptions;
use ggn_core::config::{DEFAULT_CONSOLE, DEFAULT_WRITE_LOCATION};

/// Download the best-seeded torrent of every GazelleGames group for a console.
///
/// Groups the account already snatched are skipped, as are GameDOX releases.
/// By default this is a dry run that only prints download links.
#[derive(Parser, Debug)]
#[command(name = "ggn-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// GGn API token. Overrides the GGN_TOKEN environment variable
    #[arg(long)]
    pub token: Option<String>,

    /// Directory to write the torrent files to
    #[arg(long = "write_location", alias = "write-location", default_value = DEFAULT_WRITE_LOCATION)]
    pub write_location: PathBuf,

    /// When true, torrents are not downloaded; their links are printed instead
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub dry: bool,

    /// Console to search (repeat for several)
    #[arg(long = "console", default_value = DEFAULT_CONSOLE)]
    pub consoles: Vec<String>,

    /// Tracker site root
    #[arg(long, hide = true)]
    pub base_url: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Converts parsed flags into library run options.
    pub fn into_run_options(self) -> RunOptions {
        RunOptions {
            token: self.token,
            write_location: Some(self.write_location),
            dry_run: Some(self.dry),
            consoles: self.consoles,
            base_url: self.base_url,
        }
    }
}

impl std::fmt::Display for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "token={} write_location={} dry={} consoles={:?}",
            if self.token.is_some() { "<set>" } else { "<unset>" },
            self.write_location.display(),
            self.dry,
            self.consoles
        )
    }
}
