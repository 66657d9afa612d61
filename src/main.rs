//! CLI entry point for the GGn console downloader.

use anyhow::{Context, Result};
use clap::Parser;
use ggn_core::{RunConfig, RunSummary, run};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr so stdout carries only links and the summary.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(args = %args, "CLI arguments parsed");
    info!("Starting GGn console downloader");

    let config = RunConfig::resolve(args.into_run_options())
        .context("Failed to resolve configuration")?;
    if !config.dry_run {
        info!(write_location = %config.write_location.display(), "writing torrents");
    }

    let summary = run(&config).await.context("Download run aborted")?;
    print_summary(&config, &summary);
    Ok(())
}

fn print_summary(config: &RunConfig, summary: &RunSummary) {
    info!(
        pages = summary.pages_fetched,
        groups = summary.groups_seen,
        snatched = summary.snatched_groups,
        selected = summary.selected,
        downloaded = summary.downloaded,
        bytes = summary.bytes_written,
        "Download complete"
    );
    if config.dry_run {
        println!(
            "Dry run: {} torrent link(s) printed, {} group(s) already snatched. No files written.",
            summary.printed, summary.snatched_groups
        );
    } else {
        println!(
            "Downloaded {} torrent(s) to {}, {} group(s) already snatched.",
            summary.downloaded,
            config.write_location.display(),
            summary.snatched_groups
        );
    }
}
