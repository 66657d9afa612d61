//! The fetch, select, download sequence of one run.
//!
//! Every request is awaited before the next is sent; the first error aborts
//! the run.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::client::{GgnClient, GgnError, TorrentSearch};
use crate::config::RunConfig;
use crate::download::{torrent_path, unique_filename};
use crate::select::{SelectedTorrent, Selection};

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub groups_seen: usize,
    pub snatched_groups: usize,
    pub selected: usize,
    /// Links printed in dry-run mode.
    pub printed: usize,
    /// Torrent files written.
    pub downloaded: usize,
    pub bytes_written: u64,
    pub files: Vec<PathBuf>,
}

/// Builds a client from `config` and performs the run, printing to stdout.
///
/// # Errors
///
/// Returns the first configuration, network, API or filesystem error.
pub async fn run(config: &RunConfig) -> Result<RunSummary, GgnError> {
    let client = GgnClient::with_base_url(&config.token, &config.base_url)?;
    run_with_client(&client, config, &mut std::io::stdout()).await
}

/// Performs the run with an existing client; dry-run links go to `out`.
///
/// # Errors
///
/// Returns the first network, API or filesystem error.
pub async fn run_with_client<W: Write>(
    client: &GgnClient,
    config: &RunConfig,
    out: &mut W,
) -> Result<RunSummary, GgnError> {
    let mut summary = RunSummary::default();
    let selection = fetch_selection(client, &config.consoles, &mut summary).await?;
    summary.snatched_groups = selection.snatched_count();
    summary.selected = selection.len();
    info!(selected = summary.selected, "selection complete");

    let picks = selection.into_picks();
    if config.dry_run {
        print_links(client, &picks, out, &mut summary).await?;
    } else {
        download_all(client, config, &picks, &mut summary).await?;
    }
    Ok(summary)
}

/// Walks every search page of every console and accumulates picks.
///
/// # Errors
///
/// Returns the first failed search call.
#[instrument(skip(client, summary))]
pub async fn fetch_selection(
    client: &GgnClient,
    consoles: &[String],
    summary: &mut RunSummary,
) -> Result<Selection, GgnError> {
    let mut selection = Selection::new();
    for console in consoles {
        info!(console = %console, "searching torrents");
        let mut page = 1;
        loop {
            let results = client
                .search_torrents(&TorrentSearch::for_console(console.as_str(), page))
                .await?;
            summary.pages_fetched += 1;
            if results.is_past_end() {
                debug!(console = %console, page, "empty page, console done");
                break;
            }
            summary.groups_seen += results.groups.len();
            selection.consider_all(&results.groups);
            page += 1;
            info!(
                selected = selection.len(),
                next_page = page,
                "page processed"
            );
        }
    }
    Ok(selection)
}

async fn print_links<W: Write>(
    client: &GgnClient,
    picks: &[SelectedTorrent],
    out: &mut W,
    summary: &mut RunSummary,
) -> Result<(), GgnError> {
    for pick in picks {
        let link = client.download_link(pick.torrent_id).await?;
        writeln!(out, "{}\t{link}", pick.release_title)
            .map_err(|e| GgnError::io("<stdout>", e))?;
        summary.printed += 1;
    }
    Ok(())
}

async fn download_all(
    client: &GgnClient,
    config: &RunConfig,
    picks: &[SelectedTorrent],
    summary: &mut RunSummary,
) -> Result<(), GgnError> {
    tokio::fs::create_dir_all(&config.write_location)
        .await
        .map_err(|e| GgnError::io(config.write_location.clone(), e))?;

    let mut used_names = HashSet::new();
    for pick in picks {
        let filename = unique_filename(&mut used_names, &pick.release_title, pick.torrent_id);
        let path = torrent_path(&config.write_location, &filename);

        let bytes = client.download_torrent(pick.torrent_id, &path).await?;
        info!(
            torrent_id = pick.torrent_id,
            path = %path.display(),
            "torrent downloaded"
        );
        summary.downloaded += 1;
        summary.bytes_written += bytes;
        summary.files.push(path);
    }
    Ok(())
}
