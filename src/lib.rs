//! GGn Console Downloader Library
//!
//! Searches GazelleGames for every game group of a console, picks the
//! best-seeded torrent of each group the account has not snatched yet, and
//! saves the `.torrent` files (or prints their links in dry-run mode).
//!
//! # Architecture
//!
//! - [`client`] - tracker API client, response models, rate limiting
//! - [`select`] - per-group filtering and ranking
//! - [`download`] - torrent filenames and streaming to disk
//! - [`config`] - run configuration (token fallback, defaults)
//! - [`driver`] - the sequential fetch, select, download run

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod download;
pub mod driver;
pub mod select;
mod user_agent;

// Re-export commonly used types
pub use client::{
    GgnClient, GgnError, RateLimiter, SearchPage, Torrent, TorrentGroup, TorrentSearch,
};
pub use config::{RunConfig, RunOptions, TOKEN_ENV_VAR};
pub use driver::{RunSummary, run, run_with_client};
pub use select::{GroupDecision, SelectedTorrent, Selection, select_from_group};
