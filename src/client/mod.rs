//! GazelleGames tracker client.
//!
//! # Example
//!
//! ```no_run
//! use ggn_core::client::{GgnClient, TorrentSearch};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GgnClient::new("my-api-token")?;
//! let page = client
//!     .search_torrents(&TorrentSearch::for_console("Atari 2600", 1))
//!     .await?;
//! println!("{} groups on page 1", page.groups.len());
//! # Ok(())
//! # }
//! ```

mod api;
pub mod constants;
mod error;
pub mod models;
pub mod rate_limiter;

pub use api::{GgnClient, TorrentSearch};
pub use error::GgnError;
pub use models::{SearchPage, Torrent, TorrentGroup, UserKeys, parse_search_page};
pub use rate_limiter::RateLimiter;
