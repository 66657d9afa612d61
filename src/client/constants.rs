//! Constants for the tracker client (endpoints, timeouts, rate limiting).

use std::time::Duration;

/// Default tracker site root.
pub const DEFAULT_BASE_URL: &str = "https://gazellegames.net";

/// API endpoint path relative to the site root.
pub const API_PATH: &str = "api.php";

/// Torrent download endpoint path relative to the site root.
pub const DOWNLOAD_PATH: &str = "torrents.php";

/// Header carrying the API token (lowercase, as `HeaderName::from_static` requires).
pub const API_KEY_HEADER: &str = "x-api-key";

/// HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout (30 seconds).
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Maximum API calls allowed inside one [`RATE_LIMIT_PERIOD`].
pub const RATE_LIMIT_CALLS: usize = 5;

/// Rolling window for [`RATE_LIMIT_CALLS`].
pub const RATE_LIMIT_PERIOD: Duration = Duration::from_secs(10);
