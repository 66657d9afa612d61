//! Error types for tracker API calls and torrent downloads.
//!
//! Every variant carries enough context (URL, action, path) to produce a
//! useful message without the caller having to wrap it again.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the tracker or saving torrents.
#[derive(Debug, Error)]
pub enum GgnError {
    /// No API token was given on the command line or in the environment.
    #[error(
        "[AUTH] no API token provided\n  Suggestion: pass --token or set the GGN_TOKEN environment variable"
    )]
    MissingToken,

    /// The token contains characters that cannot be sent in an HTTP header.
    #[error("[AUTH] API token contains invalid characters")]
    InvalidToken,

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error calling {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout calling {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response other than an authentication rejection.
    #[error("HTTP {status} calling {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The tracker rejected the token (HTTP 401/403).
    #[error(
        "[AUTH] tracker rejected the API token (HTTP {status}) calling {url}\n  Suggestion: check that the token is valid and has the User permission"
    )]
    AuthRejected {
        /// The URL that was rejected.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The API answered with a non-success envelope.
    #[error("API call `{action}` failed: {message}")]
    Api {
        /// The API action that failed.
        action: String,
        /// Error text reported by the tracker.
        message: String,
    },

    /// The API answered with JSON that does not match the expected shape.
    #[error("could not decode response of `{action}`: {source}")]
    Decode {
        /// The API action whose response failed to decode.
        action: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// File system error while saving a torrent.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configured base URL cannot be parsed or extended.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl GgnError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error, promoting 401/403 to [`GgnError::AuthRejected`].
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        let url = url.into();
        if matches!(status, 401 | 403) {
            Self::AuthRejected { url, status }
        } else {
            Self::HttpStatus { url, status }
        }
    }

    /// Creates an API envelope error.
    pub fn api(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(action: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            action: action.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns true for errors caused by a missing or rejected token.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::MissingToken | Self::InvalidToken | Self::AuthRejected { .. }
        )
    }
}
