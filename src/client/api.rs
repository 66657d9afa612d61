//! GazelleGames API client.
//!
//! [`GgnClient`] wraps a `reqwest::Client` with the tracker's conventions:
//! the token travels in the `X-API-Key` header, every JSON answer is wrapped
//! in a `{"status", "response"}` envelope, and calls are rate limited to
//! five per ten seconds.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{
    API_KEY_HEADER, API_PATH, CONNECT_TIMEOUT_SECS, DEFAULT_BASE_URL, DOWNLOAD_PATH,
    READ_TIMEOUT_SECS,
};
use super::error::GgnError;
use super::models::{Envelope, SearchPage, UserKeys, parse_search_page};
use super::rate_limiter::RateLimiter;
use crate::download::save_response;
use crate::user_agent;

/// Parameters of a torrent search.
///
/// Only the filters the downloader needs are modelled; values left `None`
/// are not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentSearch {
    /// Platform to restrict results to (e.g. `Atari 2600`).
    pub artist_name: Option<String>,
    pub order_by: Option<String>,
    pub order_way: Option<String>,
    /// `filled`, `empty` or `both`.
    pub empty_groups: Option<String>,
    pub page: u32,
}

impl TorrentSearch {
    /// Search for every filled group of a console, ordered by title.
    #[must_use]
    pub fn for_console(console: impl Into<String>, page: u32) -> Self {
        Self {
            artist_name: Some(console.into()),
            order_by: Some("groupname".to_string()),
            order_way: Some("asc".to_string()),
            empty_groups: Some("filled".to_string()),
            page,
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("search_type", "torrents".to_string())];
        let optional = [
            ("artistname", &self.artist_name),
            ("order_by", &self.order_by),
            ("order_way", &self.order_way),
            ("emptygroups", &self.empty_groups),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                pairs.push((key, value.clone()));
            }
        }
        pairs.push(("page", self.page.to_string()));
        pairs
    }
}

/// Client for the GazelleGames JSON API and torrent downloads.
pub struct GgnClient {
    client: Client,
    base_url: Url,
    rate_limiter: RateLimiter,
    /// Account keys, fetched on first download and reused for the run.
    user_keys: OnceCell<UserKeys>,
}

impl std::fmt::Debug for GgnClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GgnClient")
            .field("base_url", &self.base_url.as_str())
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

impl GgnClient {
    /// Creates a client for the public tracker.
    ///
    /// # Errors
    ///
    /// Returns [`GgnError::MissingToken`] for a blank token, or an error if the
    /// HTTP client cannot be built.
    pub fn new(token: &str) -> Result<Self, GgnError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom site root (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GgnError::MissingToken`] for a blank token,
    /// [`GgnError::InvalidToken`] for a token that cannot be sent as a header,
    /// [`GgnError::InvalidUrl`] for an unparsable base URL, or
    /// [`GgnError::Network`] if the HTTP client cannot be built.
    #[instrument(skip(token))]
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, GgnError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(GgnError::MissingToken);
        }
        let base_url = normalize_base_url(base_url)?;

        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(token).map_err(|_| GgnError::InvalidToken)?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .default_headers(headers)
            .build()
            .map_err(|e| GgnError::network(base_url.as_str(), e))?;

        debug!(base_url = %base_url, "created tracker client");
        Ok(Self {
            client,
            base_url,
            rate_limiter: RateLimiter::default(),
            user_keys: OnceCell::new(),
        })
    }

    /// Replaces the default five-calls-per-ten-seconds limiter.
    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Returns the site root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `api.php?request=<action>&<args>`.
    fn action_url(&self, action: &str, args: &[(&str, String)]) -> Result<Url, GgnError> {
        let mut url = self
            .base_url
            .join(API_PATH)
            .map_err(|_| GgnError::invalid_url(format!("{}{API_PATH}", self.base_url)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("request", action);
            for (key, value) in args {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Performs one rate-limited API call and unwraps its envelope.
    async fn call(&self, action: &str, args: &[(&str, String)]) -> Result<Value, GgnError> {
        let url = self.action_url(action, args)?;
        self.rate_limiter.acquire().await;
        debug!(action, "calling tracker API");

        let response = self.send(&url, url.as_str()).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| GgnError::network(url.as_str(), e))?;
        let envelope: Envelope =
            serde_json::from_slice(&body).map_err(|e| GgnError::decode(action, e))?;
        envelope.into_response(action)
    }

    /// Sends a GET; `label` is the URL text used in errors.
    async fn send(&self, url: &Url, label: &str) -> Result<reqwest::Response, GgnError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                GgnError::timeout(label)
            } else {
                GgnError::network(label, e.without_url())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GgnError::http_status(label, status.as_u16()));
        }
        Ok(response)
    }

    /// Fetches one page of torrent search results.
    ///
    /// [`SearchPage::is_past_end`] tells whether the page is past the last result.
    ///
    /// # Errors
    ///
    /// Returns any transport, envelope or decode error from the call.
    #[instrument(skip(self, search), fields(console = ?search.artist_name, page = search.page))]
    pub async fn search_torrents(
        &self,
        search: &TorrentSearch,
    ) -> Result<SearchPage, GgnError> {
        let payload = self.call("search", &search.query_pairs()).await?;
        let page = parse_search_page(payload)?;
        debug!(
            groups = page.groups.len(),
            entries = page.entries,
            "search page received"
        );
        Ok(page)
    }

    /// Fetches the account's quick info and extracts its download keys.
    ///
    /// # Errors
    ///
    /// Returns any transport, envelope or decode error from the call.
    #[instrument(skip(self))]
    pub async fn quick_user(&self) -> Result<UserKeys, GgnError> {
        let payload = self.call("quick_user", &[]).await?;
        serde_json::from_value(payload).map_err(|e| GgnError::decode("quick_user", e))
    }

    /// Returns the account keys, fetching them once per client.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failed [`quick_user`](Self::quick_user) call.
    pub async fn user_keys(&self) -> Result<&UserKeys, GgnError> {
        self.user_keys.get_or_try_init(|| self.quick_user()).await
    }

    /// Builds the download link of a torrent.
    ///
    /// # Errors
    ///
    /// Returns an error if the account keys cannot be fetched.
    pub async fn download_link(&self, torrent_id: u64) -> Result<Url, GgnError> {
        let keys = self.user_keys().await?;
        let mut url = self
            .base_url
            .join(DOWNLOAD_PATH)
            .map_err(|_| GgnError::invalid_url(format!("{}{DOWNLOAD_PATH}", self.base_url)))?;
        url.query_pairs_mut()
            .append_pair("request", "download")
            .append_pair("id", &torrent_id.to_string())
            .append_pair("authkey", &keys.authkey)
            .append_pair("torrent_pass", &keys.passkey);
        Ok(url)
    }

    /// Downloads a torrent file to `path`, returning the bytes written.
    ///
    /// A JSON answer instead of a torrent body is reported as an API error.
    ///
    /// # Errors
    ///
    /// Returns transport, API or filesystem errors.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn download_torrent(&self, torrent_id: u64, path: &Path) -> Result<u64, GgnError> {
        let url = self.download_link(torrent_id).await?;
        self.rate_limiter.acquire().await;
        debug!("requesting torrent file");

        let label = redacted(&url);
        let response = self.send(&url, &label).await?;
        if is_json(&response) {
            let body = response
                .bytes()
                .await
                .map_err(|e| GgnError::network(label.as_str(), e.without_url()))?;
            let envelope: Envelope =
                serde_json::from_slice(&body).map_err(|e| GgnError::decode("download", e))?;
            return Err(match envelope.into_response("download") {
                Err(error) => error,
                Ok(_) => GgnError::api("download", "expected a torrent file, got a JSON response"),
            });
        }

        let bytes = save_response(response, &label, path).await?;
        info!(bytes, "torrent saved");
        Ok(bytes)
    }
}

fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Download links embed the account keys; never put them in errors or logs.
fn redacted(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

/// Parses the site root, making sure it ends with `/` so `join` appends.
fn normalize_base_url(base_url: &str) -> Result<Url, GgnError> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|_| GgnError::invalid_url(base_url))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(GgnError::invalid_url(base_url));
    }
    Ok(url)
}
