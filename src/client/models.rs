//! Tracker API response types.
//!
//! The tracker is a PHP application, so its JSON is loose: empty collections
//! come back as `[]` instead of `{}`, and numbers sometimes arrive as strings.
//! The wire structs here absorb that looseness and convert into the plain
//! [`TorrentGroup`] / [`Torrent`] types used by the rest of the crate.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::error::GgnError;

/// `TorrentType` of a regular torrent (as opposed to an external link).
pub const TORRENT_TYPE_TORRENT: &str = "Torrent";

// ==================== Domain types ====================

/// A game group and its torrents, as returned by a torrent search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentGroup {
    pub id: u64,
    pub name: Option<String>,
    pub torrents: Vec<Torrent>,
}

/// A single torrent inside a [`TorrentGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Torrent {
    pub id: u64,
    pub group_id: u64,
    pub release_title: String,
    /// `Torrent` for real torrents; other values are links.
    pub torrent_type: String,
    /// Empty unless the torrent is a GameDOX release (patch, DLC, guide...).
    pub game_dox_type: String,
    pub seeders: u64,
    /// Whether the current account already downloaded this torrent.
    pub snatched: bool,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Groups that parsed with a usable id.
    pub groups: Vec<TorrentGroup>,
    /// Number of entries the tracker sent, including skipped ones.
    pub entries: usize,
}

impl SearchPage {
    /// Returns true when the tracker sent no entries at all, i.e. the page
    /// is past the last result.
    #[must_use]
    pub fn is_past_end(&self) -> bool {
        self.entries == 0
    }
}

impl Torrent {
    /// Returns true for GameDOX releases, which are never selected.
    #[must_use]
    pub fn is_game_dox(&self) -> bool {
        !self.game_dox_type.trim().is_empty()
    }

    /// Returns true for real torrents (not links).
    #[must_use]
    pub fn is_torrent(&self) -> bool {
        self.torrent_type == TORRENT_TYPE_TORRENT
    }
}

/// Account keys required to build download links.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserKeys {
    pub authkey: String,
    pub passkey: String,
}

impl std::fmt::Debug for UserKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserKeys")
            .field("authkey", &"<redacted>")
            .field("passkey", &"<redacted>")
            .finish()
    }
}

// ==================== Envelope ====================

/// Common `{"status": ..., "response": ...}` wrapper around every API answer.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub status: String,
    #[serde(default)]
    pub response: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl Envelope {
    /// Unwraps the `response` payload, failing on any non-success status.
    pub(crate) fn into_response(self, action: &str) -> Result<Value, GgnError> {
        if self.status == "success" {
            return Ok(self.response);
        }
        let message = match self.error {
            Some(error) => format!("{}: {error}", self.status),
            None if self.response.is_null() => self.status,
            None => format!("{}: {}", self.status, self.response),
        };
        Err(GgnError::api(action, message))
    }
}

// ==================== Search payload ====================

/// Either a JSON object keyed by id or a JSON array.
///
/// PHP encodes an empty associative array as `[]`, so both shapes must parse.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Collection<V> {
    Keyed(BTreeMap<String, V>),
    Listed(Vec<V>),
}

impl<V> Default for Collection<V> {
    fn default() -> Self {
        Self::Listed(Vec::new())
    }
}

impl<V> Collection<V> {
    fn into_entries(self) -> Vec<(Option<u64>, V)> {
        match self {
            Self::Keyed(map) => map
                .into_iter()
                .map(|(key, value)| (key.trim().parse().ok(), value))
                .collect(),
            Self::Listed(items) => items.into_iter().map(|value| (None, value)).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default, rename = "ID", deserialize_with = "lenient_opt_u64")]
    id: Option<u64>,
    #[serde(default, rename = "Name")]
    name: Option<String>,
    #[serde(default, rename = "Torrents")]
    torrents: Option<Collection<RawTorrent>>,
}

#[derive(Debug, Deserialize)]
struct RawTorrent {
    #[serde(default, rename = "ID", deserialize_with = "lenient_opt_u64")]
    id: Option<u64>,
    #[serde(default, rename = "GroupID", deserialize_with = "lenient_opt_u64")]
    group_id: Option<u64>,
    #[serde(rename = "ReleaseTitle")]
    release_title: String,
    #[serde(rename = "TorrentType")]
    torrent_type: String,
    #[serde(default, rename = "GameDOXType", deserialize_with = "lenient_string")]
    game_dox_type: String,
    #[serde(rename = "Seeders", deserialize_with = "lenient_u64")]
    seeders: u64,
    #[serde(default, rename = "IsSnatched", deserialize_with = "lenient_bool")]
    snatched: bool,
}

/// Parses the `response` payload of a torrent search into groups.
///
/// Groups without a usable id are skipped with a warning but still counted
/// in [`SearchPage::entries`]. A group without a `Torrents` field yields an
/// empty torrent list.
///
/// # Errors
///
/// Returns [`GgnError::Decode`] when the payload does not have the search shape.
pub fn parse_search_page(payload: Value) -> Result<SearchPage, GgnError> {
    if payload.is_null() {
        return Ok(SearchPage::default());
    }
    let groups: Collection<RawGroup> =
        serde_json::from_value(payload).map_err(|e| GgnError::decode("search", e))?;

    let entries = groups.into_entries();
    let entry_count = entries.len();
    let mut parsed = Vec::new();
    for (key, raw) in entries {
        let Some(group_id) = key.or(raw.id) else {
            warn!(name = ?raw.name, "skipping search group without an id");
            continue;
        };

        let torrents = raw
            .torrents
            .unwrap_or_default()
            .into_entries()
            .into_iter()
            .filter_map(|(torrent_key, torrent)| {
                let Some(id) = torrent_key.or(torrent.id) else {
                    warn!(group_id, release = %torrent.release_title, "skipping torrent without an id");
                    return None;
                };
                Some(Torrent {
                    id,
                    group_id: torrent.group_id.unwrap_or(group_id),
                    release_title: torrent.release_title,
                    torrent_type: torrent.torrent_type,
                    game_dox_type: torrent.game_dox_type,
                    seeders: torrent.seeders,
                    snatched: torrent.snatched,
                })
            })
            .collect();

        parsed.push(TorrentGroup {
            id: group_id,
            name: raw.name,
            torrents,
        });
    }
    Ok(SearchPage {
        groups: parsed,
        entries: entry_count,
    })
}

// ==================== Lenient field decoders ====================

fn value_to_u64<E: de::Error>(value: &Value) -> Result<Option<u64>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| E::custom(format!("expected unsigned integer, got {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| E::custom(format!("expected numeric string, got {s:?}"))),
        other => Err(E::custom(format!("expected number, got {other}"))),
    }
}

fn lenient_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_u64(&value)
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_u64(&value)?.unwrap_or(0))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64().is_some_and(|v| v != 0) || n.as_u64().is_some_and(|v| v != 0)),
        Value::String(s) => Ok(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        )),
        other => Err(de::Error::custom(format!("expected boolean, got {other}"))),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}
