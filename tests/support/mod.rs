//! Shared wiremock fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::{Map, Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ggn_core::{GgnClient, RateLimiter};

/// Client pointed at `server`, with rate limiting off.
pub fn test_client(server: &MockServer) -> GgnClient {
    GgnClient::with_base_url("test-token", &server.uri())
        .unwrap()
        .with_rate_limiter(RateLimiter::disabled())
}

/// One torrent entry in the tracker's search payload shape.
pub fn torrent(id: u64, group_id: u64, title: &str, seeders: u64, snatched: bool) -> Value {
    json!({
        "ID": id.to_string(),
        "GroupID": group_id.to_string(),
        "ReleaseTitle": title,
        "TorrentType": "Torrent",
        "GameDOXType": "",
        "Seeders": seeders.to_string(),
        "IsSnatched": snatched,
    })
}

/// A group with its torrents keyed by id.
pub fn group(id: u64, name: &str, torrents: Vec<Value>) -> (String, Value) {
    let keyed: Map<String, Value> = torrents
        .into_iter()
        .map(|t| (t["ID"].as_str().unwrap().to_string(), t))
        .collect();
    (
        id.to_string(),
        json!({"ID": id, "Name": name, "Torrents": keyed}),
    )
}

pub fn success(response: Value) -> Value {
    json!({"status": "success", "response": response})
}

/// Mounts one search page for `console`; an empty `groups` serves `[]`.
pub async fn mount_page(
    server: &MockServer,
    console: &str,
    page: u32,
    groups: Vec<(String, Value)>,
) {
    let response = if groups.is_empty() {
        json!([])
    } else {
        Value::Object(groups.into_iter().collect())
    };
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("request", "search"))
        .and(query_param("artistname", console))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(response)))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_quick_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("request", "quick_user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({
            "authkey": "AUTH",
            "passkey": "PASS",
        }))))
        .expect(1)
        .mount(server)
        .await;
}

/// Serves a torrent body for `id`, expecting `times` requests.
pub async fn mount_torrent(server: &MockServer, id: u64, body: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path("/torrents.php"))
        .and(query_param("request", "download"))
        .and(query_param("id", id.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/x-bittorrent")
                .set_body_bytes(body.to_vec()),
        )
        .expect(times)
        .mount(server)
        .await;
}
