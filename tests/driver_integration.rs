//! Integration tests for a whole run against a mocked tracker.

mod support;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ggn_core::{GgnError, RunConfig, run_with_client};
use support::{group, mount_page, mount_quick_user, mount_torrent, success, test_client, torrent};

const TORRENT_BODY: &[u8] = b"d8:announce3:urle";

fn config(write_location: &std::path::Path, dry_run: bool, server: &MockServer) -> RunConfig {
    RunConfig {
        token: "test-token".to_string(),
        write_location: write_location.to_path_buf(),
        dry_run,
        consoles: vec!["Atari 2600".to_string()],
        base_url: server.uri(),
    }
}

#[tokio::test]
async fn test_dry_run_prints_links_and_writes_nothing() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "Atari 2600",
        1,
        vec![
            group(10, "Adventure", vec![torrent(100, 10, "Adventure (USA)", 3, false)]),
            group(11, "Pitfall!", vec![torrent(110, 11, "Pitfall! (USA)", 7, false)]),
        ],
    )
    .await;
    mount_page(&server, "Atari 2600", 2, vec![]).await;
    mount_quick_user(&server).await;
    mount_torrent(&server, 100, TORRENT_BODY, 0).await;
    mount_torrent(&server, 110, TORRENT_BODY, 0).await;

    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("not-created");
    let client = test_client(&server);
    let mut out = Vec::new();

    let summary = run_with_client(&client, &config(&out_dir, true, &server), &mut out)
        .await
        .unwrap();

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.selected, 2);
    assert_eq!(summary.printed, 2);
    assert_eq!(summary.downloaded, 0);
    assert!(!out_dir.exists(), "dry run must not create the output dir");

    let printed = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Adventure (USA)\t"));
    assert!(lines[0].contains("torrents.php?request=download&id=100&authkey=AUTH&torrent_pass=PASS"));
    assert!(lines[1].starts_with("Pitfall! (USA)\t"));
}

#[tokio::test]
async fn test_run_downloads_best_seeded_torrent_per_group() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "Atari 2600",
        1,
        vec![group(
            10,
            "Adventure",
            vec![
                torrent(100, 10, "Adventure (USA)", 3, false),
                torrent(101, 10, "Adventure (Europe)", 9, false),
            ],
        )],
    )
    .await;
    mount_page(&server, "Atari 2600", 2, vec![]).await;
    mount_quick_user(&server).await;
    mount_torrent(&server, 100, TORRENT_BODY, 0).await;
    mount_torrent(&server, 101, TORRENT_BODY, 1).await;

    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("torrents");
    let client = test_client(&server);
    let mut out = Vec::new();

    let summary = run_with_client(&client, &config(&out_dir, false, &server), &mut out)
        .await
        .unwrap();

    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.bytes_written, TORRENT_BODY.len() as u64);
    assert!(out.is_empty(), "links are only printed in dry run");

    let expected = out_dir.join("Adventure (Europe).torrent");
    assert_eq!(summary.files, vec![expected.clone()]);
    assert_eq!(std::fs::read(expected).unwrap(), TORRENT_BODY);
}

#[tokio::test]
async fn test_pagination_continues_until_empty_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "Atari 2600",
        1,
        vec![group(10, "Adventure", vec![torrent(100, 10, "Adventure", 1, false)])],
    )
    .await;
    mount_page(
        &server,
        "Atari 2600",
        2,
        vec![group(20, "Yars' Revenge", vec![torrent(200, 20, "Yars' Revenge", 1, false)])],
    )
    .await;
    mount_page(&server, "Atari 2600", 3, vec![]).await;
    mount_quick_user(&server).await;

    let client = test_client(&server);
    let temp_dir = TempDir::new().unwrap();
    let mut out = Vec::new();

    let summary = run_with_client(&client, &config(temp_dir.path(), true, &server), &mut out)
        .await
        .unwrap();

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.groups_seen, 2);
    assert_eq!(summary.printed, 2);
}

#[tokio::test]
async fn test_snatched_and_gamedox_are_never_downloaded() {
    let server = MockServer::start().await;
    let mut manual = torrent(301, 30, "River Raid Manual", 50, false);
    manual["GameDOXType"] = json!("Manual");
    mount_page(
        &server,
        "Atari 2600",
        1,
        vec![
            group(
                20,
                "Combat",
                vec![
                    torrent(200, 20, "Combat (USA)", 12, false),
                    torrent(201, 20, "Combat (Europe)", 2, true),
                ],
            ),
            group(
                30,
                "River Raid",
                vec![manual, torrent(300, 30, "River Raid (USA)", 4, false)],
            ),
        ],
    )
    .await;
    mount_page(&server, "Atari 2600", 2, vec![]).await;
    mount_quick_user(&server).await;
    mount_torrent(&server, 200, TORRENT_BODY, 0).await;
    mount_torrent(&server, 201, TORRENT_BODY, 0).await;
    mount_torrent(&server, 301, TORRENT_BODY, 0).await;
    mount_torrent(&server, 300, TORRENT_BODY, 1).await;

    let temp_dir = TempDir::new().unwrap();
    let client = test_client(&server);
    let mut out = Vec::new();

    let summary = run_with_client(&client, &config(temp_dir.path(), false, &server), &mut out)
        .await
        .unwrap();

    assert_eq!(summary.snatched_groups, 1);
    assert_eq!(summary.downloaded, 1);
    assert_eq!(
        summary.files,
        vec![temp_dir.path().join("River Raid (USA).torrent")]
    );
}

#[tokio::test]
async fn test_same_title_gets_distinct_filenames() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "Atari 2600",
        1,
        vec![
            group(40, "Tennis", vec![torrent(400, 40, "Tennis", 1, false)]),
            group(41, "Tennis", vec![torrent(410, 41, "Tennis", 1, false)]),
        ],
    )
    .await;
    mount_page(&server, "Atari 2600", 2, vec![]).await;
    mount_quick_user(&server).await;
    mount_torrent(&server, 400, TORRENT_BODY, 1).await;
    mount_torrent(&server, 410, TORRENT_BODY, 1).await;

    let temp_dir = TempDir::new().unwrap();
    let client = test_client(&server);
    let mut out = Vec::new();

    let summary = run_with_client(&client, &config(temp_dir.path(), false, &server), &mut out)
        .await
        .unwrap();

    assert_eq!(
        summary.files,
        vec![
            temp_dir.path().join("Tennis.torrent"),
            temp_dir.path().join("Tennis_410.torrent"),
        ]
    );
}

#[tokio::test]
async fn test_disambiguated_name_never_overwrites_earlier_file() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "Atari 2600",
        1,
        vec![
            group(1, "Tennis", vec![torrent(1, 1, "Tennis_410", 1, false)]),
            group(2, "Tennis", vec![torrent(400, 2, "Tennis", 1, false)]),
            group(3, "Tennis", vec![torrent(410, 3, "Tennis", 1, false)]),
        ],
    )
    .await;
    mount_page(&server, "Atari 2600", 2, vec![]).await;
    mount_quick_user(&server).await;
    mount_torrent(&server, 1, b"FIRST", 1).await;
    mount_torrent(&server, 400, b"SECOND", 1).await;
    mount_torrent(&server, 410, b"THIRD", 1).await;

    let temp_dir = TempDir::new().unwrap();
    let client = test_client(&server);
    let mut out = Vec::new();

    let summary = run_with_client(&client, &config(temp_dir.path(), false, &server), &mut out)
        .await
        .unwrap();

    let dir = temp_dir.path();
    assert_eq!(summary.downloaded, 3);
    assert_eq!(
        summary.files,
        vec![
            dir.join("Tennis_410.torrent"),
            dir.join("Tennis.torrent"),
            dir.join("Tennis_410_2.torrent"),
        ]
    );
    assert_eq!(std::fs::read_dir(dir).unwrap().count(), 3);
    assert_eq!(std::fs::read(dir.join("Tennis_410.torrent")).unwrap(), b"FIRST");
    assert_eq!(std::fs::read(dir.join("Tennis.torrent")).unwrap(), b"SECOND");
    assert_eq!(std::fs::read(dir.join("Tennis_410_2.torrent")).unwrap(), b"THIRD");
}

#[tokio::test]
async fn test_page_of_unidentified_groups_does_not_end_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("request", "search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([
            {"Name": "Adventure", "Torrents": []},
            {"Name": "Combat"},
        ]))))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "Atari 2600",
        2,
        vec![group(20, "Yars' Revenge", vec![torrent(200, 20, "Yars' Revenge", 1, false)])],
    )
    .await;
    mount_page(&server, "Atari 2600", 3, vec![]).await;
    mount_quick_user(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let client = test_client(&server);
    let mut out = Vec::new();

    let summary = run_with_client(&client, &config(temp_dir.path(), true, &server), &mut out)
        .await
        .unwrap();

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.groups_seen, 1);
    assert_eq!(summary.printed, 1);
    assert!(String::from_utf8(out).unwrap().starts_with("Yars' Revenge\t"));
}

#[tokio::test]
async fn test_multiple_consoles_each_paginate() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "Atari 5200",
        1,
        vec![group(50, "Qix", vec![torrent(500, 50, "Qix", 1, false)])],
    )
    .await;
    mount_page(&server, "Atari 5200", 2, vec![]).await;
    mount_page(
        &server,
        "Atari 7800",
        1,
        vec![group(70, "Xevious", vec![torrent(700, 70, "Xevious", 1, false)])],
    )
    .await;
    mount_page(&server, "Atari 7800", 2, vec![]).await;
    mount_quick_user(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let mut run_config = config(temp_dir.path(), true, &server);
    run_config.consoles = vec!["Atari 5200".to_string(), "Atari 7800".to_string()];
    let client = test_client(&server);
    let mut out = Vec::new();

    let summary = run_with_client(&client, &run_config, &mut out).await.unwrap();

    assert_eq!(summary.pages_fetched, 4);
    assert_eq!(summary.printed, 2);
}

#[tokio::test]
async fn test_api_failure_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("request", "search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "failure", "error": "rate limit exceeded"})),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let client = test_client(&server);
    let mut out = Vec::new();

    let err = run_with_client(&client, &config(temp_dir.path(), false, &server), &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, GgnError::Api { .. }), "got {err:?}");
    assert!(err.to_string().contains("rate limit exceeded"));
}

#[tokio::test]
async fn test_rejected_token_aborts_run_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let client = test_client(&server);
    let mut out = Vec::new();

    let err = run_with_client(&client, &config(temp_dir.path(), true, &server), &mut out)
        .await
        .unwrap_err();

    assert!(err.is_auth(), "got {err:?}");
}

#[tokio::test]
async fn test_failed_download_aborts_without_leaking_keys() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "Atari 2600",
        1,
        vec![group(10, "Adventure", vec![torrent(100, 10, "Adventure", 1, false)])],
    )
    .await;
    mount_page(&server, "Atari 2600", 2, vec![]).await;
    mount_quick_user(&server).await;
    Mock::given(method("GET"))
        .and(path("/torrents.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let client = test_client(&server);
    let mut out = Vec::new();

    let err = run_with_client(&client, &config(temp_dir.path(), false, &server), &mut out)
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, GgnError::HttpStatus { status: 500, .. }), "got {err:?}");
    assert!(!message.contains("PASS"), "passkey leaked: {message}");
    assert!(!temp_dir.path().join("Adventure.torrent").exists());
}

#[tokio::test]
async fn test_page_with_json_object_list_parses() {
    // Groups may also arrive as a JSON array.
    let server = MockServer::start().await;
    let (_, adventure) = group(10, "Adventure", vec![torrent(100, 10, "Adventure", 1, false)]);
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("request", "search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([adventure]))))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "Atari 2600", 2, vec![]).await;
    mount_quick_user(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let client = test_client(&server);
    let mut out = Vec::new();

    let summary = run_with_client(&client, &config(temp_dir.path(), true, &server), &mut out)
        .await
        .unwrap();

    assert_eq!(summary.printed, 1);
}
