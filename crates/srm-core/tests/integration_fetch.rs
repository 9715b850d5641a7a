//! Integration tests: resilient fetch against a local sheet-endpoint server.
//!
//! Starts a minimal cloud-function stand-in with failure injection and
//! exercises the fetch core end to end: parsing, retry, offline guard,
//! supersession, timeout, and write submission.

mod common;

use common::sheet_server::{self, SheetServerOptions};
use srm_core::config::{RetryConfig, SrmConfig};
use srm_core::connectivity::ConnectivityState;
use srm_core::endpoint::Write;
use srm_core::fetcher::ResilientFetcher;
use srm_core::retry::{FetchError, RetryNotice};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

fn test_config() -> SrmConfig {
    SrmConfig {
        timeout_secs: 10,
        retry: Some(RetryConfig {
            max_attempts: 3,
            delay_secs: 0.05,
        }),
        ..SrmConfig::default()
    }
}

fn fetcher_for(base_url: &str, cfg: &SrmConfig) -> (ResilientFetcher, ConnectivityState) {
    let connectivity = ConnectivityState::new();
    let endpoint = Url::parse(base_url).unwrap();
    let fetcher = ResilientFetcher::from_config(cfg, endpoint, connectivity.clone());
    (fetcher, connectivity)
}

#[tokio::test]
async fn fetch_list_returns_records() {
    let server = sheet_server::start(SheetServerOptions {
        get_body: r#"[{"id":"1","name":"A"}]"#.to_string(),
        ..SheetServerOptions::default()
    });
    let (fetcher, _) = fetcher_for(&server.base_url, &test_config());

    let records = fetcher.fetch_list().await.expect("fetch_list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("id"), Some("1"));
    assert_eq!(records[0].get("name"), Some("A"));
    assert_eq!(server.hits(), 1);

    let request = server.last_request().expect("request seen");
    assert!(request.contains("action=getData"), "request: {request}");
}

#[tokio::test]
async fn envelope_deployment_parses_too() {
    let server = sheet_server::start(SheetServerOptions {
        get_body: r#"{"status":"success","data":[{"id":"7","name":"B"}]}"#.to_string(),
        ..SheetServerOptions::default()
    });
    let (fetcher, _) = fetcher_for(&server.base_url, &test_config());

    let records = fetcher.fetch_list().await.expect("fetch_list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("id"), Some("7"));
}

#[tokio::test]
async fn retry_recovers_after_transient_failures() {
    let server = sheet_server::start(SheetServerOptions {
        get_body: r#"[{"id":"1"}]"#.to_string(),
        fail_first: 2,
        ..SheetServerOptions::default()
    });
    let (fetcher, _) = fetcher_for(&server.base_url, &test_config());

    let (tx, mut rx) = tokio::sync::mpsc::channel::<RetryNotice>(8);
    let records = fetcher
        .fetch_list_with_retry(Some(&tx))
        .await
        .expect("retry should recover");
    assert_eq!(records.len(), 1);
    assert_eq!(server.hits(), 3, "two failures plus the success");

    drop(tx);
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    assert_eq!(notices.len(), 2, "one notice per failed attempt");
    assert_eq!(notices[0].attempt, 1);
    assert_eq!(notices[1].attempt, 2);
    assert!(notices[0].error.contains("HTTP 500"));
}

#[tokio::test]
async fn exhausted_retries_yield_empty_list_and_server_error() {
    let server = sheet_server::start(SheetServerOptions {
        get_body: r#"[{"id":"1"}]"#.to_string(),
        fail_first: 99,
        ..SheetServerOptions::default()
    });
    let mut cfg = test_config();
    cfg.retry = Some(RetryConfig {
        max_attempts: 2,
        delay_secs: 0.05,
    });
    let (fetcher, _) = fetcher_for(&server.base_url, &cfg);

    let outcome = fetcher.refresh(None).await;
    assert!(outcome.records.is_empty());
    assert!(!outcome.cancelled);
    assert!(matches!(outcome.error, Some(FetchError::ServerError { .. })));
    assert_eq!(server.hits(), 2, "bound includes the first attempt");
}

#[tokio::test]
async fn offline_fails_immediately_with_zero_requests() {
    let server = sheet_server::start(SheetServerOptions::default());
    let (fetcher, connectivity) = fetcher_for(&server.base_url, &test_config());
    connectivity.set_online(false);

    let result = fetcher.fetch_list().await;
    assert!(matches!(result, Err(FetchError::Offline)));
    assert_eq!(server.hits(), 0, "offline must not touch the network");

    // Back online, the same fetcher works again.
    connectivity.set_online(true);
    fetcher.fetch_list().await.expect("online fetch");
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn newer_refresh_supersedes_older() {
    let server = sheet_server::start(SheetServerOptions {
        get_body: r#"[{"id":"1","name":"fresh"}]"#.to_string(),
        delay_first: Some(Duration::from_secs(2)),
        ..SheetServerOptions::default()
    });
    let (fetcher, _) = fetcher_for(&server.base_url, &test_config());
    let fetcher = Arc::new(fetcher);

    let slow = {
        let fetcher = Arc::clone(&fetcher);
        tokio::spawn(async move { fetcher.fetch_list().await })
    };
    // Let the first request reach the server before superseding it.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let records = fetcher.fetch_list().await.expect("second refresh");
    assert_eq!(records[0].get("name"), Some("fresh"));

    let first = slow.await.expect("join");
    assert!(
        matches!(first, Err(FetchError::Cancelled)),
        "superseded refresh must resolve Cancelled, got {first:?}"
    );
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = sheet_server::start(SheetServerOptions {
        delay_first: Some(Duration::from_secs(3)),
        ..SheetServerOptions::default()
    });
    let mut cfg = test_config();
    cfg.timeout_secs = 1;
    let (fetcher, _) = fetcher_for(&server.base_url, &cfg);

    let result = fetcher.fetch_list().await;
    match result {
        Err(FetchError::Timeout { limit }) => assert_eq!(limit, Duration::from_secs(1)),
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_server_error() {
    let server = sheet_server::start(SheetServerOptions {
        get_body: "<html>maintenance</html>".to_string(),
        ..SheetServerOptions::default()
    });
    let (fetcher, _) = fetcher_for(&server.base_url, &test_config());

    let result = fetcher.fetch_list().await;
    assert!(matches!(result, Err(FetchError::ServerError { .. })));
}

#[tokio::test]
async fn fetch_headers_returns_columns() {
    let server = sheet_server::start(SheetServerOptions {
        get_body: r#"["ID","Name","Status"]"#.to_string(),
        ..SheetServerOptions::default()
    });
    let (fetcher, _) = fetcher_for(&server.base_url, &test_config());

    let headers = fetcher.fetch_headers().await.expect("fetch_headers");
    assert_eq!(headers, vec!["ID", "Name", "Status"]);
    let request = server.last_request().expect("request seen");
    assert!(request.contains("action=getHeaders"), "request: {request}");
}

#[tokio::test]
async fn submit_posts_write_and_parses_ack() {
    let server = sheet_server::start(SheetServerOptions {
        post_body: r#"{"status":"success","message":"saved"}"#.to_string(),
        ..SheetServerOptions::default()
    });
    let (fetcher, _) = fetcher_for(&server.base_url, &test_config());

    let write = Write::Add {
        id: Some("7".to_string()),
        fields: vec![("name".to_string(), "A".to_string())],
    };
    let ack = fetcher.submit(&write).await.expect("submit");
    assert_eq!(ack.message.as_deref(), Some("saved"));
    assert_eq!(server.hits(), 1);

    let request = server.last_request().expect("request seen");
    assert!(request.starts_with("POST"), "request: {request}");
    assert!(request.contains("application/json"), "request: {request}");
    assert!(request.contains(r#""action":"addData""#), "request: {request}");
    assert!(request.contains(r#""id":"7""#), "request: {request}");
}

#[tokio::test]
async fn failed_write_is_not_retried() {
    let server = sheet_server::start(SheetServerOptions {
        post_body: r#"{"status":"error","message":"bad row"}"#.to_string(),
        ..SheetServerOptions::default()
    });
    let (fetcher, _) = fetcher_for(&server.base_url, &test_config());

    let write = Write::Delete {
        id: "9".to_string(),
    };
    let result = fetcher.submit(&write).await;
    match result {
        Err(FetchError::ServerError { message, .. }) => assert!(message.contains("bad row")),
        other => panic!("expected ServerError, got {other:?}"),
    }
    assert_eq!(server.hits(), 1, "writes are never retried");
}
