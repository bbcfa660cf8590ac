//! End-to-end cycles: on-disk registry, real HTTP probes, webhook alerts.

mod helpers;

use std::sync::Arc;

use domain_watch::notify::NotificationSink;
use domain_watch::{
    CheckResult, Checker, DomainTarget, Monitor, NotifyError, SqliteStore, Status, StatusStore,
    Transition, WebhookSink,
};
use helpers::{local_http_probe, test_config};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn temp_store() -> (TempDir, SqliteStore) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let store = SqliteStore::open(&dir.path().join("watch.db"))
        .await
        .expect("Failed to open store");
    (dir, store)
}

#[tokio::test]
async fn test_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("watch.db");
    {
        let store = SqliteStore::open(&db_path).await.unwrap();
        store
            .add_domains("Web", &["a.example".to_string()])
            .await
            .unwrap();
        store
            .bulk_apply(&[CheckResult::responded(
                &DomainTarget::new("a.example", "Web"),
                200,
                0.1,
            )])
            .await
            .unwrap();
    }

    let reopened = SqliteStore::open(&db_path).await.unwrap();
    let previous = reopened
        .get_previous_statuses(&["a.example".to_string()])
        .await
        .unwrap();
    assert_eq!(previous.get("a.example"), Some(&Status::Up));
}

#[tokio::test]
async fn test_cycle_alerts_once_per_change() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthy"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&site)
        .await;
    let broken = Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .mount_as_scoped(&site)
        .await;

    let hook = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/alerts"))
        .and(body_string_contains("DOMAIN DOWN ALERT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .named("down alert")
        .mount(&hook)
        .await;
    Mock::given(method("POST"))
        .and(path("/alerts"))
        .and(body_string_contains("DOMAIN RECOVERED"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .named("recovery alert")
        .mount(&hook)
        .await;

    let (_dir, store) = temp_store().await;
    let store = Arc::new(store);
    let healthy = format!("{}/healthy", site.uri());
    let flaky = format!("{}/flaky", site.uri());
    store
        .add_domains("Web", &[healthy.clone(), flaky.clone()])
        .await
        .unwrap();

    let config = test_config(10, 10);
    let checker = Checker::new(local_http_probe(&config, &[]).await, config).unwrap();
    let sink = WebhookSink::new(vec![format!("{}/alerts", hook.uri())], "domain_watch_test/1.0")
        .unwrap();
    let monitor = Monitor::new(checker, store.clone(), store.clone()).with_sink(Arc::new(sink));

    // Cycle 1: flaky goes DOWN from never-checked
    let first = monitor
        .check_once(Some("Web"), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first.transitions.len(), 1);
    assert_eq!(first.transitions[0].domain, flaky);
    assert_eq!(first.notify_failures, 0);

    // Cycle 2: nothing changed, nothing sent
    let second = monitor
        .check_once(Some("Web"), CancellationToken::new())
        .await
        .unwrap();
    assert!(second.transitions.is_empty());

    // Cycle 3: flaky recovers
    drop(broken);
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&site)
        .await;
    let third = monitor
        .check_once(Some("Web"), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(third.transitions.len(), 1);
    assert!(third.transitions[0].is_recovery());

    let summary = store.group_summary().await.unwrap();
    assert_eq!(summary["Web"].up, 2);
    assert_eq!(summary["Web"].down, 0);
    assert_eq!(monitor.state().cycles_completed.load(std::sync::atomic::Ordering::SeqCst), 3);

    // Expectations on `hook` are verified when it drops
}

#[tokio::test]
async fn test_webhook_failure_does_not_block_other_recipients() {
    let good = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&good)
        .await;
    let bad = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&bad)
        .await;

    // Failing recipient first, so delivery must continue past it
    let sink = WebhookSink::new(
        vec![format!("{}/hook", bad.uri()), format!("{}/hook", good.uri())],
        "domain_watch_test/1.0",
    )
    .unwrap();
    let result = CheckResult::responded(&DomainTarget::ungrouped("api.example"), 502, 0.2);
    let transition = Transition::from_result(Some(Status::Up), &result);

    let failures = sink.notify(&transition).await;
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        &failures[0],
        NotifyError::Rejected { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_webhook_payload_carries_transition() {
    let hook = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"domain\":\"api.example\""))
        .and(body_string_contains("\"current\":\"down\""))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&hook)
        .await;

    let sink = WebhookSink::new(vec![hook.uri()], "domain_watch_test/1.0").unwrap();
    let result = CheckResult::responded(&DomainTarget::ungrouped("api.example"), 502, 0.2);
    let failures = sink
        .notify(&Transition::from_result(None, &result))
        .await;
    assert!(failures.is_empty());
}

#[tokio::test]
async fn test_unreachable_recipient_is_retried_then_reported() {
    let dead = format!("http://127.0.0.1:{}/hook", helpers::closed_port());
    let sink = WebhookSink::new(vec![dead.clone()], "domain_watch_test/1.0").unwrap();
    let result = CheckResult::responded(&DomainTarget::ungrouped("api.example"), 502, 0.2);

    let started = std::time::Instant::now();
    let failures = sink
        .notify(&Transition::from_result(Some(Status::Up), &result))
        .await;

    assert_eq!(failures.len(), 1);
    assert!(matches!(
        &failures[0],
        NotifyError::Delivery { recipient, .. } if *recipient == dead
    ));
    // Two backoff delays (200ms, 400ms) before giving up
    assert!(started.elapsed() >= std::time::Duration::from_millis(600));
}
