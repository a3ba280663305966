//! End-to-end tests.
//!
//! Runs the real robot client against a mock robot web service, drives
//! poll cycles, and scrapes the exposition router.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio::sync::watch;
use tower::ServiceExt;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storagebox_client::{Credentials, RobotClient};
use storagebox_exporter::build_router;
use storagebox_metrics::{Registry, fnv1a_32};
use storagebox_poller::{DecodeFailurePolicy, PollError, Poller, PollerConfig};

const LIST_ONE: &str = r#"[{"storagebox":{"id":1}}]"#;

const DETAIL_ONE: &str = r#"{"storagebox":{
    "id": 1,
    "name": "bx1",
    "disk_quota": 5000000,
    "disk_usage": 1200000,
    "location": "FSN1",
    "host_system": "FS1"
}}"#;

fn robot_client(server: &MockServer) -> RobotClient {
    RobotClient::new(
        server.uri(),
        Credentials::new("robot-user", "s3cret"),
        Duration::from_secs(5),
    )
    .unwrap()
}

async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(basic_auth("robot-user", "s3cret"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn scrape(registry: &Registry) -> String {
    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let resp = build_router(registry.clone(), "/metrics")
        .oneshot(req)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn sample_value(body: &str, metric: &str, id: &str) -> Option<f64> {
    let prefix = format!("{metric}{{id=\"{id}\",");
    body.lines()
        .find(|l| l.starts_with(&prefix))
        .and_then(|l| l.rsplit(' ').next())
        .and_then(|v| v.parse().ok())
}

#[tokio::test]
async fn one_cycle_exposes_storagebox_metrics() {
    let server = MockServer::start().await;
    mount(&server, "/storagebox", ResponseTemplate::new(200).set_body_string(LIST_ONE)).await;
    mount(&server, "/storagebox/1", ResponseTemplate::new(200).set_body_string(DETAIL_ONE)).await;

    let registry = Registry::new();
    let mut poller = Poller::new(robot_client(&server), registry.clone());
    assert_eq!(poller.run_cycle().await.unwrap(), 1);

    let body = scrape(&registry).await;
    assert!(body.contains(
        "storagebox_disk_quota{id=\"1\",name=\"bx1\",product=\"\",server=\"\",\
         location=\"FSN1\",host=\"FS1\"} 5000000\n"
    ));
    assert_eq!(sample_value(&body, "storagebox_disk_usage", "1"), Some(1_200_000.0));
    assert_eq!(
        sample_value(&body, "storagebox_location_hash", "1"),
        Some(f64::from(fnv1a_32("FSN1")))
    );
    assert_eq!(
        sample_value(&body, "storagebox_host_system_hash", "1"),
        Some(f64::from(fnv1a_32("FS1")))
    );
}

#[tokio::test]
async fn k_boxes_publish_k_label_sets() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/storagebox",
        ResponseTemplate::new(200)
            .set_body_string(r#"[{"storagebox":{"id":1}},{"storagebox":{"id":2}},{"storagebox":{"id":3}}]"#),
    )
    .await;
    for id in 1..=3 {
        mount(
            &server,
            &format!("/storagebox/{id}"),
            ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"storagebox":{{"id":{id},"name":"bx{id}","disk_quota":{q},"location":"HEL1"}}}}"#,
                q = id * 1000
            )),
        )
        .await;
    }

    let registry = Registry::new();
    let mut poller = Poller::new(robot_client(&server), registry.clone());
    assert_eq!(poller.run_cycle().await.unwrap(), 3);

    let body = scrape(&registry).await;
    for id in 1..=3 {
        let line = body
            .lines()
            .find(|l| l.starts_with(&format!("storagebox_disk_quota{{id=\"{id}\",")))
            .unwrap();
        assert!(line.contains(&format!("name=\"bx{id}\"")), "mixed labels: {line}");
        assert!(line.ends_with(&format!(" {}", id * 1000)));
    }
    assert_eq!(registry.len().await, 3 * 6);
}

#[tokio::test]
async fn failed_detail_leaves_registry_untouched() {
    let server = MockServer::start().await;
    mount(&server, "/storagebox", ResponseTemplate::new(200).set_body_string(LIST_ONE)).await;
    mount(&server, "/storagebox/1", ResponseTemplate::new(200).set_body_string(DETAIL_ONE)).await;

    let registry = Registry::new();
    let mut poller = Poller::new(robot_client(&server), registry.clone());
    poller.run_cycle().await.unwrap();
    let before = scrape(&registry).await;

    // The robot now lists a second box whose detail call is rate limited.
    server.reset().await;
    mount(
        &server,
        "/storagebox",
        ResponseTemplate::new(200).set_body_string(r#"[{"storagebox":{"id":1}},{"storagebox":{"id":2}}]"#),
    )
    .await;
    mount(
        &server,
        "/storagebox/1",
        ResponseTemplate::new(200).set_body_string(DETAIL_ONE.replace("1200000", "1300000")),
    )
    .await;
    mount(
        &server,
        "/storagebox/2",
        ResponseTemplate::new(403)
            .set_body_string(r#"{"error":{"status":403,"code":"RATE_LIMIT_EXCEEDED"}}"#),
    )
    .await;

    let err = poller.run_cycle().await.unwrap_err();
    assert!(matches!(err, PollError::Detail { id: 2, .. }));
    assert!(!err.is_decode());
    assert_eq!(scrape(&registry).await, before);
    assert_eq!(poller.boxes().len(), 1);
    assert_eq!(poller.boxes()[0].disk_usage, 1_200_000.0);
}

#[tokio::test]
async fn rejected_credentials_keep_serving_stale_metrics() {
    let server = MockServer::start().await;
    mount(&server, "/storagebox", ResponseTemplate::new(200).set_body_string(LIST_ONE)).await;
    mount(&server, "/storagebox/1", ResponseTemplate::new(200).set_body_string(DETAIL_ONE)).await;

    let registry = Registry::new();
    let mut poller = Poller::new(robot_client(&server), registry.clone());
    poller.run_cycle().await.unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/storagebox"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"error":{"status":401,"code":"UNAUTHORIZED"}}"#),
        )
        .mount(&server)
        .await;

    assert!(poller.run_cycle().await.is_err());
    let body = scrape(&registry).await;
    assert_eq!(sample_value(&body, "storagebox_disk_quota", "1"), Some(5_000_000.0));
}

#[tokio::test]
async fn non_json_error_body_skips_cycle_by_default() {
    let server = MockServer::start().await;
    mount(&server, "/storagebox", ResponseTemplate::new(200).set_body_string(LIST_ONE)).await;
    mount(&server, "/storagebox/1", ResponseTemplate::new(200).set_body_string(DETAIL_ONE)).await;

    let registry = Registry::new();
    let mut poller = Poller::new(robot_client(&server), registry.clone());
    poller.run_cycle().await.unwrap();
    let before = scrape(&registry).await;

    server.reset().await;
    mount(
        &server,
        "/storagebox",
        ResponseTemplate::new(503).set_body_string("<html>Service Unavailable</html>"),
    )
    .await;

    let err = poller.run_cycle().await.unwrap_err();
    assert!(err.is_decode());
    assert_eq!(poller.boxes().len(), 1);
    assert_eq!(scrape(&registry).await, before);
}

#[tokio::test]
async fn non_json_error_body_stops_poller_when_configured() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/storagebox",
        ResponseTemplate::new(500).set_body_string("Internal Server Error"),
    )
    .await;

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = Poller::new(robot_client(&server), Registry::new()).with_config(PollerConfig {
        decode_failure: DecodeFailurePolicy::Exit,
    });

    let result = tokio::time::timeout(Duration::from_secs(10), poller.spawn(shutdown_rx))
        .await
        .expect("poller should stop on its own")
        .unwrap();
    let err = result.unwrap_err();
    assert!(err.is_decode());
    assert!(matches!(err, PollError::List(_)));
}

#[tokio::test]
async fn spawned_poller_publishes_then_shuts_down() {
    let server = MockServer::start().await;
    mount(&server, "/storagebox", ResponseTemplate::new(200).set_body_string(LIST_ONE)).await;
    mount(&server, "/storagebox/1", ResponseTemplate::new(200).set_body_string(DETAIL_ONE)).await;

    let registry = Registry::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = Poller::new(robot_client(&server), registry.clone()).spawn(shutdown_rx);

    // The first cycle runs immediately after spawn.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while registry.is_empty().await {
        assert!(tokio::time::Instant::now() < deadline, "first cycle never published");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    shutdown_tx.send(true).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("poller should honour shutdown")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(registry.len().await, 6);
}
