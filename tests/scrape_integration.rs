//! Scrape integration tests
//!
//! End-to-end tests through the HTTP router that verify:
//! - Gauges are published after a successful cycle
//! - Last good values survive failed cycles
//! - The 502 policy when stale values are disabled

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use hadoop_jmx_exporter::config::Config;
use hadoop_jmx_exporter::roles::Role;
use hadoop_jmx_exporter::server::{router, AppState};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn datanode_document(capacity: i64) -> serde_json::Value {
    json!({
        "beans": [
            {
                "name": "Hadoop:service=DataNode,name=FSDatasetState",
                "Capacity": capacity,
                "DfsUsed": 1_000_000,
                "Remaining": 4_000_000,
                "NumFailedVolumes": 0
            },
            {
                "name": "Hadoop:service=DataNode,name=JvmMetrics",
                "GcCount": 7
            }
        ]
    })
}

async fn mount_json(mock_server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/jmx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

fn datanode_config(mock_server: &MockServer) -> Config {
    let mut config = Config::default();
    config.role = Role::DataNode;
    config.jmx.url = Some(format!("{}/jmx", mock_server.uri()));
    config.jmx.timeout_ms = 1000;
    config
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_scrape_publishes_gauges() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, datanode_document(5_000_000)).await;

    let app = router(AppState::new(datanode_config(&mock_server)).unwrap());
    let (status, content_type, body) = get(&app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert!(body.contains("# HELP datanode_Capacity Capacity in bytes"));
    assert!(body.contains("# TYPE datanode_Capacity gauge"));
    assert!(body.contains("datanode_Capacity 5000000"));
    assert!(body.contains("datanode_DfsUsed 1000000"));
    assert!(body.contains("datanode_NumFailedVolumes 0"));
    assert!(body.contains("datanode_GcCount 7"));
    assert!(body.contains("hadoop_exporter_up{role=\"datanode\"} 1"));
    // Optional fields absent from the document are not published
    assert!(!body.contains("datanode_CacheUsed"));
    assert!(!body.contains("datanode_heapMemoryUsageUsed"));
}

#[tokio::test]
async fn test_failed_scrape_serves_last_good_values() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, datanode_document(5_000_000)).await;

    let app = router(AppState::new(datanode_config(&mock_server)).unwrap());
    let (status, _, _) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    mock_server.reset().await;
    Mock::given(method("GET"))
        .and(path("/jmx"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let (status, _, body) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("datanode_Capacity 5000000"));
    assert!(body.contains("hadoop_exporter_up{role=\"datanode\"} 0"));
    assert!(body.contains(
        "hadoop_exporter_scrape_failures_total{kind=\"fetch\",role=\"datanode\"} 1"
    ));
    assert!(body.contains("hadoop_exporter_scrapes_total{role=\"datanode\"} 2"));
}

#[tokio::test]
async fn test_missing_required_field_keeps_previous_values() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, datanode_document(5_000_000)).await;

    let app = router(AppState::new(datanode_config(&mock_server)).unwrap());
    get(&app, "/metrics").await;

    let mut document = datanode_document(9_000_000);
    document["beans"][0]
        .as_object_mut()
        .unwrap()
        .remove("Remaining");
    mock_server.reset().await;
    mount_json(&mock_server, document).await;

    let (status, _, body) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("datanode_Capacity 5000000"));
    assert!(!body.contains("datanode_Capacity 9000000"));
    assert!(body.contains(
        "hadoop_exporter_scrape_failures_total{kind=\"missing_field\",role=\"datanode\"} 1"
    ));
}

#[tokio::test]
async fn test_recovery_replaces_snapshot() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, datanode_document(5_000_000)).await;

    let app = router(AppState::new(datanode_config(&mock_server)).unwrap());
    get(&app, "/metrics").await;

    mock_server.reset().await;
    mount_json(
        &mock_server,
        json!({"beans": [{
            "name": "Hadoop:service=DataNode,name=FSDatasetState",
            "Capacity": 6_000_000,
            "DfsUsed": 2_000_000,
            "Remaining": 3_000_000
        }]}),
    )
    .await;

    let (_, _, body) = get(&app, "/metrics").await;
    assert!(body.contains("datanode_Capacity 6000000"));
    assert!(body.contains("hadoop_exporter_up{role=\"datanode\"} 1"));
    // Optional values from the previous snapshot do not linger
    assert!(!body.contains("datanode_GcCount"));
    assert!(!body.contains("datanode_NumFailedVolumes"));
}

#[tokio::test]
async fn test_first_scrape_failure_has_no_role_gauges() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jmx"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let app = router(AppState::new(datanode_config(&mock_server)).unwrap());
    let (status, _, body) = get(&app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("datanode_"));
    assert!(body.contains("hadoop_exporter_up{role=\"datanode\"} 0"));
    assert!(body.contains(
        "hadoop_exporter_scrape_failures_total{kind=\"malformed\",role=\"datanode\"} 1"
    ));
}

#[tokio::test]
async fn test_stale_disabled_returns_bad_gateway() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jmx"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let mut config = datanode_config(&mock_server);
    config.server.serve_stale_on_failure = false;

    let app = router(AppState::new(config).unwrap());
    let (status, _, body) = get(&app, "/metrics").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, "Upstream error");
}

#[tokio::test]
async fn test_custom_metrics_path() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, datanode_document(5_000_000)).await;

    let mut config = datanode_config(&mock_server);
    config.server.path = "/prometheus".to_string();

    let app = router(AppState::new(config).unwrap());
    let (status, _, body) = get(&app, "/prometheus").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("datanode_Capacity 5000000"));

    let (status, _, _) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoint() {
    let mock_server = MockServer::start().await;
    let app = router(AppState::new(datanode_config(&mock_server)).unwrap());

    let (status, _, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["role"], "datanode");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_root_endpoint() {
    let mock_server = MockServer::start().await;
    let app = router(AppState::new(datanode_config(&mock_server)).unwrap());

    let (status, _, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Hadoop datanode Exporter"));
    assert!(body.contains(&format!("{}/jmx", mock_server.uri())));
}
