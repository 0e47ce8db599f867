use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::util::ServiceExt;

use port_probe_rs::executor::InProcessExecutor;
use port_probe_rs::forwarder::ResultForwarder;
use port_probe_rs::jobs::{JobManager, UNKNOWN_SCAN_ID};
use port_probe_rs::scanner::ProbeOpts;
use port_probe_rs::server::{router, AppState};
use port_probe_rs::types::{PortProbeResult, ScanRange};

fn test_state() -> AppState {
    let probe = ProbeOpts::default();
    let executor = InProcessExecutor::new(ScanRange::new(1, 100).unwrap(), probe.clone());
    AppState {
        jobs: Arc::new(JobManager::new(
            Arc::new(executor),
            // Forwarding target is irrelevant for these boundary tests.
            ResultForwarder::new("http://127.0.0.1:9"),
        )),
        probe,
    }
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn sync_scan_rejects_inverted_range() {
    let app = router(test_state());
    let response = app
        .oneshot(json_post(
            "/api/scan",
            r#"{"targetIp":"127.0.0.1","startPort":443,"endPort":80}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("invalid port range"));
}

#[tokio::test]
async fn sync_scan_rejects_empty_host() {
    let app = router(test_state());
    let response = app
        .oneshot(json_post(
            "/api/scan",
            r#"{"targetIp":"  ","startPort":1,"endPort":10}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sync_scan_returns_probe_results() {
    let app = router(test_state());
    let response = app
        .oneshot(json_post(
            "/api/scan",
            r#"{"targetIp":"127.0.0.1","startPort":47500,"endPort":47509}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let results: Vec<PortProbeResult> =
        serde_json::from_str(&body_string(response).await).unwrap();
    for r in results {
        assert!((47500..=47509).contains(&r.port));
    }
}

#[tokio::test]
async fn status_of_unknown_id_is_sentinel() {
    let app = router(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, UNKNOWN_SCAN_ID);
}

#[tokio::test]
async fn execute_returns_job_id_synchronously() {
    let app = router(test_state());
    let response = app
        .oneshot(json_post(
            "/api/execute",
            r#"{"reportId":7,"option":"127.0.0.1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.starts_with("Scan launched with ID: "), "got: {body}");
}
