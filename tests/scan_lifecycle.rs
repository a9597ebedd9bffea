//! Scan start and wait tests.
//!
//! Uses wiremock to script event snapshots and check what the controller
//! reports and how it terminates.

use std::time::Duration;

use kdt::lifecycle::{ScanController, ScanTarget, WaitMode};
use kdt::{Config, CustomParams, KdtError, KonduktoClient, ParamValue, RestartOptions, Scan};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TICK: Duration = Duration::from_millis(5);

fn client_for(server: &MockServer) -> KonduktoClient {
    let config = Config::new(&server.uri(), "test-token").unwrap();
    KonduktoClient::new(&config).unwrap()
}

fn event_json(status: i32, active: i32) -> serde_json::Value {
    serde_json::json!({
        "id": "ev-1",
        "status": status,
        "active": active,
        "scan_id": "scan-2",
        "message": ""
    })
}

/// Serve `snapshot` for the next `times` status requests.
async fn mount_snapshot(server: &MockServer, snapshot: serde_json::Value, times: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v2/events/ev-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

async fn mount_restart(server: &MockServer, scan_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/api/v2/scans/{scan_id}/restart")))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({ "event": "ev-1" })),
        )
        .expect(1)
        .mount(server)
        .await;
}

// =============================================================================
// Start
// =============================================================================

#[tokio::test]
async fn test_restart_returns_event_id_on_201() {
    let mock_server = MockServer::start().await;
    mount_restart(&mock_server, "scan-1").await;

    let client = client_for(&mock_server);
    let event = Scan::restart(&client, "scan-1").await.unwrap();

    assert_eq!(event, "ev-1");
}

#[tokio::test]
async fn test_restart_with_200_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/scans/scan-1/restart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "event": "ev-1" })),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = Scan::restart(&client, "scan-1").await;

    assert!(matches!(
        result,
        Err(KdtError::Upstream {
            status_code: Some(200),
            ..
        })
    ));
}

#[tokio::test]
async fn test_restart_without_event_id_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/scans/scan-1/restart"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = Scan::restart(&client, "scan-1").await;

    assert!(matches!(result, Err(KdtError::Upstream { .. })));
}

#[tokio::test]
async fn test_restart_with_options_posts_overrides() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/scans/scan-1/restart_with_option"))
        .and(body_json(serde_json::json!({
            "branch": "hotfix",
            "custom": { "params": { "depth": 3 } }
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({ "event": "ev-7" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let options = RestartOptions {
        branch: Some("hotfix".to_string()),
        custom: Some(CustomParams {
            params: ParamValue::from_assignments(["depth=3"]).unwrap(),
        }),
    };

    let controller = ScanController::new(&client);
    let event = controller.start("scan-1", Some(&options)).await.unwrap();

    assert_eq!(event, "ev-7");
}

// =============================================================================
// Wait
// =============================================================================

#[tokio::test]
async fn test_wait_reports_only_status_changes() {
    let mock_server = MockServer::start().await;

    mount_snapshot(&mock_server, event_json(0, 1), 2).await;
    mount_snapshot(&mock_server, event_json(1, 1), 3).await;
    mount_snapshot(&mock_server, event_json(2, 1), 1).await;
    mount_snapshot(&mock_server, event_json(4, 0), 1).await;

    let client = client_for(&mock_server);
    let controller = ScanController::new(&client).with_poll_interval(TICK);

    let mut reported = Vec::new();
    let event = controller
        .wait("ev-1", |e| reported.push(e.status))
        .await
        .unwrap();

    assert_eq!(reported, vec![0, 1, 2]);
    assert_eq!(event.status, 4);
    assert_eq!(event.scan_id, "scan-2");
}

#[tokio::test]
async fn test_wait_fails_on_failed_activity() {
    let mock_server = MockServer::start().await;

    mount_snapshot(&mock_server, event_json(1, 1), 1).await;
    mount_snapshot(
        &mock_server,
        serde_json::json!({
            "id": "ev-1",
            "status": 1,
            "active": -1,
            "message": "agent crashed"
        }),
        1,
    )
    .await;

    let client = client_for(&mock_server);
    let controller = ScanController::new(&client).with_poll_interval(TICK);

    let result = controller.wait("ev-1", |_| {}).await;

    match result {
        Err(KdtError::ScanFailed { event_id, message }) => {
            assert_eq!(event_id, "ev-1");
            assert_eq!(message, "agent crashed");
        }
        other => panic!("Expected ScanFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wait_keeps_polling_inactive_unfinished_event() {
    let mock_server = MockServer::start().await;

    mount_snapshot(&mock_server, event_json(3, 0), 3).await;
    mount_snapshot(&mock_server, event_json(4, 0), 1).await;

    let client = client_for(&mock_server);
    let controller = ScanController::new(&client).with_poll_interval(TICK);

    let mut reported = 0;
    let event = controller.wait("ev-1", |_| reported += 1).await.unwrap();

    assert_eq!(event.status, 4);
    // Inactive snapshots are never reported
    assert_eq!(reported, 0);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_wait_rejects_unknown_activity() {
    let mock_server = MockServer::start().await;
    mount_snapshot(&mock_server, event_json(1, 7), 1).await;

    let client = client_for(&mock_server);
    let controller = ScanController::new(&client).with_poll_interval(TICK);

    let result = controller.wait("ev-1", |_| {}).await;

    assert!(matches!(result, Err(KdtError::ProtocolViolation(_))));
}

#[tokio::test]
async fn test_wait_propagates_polling_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/events/ev-1/status"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let controller = ScanController::new(&client).with_poll_interval(TICK);

    let result = controller.wait("ev-1", |_| {}).await;

    assert!(matches!(
        result,
        Err(KdtError::Upstream {
            status_code: Some(502),
            ..
        })
    ));
}

// =============================================================================
// Run
// =============================================================================

#[tokio::test]
async fn test_run_async_does_not_poll() {
    let mock_server = MockServer::start().await;
    mount_restart(&mock_server, "scan-1").await;

    Mock::given(method("GET"))
        .and(path("/api/v2/events/ev-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json(4, 0)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let controller = ScanController::new(&client).with_poll_interval(TICK);

    let run = controller
        .run(
            &ScanTarget::Id("scan-1".to_string()),
            None,
            WaitMode::Async,
            |_| {},
        )
        .await
        .unwrap();

    assert_eq!(run.scan_id, "scan-1");
    assert_eq!(run.event_id, "ev-1");
    assert!(run.completed.is_none());
    assert!(run.project.is_none());
}

#[tokio::test]
async fn test_run_by_project_and_tool_picks_latest_scan() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/projects"))
        .and(query_param("name", "payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "projects": [{ "id": "p-1", "name": "payments" }],
            "total": 1
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/scans"))
        .and(query_param("project", "p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "scans": [
                { "id": "scan-trivy", "tool": "trivy", "branch": "main" },
                { "id": "scan-2", "tool": "semgrep", "branch": "main" },
                { "id": "scan-1", "tool": "semgrep", "branch": "main" }
            ],
            "total": 3
        })))
        .mount(&mock_server)
        .await;

    mount_restart(&mock_server, "scan-2").await;
    mount_snapshot(&mock_server, event_json(1, 1), 1).await;
    mount_snapshot(&mock_server, event_json(4, 0), 1).await;

    let client = client_for(&mock_server);
    let controller = ScanController::new(&client).with_poll_interval(TICK);

    let target = ScanTarget::ProjectTool {
        project: "payments".to_string(),
        tool: "semgrep".to_string(),
        branch: None,
    };
    let run = controller
        .run(&target, None, WaitMode::Block, |_| {})
        .await
        .unwrap();

    assert_eq!(run.scan_id, "scan-2");
    assert_eq!(run.project.unwrap().id, "p-1");
    assert_eq!(run.completed.unwrap().status, 4);
}

#[tokio::test]
async fn test_run_without_matching_tool_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "projects": [{ "id": "p-1", "name": "payments" }],
            "total": 1
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/scans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "scans": [{ "id": "scan-trivy", "tool": "trivy" }],
            "total": 1
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let controller = ScanController::new(&client);

    let target = ScanTarget::ProjectTool {
        project: "payments".to_string(),
        tool: "semgrep".to_string(),
        branch: None,
    };
    let result = controller.run(&target, None, WaitMode::Block, |_| {}).await;

    assert!(matches!(
        result,
        Err(KdtError::NotFound {
            entity_type: "Scan",
            ..
        })
    ));
}
