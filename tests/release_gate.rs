//! Release gate tests.
//!
//! Uses wiremock to serve release statuses and check the verdict.

use kdt::release::{evaluate, FailingCategory};
use kdt::{Config, KdtError, KonduktoClient, ToolCategory};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> KonduktoClient {
    let config = Config::new(&server.uri(), "test-token").unwrap();
    KonduktoClient::new(&config).unwrap()
}

fn sast_failing() -> serde_json::Value {
    serde_json::json!({
        "status": "fail",
        "sast": { "status": "fail", "scan_id": "scan-sast" },
        "dast": { "status": "pass" },
        "sca": { "status": "pass" }
    })
}

async fn mount_release(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v2/projects/p-1/release"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sast_failure_fails_unrestricted_gate() {
    let mock_server = MockServer::start().await;
    mount_release(&mock_server, sast_failing()).await;

    let client = client_for(&mock_server);
    let verdict = evaluate(&client, "p-1", &[]).await.unwrap();

    assert!(!verdict.passed);
    assert_eq!(
        verdict.failing,
        vec![FailingCategory {
            category: ToolCategory::Sast,
            scan_id: Some("scan-sast".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_sast_failure_passes_dast_only_gate() {
    let mock_server = MockServer::start().await;
    mount_release(&mock_server, sast_failing()).await;

    let client = client_for(&mock_server);
    let verdict = evaluate(&client, "p-1", &[ToolCategory::Dast]).await.unwrap();

    assert!(verdict.passed);
    assert!(verdict.failing.is_empty());
    assert_eq!(verdict.ignored.len(), 1);
}

#[tokio::test]
async fn test_undefined_criteria_always_pass() {
    let mock_server = MockServer::start().await;
    mount_release(
        &mock_server,
        serde_json::json!({
            "status": "undefined",
            "sast": { "status": "fail" }
        }),
    )
    .await;

    let client = client_for(&mock_server);
    let verdict = evaluate(&client, "p-1", &[ToolCategory::Sast]).await.unwrap();

    assert!(verdict.passed);
    assert!(verdict.undefined);
}

#[tokio::test]
async fn test_upper_case_category_keys_are_accepted() {
    let mock_server = MockServer::start().await;
    mount_release(
        &mock_server,
        serde_json::json!({
            "status": "fail",
            "SCA": { "status": "fail", "scan_id": "scan-sca" }
        }),
    )
    .await;

    let client = client_for(&mock_server);
    let verdict = evaluate(&client, "p-1", &[]).await.unwrap();

    assert_eq!(verdict.failing_names(), vec!["SCA"]);
}

#[tokio::test]
async fn test_empty_project_id_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = evaluate(&client, "", &[]).await;

    assert!(matches!(
        result,
        Err(KdtError::NotFound {
            entity_type: "Project",
            ..
        })
    ));
}

#[tokio::test]
async fn test_release_lookup_failure_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/projects/p-1/release"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "error": "boom" })),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = evaluate(&client, "p-1", &[]).await;

    match result {
        Err(KdtError::Upstream {
            message,
            status_code,
        }) => {
            assert_eq!(status_code, Some(500));
            assert!(message.contains("boom"));
        }
        other => panic!("Expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failing_scan_is_fetched_on_demand() {
    let mock_server = MockServer::start().await;
    mount_release(&mock_server, sast_failing()).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/scans/scan-sast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "scan-sast",
            "tool": "semgrep",
            "summary": { "critical": 2 }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let verdict = evaluate(&client, "p-1", &[]).await.unwrap();

    let scan = verdict.failing[0].scan(&client).await.unwrap();
    assert_eq!(scan.tool, "semgrep");
    assert_eq!(scan.summary.critical, 2);
}
