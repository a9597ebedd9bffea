//! SBOM and endpoint import tests.

use std::io::Write;

use kdt::import::{import_endpoints, import_sbom, EndpointFormat};
use kdt::{Config, KdtError, KonduktoClient};
use tempfile::NamedTempFile;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn client_for(server: &MockServer) -> KonduktoClient {
    let config = Config::new(&server.uri(), "test-token").unwrap();
    KonduktoClient::new(&config).unwrap()
}

fn file_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

#[tokio::test]
async fn test_sbom_import_uploads_file_for_resolved_project() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/projects"))
        .and(query_param("name", "payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "projects": [
                { "id": "p-1", "name": "payments" },
                { "id": "p-2", "name": "payments" }
            ],
            "total": 2
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/sbom/upload"))
        .and(header("X-Cookie", "test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "message": "sbom queued" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let sbom = file_with(r#"{"bomFormat":"CycloneDX","specVersion":"1.5"}"#);
    let client = client_for(&mock_server);

    let receipt = import_sbom(&client, sbom.path(), "payments", Some("main"))
        .await
        .unwrap();
    assert_eq!(receipt.message, "sbom queued");

    let requests = mock_server.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|r| r.url.path() == "/api/v2/sbom/upload")
        .unwrap();

    let content_type = upload.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = body_text(upload);
    assert!(body.contains("CycloneDX"));
    assert!(body.contains("name=\"project\""));
    // Ambiguous names resolve to the first exact match
    assert!(body.contains("p-1"));
    assert!(!body.contains("p-2"));
    assert!(body.contains("name=\"branch\""));
}

#[tokio::test]
async fn test_sbom_import_rejects_empty_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "projects": [{ "id": "p-1", "name": "payments" }],
            "total": 1
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let empty = NamedTempFile::new().unwrap();
    let client = client_for(&mock_server);

    let result = import_sbom(&client, empty.path(), "payments", None).await;
    assert!(matches!(result, Err(KdtError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_sbom_import_missing_file_is_io_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "projects": [{ "id": "p-1", "name": "payments" }],
            "total": 1
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&mock_server);

    let result = import_sbom(&client, &dir.path().join("missing.json"), "payments", None).await;
    assert!(matches!(result, Err(KdtError::Io(_))));
}

#[tokio::test]
async fn test_endpoint_import_sends_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/projects/p-1/endpoints/import"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({ "message": "12 endpoints imported" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let spec = file_with("openapi: 3.0.0\npaths: {}\n");
    let client = client_for(&mock_server);

    let receipt = import_endpoints(&client, "p-1", spec.path(), EndpointFormat::Openapi, None)
        .await
        .unwrap();
    assert_eq!(receipt.message, "12 endpoints imported");

    let requests = mock_server.received_requests().await.unwrap();
    let body = body_text(&requests[0]);
    assert!(body.contains("name=\"type\""));
    assert!(body.contains("openapi"));
    assert!(!body.contains("name=\"branch\""));
}
