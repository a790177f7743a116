use super::*;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{basic_auth, body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "12345";
const ATTACHMENTS: &str = "/wiki/rest/api/content/12345/child/attachment";
const FILENAME: &str = "gantt-demo-20250101.png";

fn client_for(server: &MockServer) -> ConfluenceClient {
    let config = ConfluenceConfig {
        url: format!("{}/", server.uri()),
        user: "bot@example.com".to_string(),
        api_token: "secret".to_string(),
    };
    ConfluenceClient::new(config, Duration::from_secs(2), Duration::from_secs(5)).unwrap()
}

async fn mount_upload_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(ATTACHMENTS))
        .and(header("X-Atlassian-Token", "no-check"))
        .and(basic_auth("bot@example.com", "secret"))
        .and(body_string_contains(FILENAME))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "att-new", "title": FILENAME}]
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, version: u64) {
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/12345"))
        .and(query_param("expand", "body.storage,version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": PAGE,
            "type": "page",
            "title": "Roadmap",
            "version": {"number": version},
            "body": {"storage": {"value": "<p>old</p>", "representation": "storage"}}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_upload_replaces_same_named_attachment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ATTACHMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "att-other", "title": "gantt-demo-20241231.png"},
                {"id": "att-old", "title": FILENAME}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/wiki/rest/api/content/att-old"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mount_upload_ok(&server).await;

    let id = client_for(&server)
        .upload_attachment(PAGE, FILENAME, b"png-bytes".to_vec())
        .await
        .unwrap();
    assert_eq!(id, "att-new");
}

#[tokio::test]
async fn test_failed_listing_does_not_block_upload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ATTACHMENTS))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    mount_upload_ok(&server).await;

    let client = client_for(&server);
    assert!(matches!(
        client.find_attachment(PAGE, FILENAME).await,
        ExistingAttachment::Unavailable(_)
    ));

    let id = client
        .upload_attachment(PAGE, FILENAME, b"png-bytes".to_vec())
        .await
        .unwrap();
    assert_eq!(id, "att-new");
}

#[tokio::test]
async fn test_failed_deletion_does_not_block_upload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ATTACHMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "att-old", "title": FILENAME}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/wiki/rest/api/content/att-old"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    mount_upload_ok(&server).await;

    let result = client_for(&server)
        .upload_attachment(PAGE, FILENAME, b"png-bytes".to_vec())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_absent_attachment_is_distinguished() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ATTACHMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let existing = client_for(&server).find_attachment(PAGE, FILENAME).await;
    assert_eq!(existing, ExistingAttachment::Absent);
}

#[tokio::test]
async fn test_upload_failure_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ATTACHMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ATTACHMENTS))
        .respond_with(ResponseTemplate::new(413).set_body_string("too large"))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .upload_attachment(PAGE, FILENAME, b"png-bytes".to_vec())
        .await;
    assert!(matches!(
        result,
        Err(ConfluenceError::Http { status: 413, .. })
    ));
}

#[tokio::test]
async fn test_upload_without_id_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ATTACHMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ATTACHMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .upload_attachment(PAGE, FILENAME, b"png-bytes".to_vec())
        .await;
    assert!(matches!(result, Err(ConfluenceError::MissingAttachmentId)));
}

#[tokio::test]
async fn test_update_bumps_version_and_embeds_image() {
    let server = MockServer::start().await;
    mount_page(&server, 7).await;

    Mock::given(method("PUT"))
        .and(path("/wiki/rest/api/content/12345"))
        .and(basic_auth("bot@example.com", "secret"))
        .and(body_partial_json(json!({
            "version": {"number": 8},
            "title": "Roadmap",
            "type": "page",
            "body": {"storage": {"representation": "storage"}}
        })))
        .and(body_string_contains(FILENAME))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": PAGE})))
        .expect(1)
        .mount(&server)
        .await;

    let version = client_for(&server)
        .update_page(PAGE, FILENAME, "Demo")
        .await
        .unwrap();
    assert_eq!(version, 8);
}

#[tokio::test]
async fn test_version_conflict_is_not_retried() {
    let server = MockServer::start().await;
    mount_page(&server, 3).await;

    Mock::given(method("PUT"))
        .and(path("/wiki/rest/api/content/12345"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Version must be incremented"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).update_page(PAGE, FILENAME, "Demo").await;
    assert!(matches!(
        result,
        Err(ConfluenceError::Http { status: 409, .. })
    ));
}

#[tokio::test]
async fn test_missing_page_fails_update() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/12345"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client_for(&server).update_page(PAGE, FILENAME, "Demo").await;
    assert!(matches!(
        result,
        Err(ConfluenceError::Http { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_upload_then_update_on_same_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ATTACHMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;
    mount_upload_ok(&server).await;
    mount_page(&server, 1).await;
    Mock::given(method("PUT"))
        .and(path("/wiki/rest/api/content/12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": PAGE})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let attachment_id = client
        .upload_attachment(PAGE, FILENAME, b"png-bytes".to_vec())
        .await
        .unwrap();
    let version = client.update_page(PAGE, FILENAME, "Demo").await.unwrap();

    assert_eq!(attachment_id, "att-new");
    assert_eq!(version, 2);
    assert_eq!(
        client.page_url(PAGE),
        format!("{}/wiki/pages/12345", server.uri())
    );
}

#[test]
fn test_config_debug_redacts_token() {
    let config = ConfluenceConfig {
        url: "https://example.atlassian.net".to_string(),
        user: "bot".to_string(),
        api_token: "very-secret".to_string(),
    };
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("very-secret"));
    assert!(rendered.contains("<redacted>"));
}
