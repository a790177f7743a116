use super::*;
use crate::clickup::{ClickUpConfig, ClickUpError};
use crate::confluence::ConfluenceConfig;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mapping(name: &str, page: &str, list: Option<&str>) -> Mapping {
    Mapping {
        name: name.to_string(),
        confluence_page_id: page.to_string(),
        clickup_list_id: list.map(str::to_string),
        clickup_folder_id: None,
    }
}

fn config_for(server: &MockServer, mappings: Vec<Mapping>) -> SyncConfig {
    SyncConfig {
        confluence: ConfluenceConfig {
            url: server.uri(),
            user: "bot@example.com".to_string(),
            api_token: "secret".to_string(),
        },
        clickup: ClickUpConfig {
            api_token: "pk_test".to_string(),
            base_url: server.uri(),
        },
        mappings,
        http: HttpConfig {
            fetch_timeout_secs: 2,
            fetch_timeout_step_secs: 1,
            max_attempts: 2,
            document_timeout_secs: 2,
            upload_timeout_secs: 5,
        },
    }
}

async fn mount_list(server: &MockServer, list_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/list/{}/task", list_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tasks": [
                {"name": "Design", "start_date": "1735689600000", "due_date": "1735862400000",
                 "status": {"status": "complete"}},
                {"name": "Build", "due_date": "1736294400000", "status": {"status": "in progress"}}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_only_filter_selects_by_name() {
    let server = MockServer::start().await;
    let system = SyncSystem::new(config_for(
        &server,
        vec![
            mapping("Web", "1", Some("10")),
            mapping("Mobile", "2", Some("20")),
        ],
    ))
    .unwrap();

    assert_eq!(system.select_mappings(&[]).len(), 2);

    let selected = system.select_mappings(&["Mobile".to_string()]);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].confluence_page_id, "2");

    assert!(system.select_mappings(&["Nope".to_string()]).is_empty());
}

#[tokio::test]
async fn test_run_with_unmatched_filter_fails() {
    let server = MockServer::start().await;
    let system =
        SyncSystem::new(config_for(&server, vec![mapping("Web", "1", Some("10"))])).unwrap();

    let summary = system
        .run(&RunOptions {
            only: vec!["Nope".to_string()],
            ..RunOptions::default()
        })
        .await;

    assert_eq!(summary.total(), 0);
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test]
async fn test_mapping_without_source_is_reported() {
    let server = MockServer::start().await;
    let system = SyncSystem::new(config_for(&server, vec![mapping("Orphan", "1", None)])).unwrap();

    let result = system.render_mapping(&system.config().mappings[0]).await;
    assert!(matches!(result, Err(SyncError::Source(name)) if name == "Orphan"));
}

#[tokio::test]
async fn test_fetch_failure_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list/10/task"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let system =
        SyncSystem::new(config_for(&server, vec![mapping("Web", "1", Some("10"))])).unwrap();
    let result = system.sync_mapping(&system.config().mappings[0]).await;

    assert!(matches!(
        result,
        Err(SyncError::Fetch(ClickUpError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_upload_failure_skips_page_update() {
    let server = MockServer::start().await;
    mount_list(&server, "10").await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/wiki/rest/api/content/1/child/attachment$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let system =
        SyncSystem::new(config_for(&server, vec![mapping("Web", "1", Some("10"))])).unwrap();
    let result = system.sync_mapping(&system.config().mappings[0]).await;

    assert!(matches!(result, Err(SyncError::Upload(_))));
}

#[tokio::test]
async fn test_dry_run_writes_png_without_publishing() {
    let server = MockServer::start().await;
    mount_list(&server, "10").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let system = SyncSystem::new(config_for(
        &server,
        vec![mapping("Mobile App", "1", Some("10"))],
    ))
    .unwrap();

    let summary = system
        .run(&RunOptions {
            only: vec![],
            dry_run: true,
            output_dir: output.path().join("charts"),
        })
        .await;
    assert_eq!(summary.exit_code(), 0);

    let written: Vec<_> = std::fs::read_dir(output.path().join("charts"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("gantt-mobile-app-"));
    assert!(written[0].ends_with(".png"));

    let bytes = std::fs::read(output.path().join("charts").join(&written[0])).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}
