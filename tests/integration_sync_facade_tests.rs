use serde_json::json;
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use afterglow_sync::{service, HabitStore, JsonFileStore, SyncError, WebDAVConfig};

fn config_for(server: &MockServer) -> WebDAVConfig {
    WebDAVConfig::new(
        server.uri(),
        "admin".to_string(),
        "secret".to_string(),
    )
}

async fn mount_collection(server: &MockServer) {
    Mock::given(method("MKCOL"))
        .and(path("/afterglow/"))
        .respond_with(ResponseTemplate::new(201))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_backup_round_trips_snapshot() {
    let server = MockServer::start().await;
    let snapshot = json!({
        "habits": [
            {"id": 1, "name": "meditate", "logs": [{"date": "2026-08-28", "mood": "calm"}]},
            {"id": 2, "name": "run", "logs": []}
        ]
    });

    mount_collection(&server).await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/afterglow/backup_\d{14}\.json$"))
        .and(body_json(&snapshot))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let outcome = service::backup(&config, &snapshot).await.unwrap();
    assert!(outcome.filename.starts_with("backup_"));
    assert!(outcome.filename.ends_with(".json"));
    assert!(outcome.pruned.is_empty());

    // The server echoes the stored document back; restore must yield a
    // deep-equal snapshot.
    Mock::given(method("GET"))
        .and(path(format!("/afterglow/{}", outcome.filename)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&snapshot))
        .mount(&server)
        .await;

    let restored: serde_json::Value = service::restore(&config, &outcome.filename).await.unwrap();
    assert_eq!(restored, snapshot);
}

#[tokio::test]
async fn test_list_backups_orders_newest_first() {
    let server = MockServer::start().await;

    let body = r#"<?xml version="1.0"?>
    <d:multistatus xmlns:d="DAV:">
        <d:response><d:href>/afterglow/</d:href></d:response>
        <d:response><d:href>/afterglow/backup_20260101000000.json</d:href></d:response>
        <d:response><d:href>/afterglow/backup_20260829070509.json</d:href></d:response>
        <d:response><d:href>/afterglow/backup_20251231235959.json</d:href></d:response>
    </d:multistatus>"#;

    Mock::given(method("PROPFIND"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(body, "application/xml"))
        .mount(&server)
        .await;

    let names = service::list_backups(&config_for(&server)).await.unwrap();
    assert_eq!(
        names,
        vec![
            "backup_20260829070509.json",
            "backup_20260101000000.json",
            "backup_20251231235959.json"
        ]
    );
}

#[tokio::test]
async fn test_backup_prunes_beyond_max_backups() {
    let server = MockServer::start().await;
    let snapshot = json!({"habits": []});

    mount_collection(&server).await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/afterglow/backup_\d{14}\.json$"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    // Listing after the write: five pre-existing backups plus the fresh
    // one (represented by the newest entry).
    let body = r#"<?xml version="1.0"?>
    <d:multistatus xmlns:d="DAV:">
        <d:response><d:href>/afterglow/</d:href></d:response>
        <d:response><d:href>/afterglow/backup_20260105000000.json</d:href></d:response>
        <d:response><d:href>/afterglow/backup_20260104000000.json</d:href></d:response>
        <d:response><d:href>/afterglow/backup_20260103000000.json</d:href></d:response>
        <d:response><d:href>/afterglow/backup_20260102000000.json</d:href></d:response>
        <d:response><d:href>/afterglow/backup_20260101000000.json</d:href></d:response>
        <d:response><d:href>/afterglow/backup_20991231235959.json</d:href></d:response>
    </d:multistatus>"#;

    Mock::given(method("PROPFIND"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(body, "application/xml"))
        .expect(1)
        .mount(&server)
        .await;

    for oldest in [
        "backup_20260101000000.json",
        "backup_20260102000000.json",
        "backup_20260103000000.json",
    ] {
        Mock::given(method("DELETE"))
            .and(path(format!("/afterglow/{}", oldest)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut config = config_for(&server);
    config.max_backups = Some(3);

    let outcome = service::backup(&config, &snapshot).await.unwrap();
    assert_eq!(
        outcome.pruned,
        vec![
            "backup_20260101000000.json",
            "backup_20260102000000.json",
            "backup_20260103000000.json"
        ]
    );
}

#[tokio::test]
async fn test_pruning_failure_does_not_fail_the_backup() {
    let server = MockServer::start().await;

    mount_collection(&server).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    // Listing breaks after the write; the backup itself must still
    // succeed with nothing pruned.
    Mock::given(method("PROPFIND"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.max_backups = Some(3);

    let outcome = service::backup(&config, &json!({"habits": []})).await.unwrap();
    assert!(outcome.pruned.is_empty());
}

#[tokio::test]
async fn test_incomplete_config_is_rejected_before_any_request() {
    let server = MockServer::start().await;

    let mut config = config_for(&server);
    config.password.clear();

    let err = service::backup(&config, &json!({})).await.unwrap_err();
    assert!(matches!(err, SyncError::ConfigIncomplete { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_backed_backup_and_restore() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let snapshot = json!({"habits": [{"id": 7, "name": "read"}]});

    let store = JsonFileStore::new(dir.path().join("habits.json"));
    store.replace_all_habits(snapshot.clone()).unwrap();

    mount_collection(&server).await;
    Mock::given(method("PUT"))
        .and(body_json(&snapshot))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let outcome = service::backup_from_store(&config, &store).await.unwrap();

    let replacement = json!({"habits": [{"id": 8, "name": "swim"}]});
    Mock::given(method("GET"))
        .and(path(format!("/afterglow/{}", outcome.filename)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&replacement))
        .mount(&server)
        .await;

    service::restore_into_store(&config, &outcome.filename, &store)
        .await
        .unwrap();
    assert_eq!(store.load_all_habits().unwrap(), replacement);
}
