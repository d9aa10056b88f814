mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};
use tagdesk::routes::export::ExportData;

#[tokio::test]
async fn export_returns_json_with_tags() {
    let app = TestApp::new().await;
    let cookie = app.logged_in().await;
    app.add_tag_with_count("rust", 3).await;
    app.add_tag("go").await;

    let resp = app.get("/export", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let content_disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_disposition.starts_with("attachment; filename="));
    assert!(content_disposition.contains("tagdesk-export-"));

    let json = body_json(resp).await;
    assert!(json["exported_at"].is_string());
    assert_eq!(json["tags"].as_array().unwrap().len(), 2);
    assert_eq!(json["tags"][0]["name"], "go");
    assert_eq!(json["tags"][1]["slug"], "rust");
    assert_eq!(json["tags"][1]["count"], 3);
}

#[tokio::test]
async fn export_round_trips_through_import() {
    let source = TestApp::new().await;
    let cookie = source.logged_in().await;
    source.add_tag_with_count("Rust", 5).await;
    source.add_tag("Go").await;

    let json = body_json(source.get("/export", Some(&cookie)).await).await;
    let path = std::env::temp_dir().join(format!("tagdesk-export-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, json.to_string()).unwrap();

    let target = TestApp::new().await;
    let imported = tagdesk::cli::import_tags(&target.store, path.to_str().unwrap())
        .await
        .unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(imported, 2);
    let rust = target.store.get_by_slug("rust").await.unwrap().unwrap();
    assert_eq!(rust.count, 5);

    let data: ExportData = serde_json::from_value(json).unwrap();
    assert_eq!(data.tags.len(), 2);
}

#[tokio::test]
async fn import_missing_file_fails() {
    let app = TestApp::new().await;
    assert!(tagdesk::cli::import_tags(&app.store, "/nonexistent/tags.json").await.is_err());
}

#[tokio::test]
async fn export_unauthenticated_redirects() {
    let app = TestApp::new().await;
    let resp = app.get("/export", None).await;
    common::assert_redirect(&resp, "/login");
}
