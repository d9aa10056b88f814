mod common;

use axum::http::StatusCode;
use common::{assert_redirect, body_string, TestApp};

#[tokio::test]
async fn login_with_valid_access_code() {
    let app = TestApp::new().await;
    let (_operator_id, access_code) = app.create_operator("Test Operator").await;

    let resp = app
        .post_form("/login", &format!("access_code={}", access_code), None)
        .await;

    assert_redirect(&resp, "/tags");
    assert!(resp.headers().get("set-cookie").is_some());
}

#[tokio::test]
async fn login_with_invalid_access_code() {
    let app = TestApp::new().await;

    let resp = app.post_form("/login", "access_code=bad-code", None).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("Invalid access code"));
}

#[tokio::test]
async fn login_page_renders() {
    let app = TestApp::new().await;
    let resp = app.get("/login", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("name=\"access_code\""));
}

#[tokio::test]
async fn logged_in_pages_show_operator_name() {
    let app = TestApp::new().await;
    let (_operator_id, access_code) = app.create_operator("Ada").await;
    let cookie = app.login(&access_code).await;

    let body = body_string(app.get("/tags", Some(&cookie)).await).await;
    assert!(body.contains("Log out (Ada)"));
}

#[tokio::test]
async fn logout_clears_session() {
    let app = TestApp::new().await;
    let cookie = app.logged_in().await;

    let resp = app.post_form("/logout", "", Some(&cookie)).await;
    assert_redirect(&resp, "/login");

    let resp = app.get("/tags", Some(&cookie)).await;
    assert_redirect(&resp, "/login");
}

#[tokio::test]
async fn unauthenticated_new_tag_redirects_to_login() {
    let app = TestApp::new().await;
    let resp = app.get("/tags/new", None).await;
    assert_redirect(&resp, "/login");
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let resp = app.get("/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "ok");
}
