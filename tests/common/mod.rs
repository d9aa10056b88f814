use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use tagdesk::config::Config;
use tagdesk::models::{NewTag, Tag};
use tagdesk::store::TagStore;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub store: TagStore,
}

pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let pool = test_pool().await;
        let store = TagStore::new(pool.clone(), config.tag_name_max_len);
        let router = tagdesk::build_app(pool.clone(), config)
            .await
            .expect("Failed to build app");

        Self { router, db: pool, store }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Create an operator in the database and return (operator_id, access_code).
    pub async fn create_operator(&self, name: &str) -> (String, String) {
        let operator = tagdesk::cli::create_operator(&self.db, name, None)
            .await
            .expect("Failed to create test operator");
        (operator.id, operator.access_code)
    }

    /// Log in with the given access code and return the session cookie string.
    pub async fn login(&self, access_code: &str) -> String {
        let resp = self
            .post_form("/login", &format!("access_code={}", access_code), None)
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        resp.headers()
            .get("set-cookie")
            .expect("Login should set a session cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    /// Create an operator, log in, and return the session cookie.
    pub async fn logged_in(&self) -> String {
        let (_id, code) = self.create_operator("Test Operator").await;
        self.login(&code).await
    }

    /// Insert a tag directly through the store.
    pub async fn add_tag(&self, name: &str) -> Tag {
        self.store
            .add(NewTag {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to create test tag")
    }

    /// Insert a tag and force its usage count.
    pub async fn add_tag_with_count(&self, name: &str, count: i64) -> Tag {
        let mut tag = self.add_tag(name).await;
        sqlx::query("UPDATE tags SET count = ? WHERE id = ?")
            .bind(count)
            .bind(&tag.id)
            .execute(&self.db)
            .await
            .expect("Failed to set tag count");
        tag.count = count;
        tag
    }

    /// Send a GET request with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a POST form request with an optional session cookie.
    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }

    /// Send a POST JSON request with an optional session cookie.
    pub async fn post_json(&self, uri: &str, body: &serde_json::Value, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }

    /// Send a DELETE request with an optional session cookie.
    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri).method("DELETE");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

/// Assert that a response is a redirect to the given location.
pub fn assert_redirect(resp: &Response, expected_location: &str) {
    assert!(
        resp.status().is_redirection(),
        "Expected redirect, got {}",
        resp.status()
    );
    let location = resp
        .headers()
        .get("location")
        .expect("Redirect should have location header")
        .to_str()
        .unwrap();
    assert_eq!(location, expected_location);
}

/// Assert that an HX-Redirect header points to the expected location.
pub fn assert_hx_redirect(resp: &Response, expected_location: &str) {
    let hx = resp
        .headers()
        .get("hx-redirect")
        .expect("Expected HX-Redirect header")
        .to_str()
        .unwrap();
    assert_eq!(hx, expected_location);
}
