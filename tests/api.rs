use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::Engine;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use content_hub::{
    api::create_router,
    app_state::AppState,
    config::{AuthConfig, Config, DatabaseConfig, EditorConfig, ServerConfig, StorageConfig},
    infrastructure::{InMemoryDocumentStore, LocalBlobStore},
};

const PASSWORD: &str = "correct horse battery staple";

fn test_config(blob_root: &std::path::Path) -> Config {
    Config {
        database: DatabaseConfig {
            url: "memory".to_string(),
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
        },
        editor: EditorConfig::default(),
        storage: StorageConfig {
            blob_root: blob_root.to_string_lossy().into_owned(),
            public_base_url: "http://localhost:8000".to_string(),
            max_upload_bytes: 4 * 1024 * 1024,
        },
        auth: AuthConfig {
            admin_email: "admin@example.com".to_string(),
            admin_password: PASSWORD.to_string(),
            session_timeout_secs: 3600,
        },
    }
}

fn test_app(blob_root: &std::path::Path) -> Router {
    let config = test_config(blob_root);
    let blobs = Arc::new(LocalBlobStore::new(
        &config.storage.blob_root,
        &config.storage.public_base_url,
    ));
    let state =
        AppState::with_backends(config, Arc::new(InMemoryDocumentStore::new()), blobs).unwrap();
    create_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "admin@example.com", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn service_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let (status, body) = send(&app, Method::GET, "/api", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Content Hub CMS API");
    assert_eq!(body["status"], "running");

    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storeConfigured"], true);
}

#[tokio::test]
async fn writes_require_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/pages/save",
        None,
        Some(json!({"draft": {"title": "Home"}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/v1/dashboard", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "admin@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn save_create_then_update_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/pages/save",
        Some(&token),
        Some(json!({"draft": {"title": "Research Interests", "content": "<p>Graphs</p>"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "committed");
    assert_eq!(body["mode"], "create");
    assert_eq!(body["slug"], "research-interests");
    assert_eq!(body["notice"], "Page saved successfully");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, mut page) = send(&app, Method::GET, &format!("/api/v1/pages/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["status"], "draft");
    assert!(page["createdAt"].is_string());

    page["content"] = json!("<p>Graphs and networks</p>");
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/pages/save",
        Some(&token),
        Some(json!({"draft": page, "status": "published"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "committed");
    assert_eq!(body["mode"], "update");
    assert_eq!(body["id"], id);

    let (_, pages) = send(&app, Method::GET, "/api/v1/pages/by-slug/research-interests", None, None).await;
    assert_eq!(pages.as_array().unwrap().len(), 1);
    assert_eq!(pages[0]["status"], "published");
    assert_eq!(pages[0]["content"], "<p>Graphs and networks</p>");

    let (_, dashboard) = send(&app, Method::GET, "/api/v1/dashboard", Some(&token), None).await;
    assert_eq!(dashboard["totalPages"], 1);
    assert_eq!(dashboard["publishedPages"], 1);
    assert_eq!(dashboard["recentActivity"][0]["action"], "Created page: Research Interests");
}

#[tokio::test]
async fn blank_title_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/pages/save",
        Some(&token),
        Some(json!({"draft": {"title": "  "}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");

    let (_, pages) = send(&app, Method::GET, "/api/v1/pages", None, None).await;
    assert!(pages.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn preview_and_delete_page() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());
    let token = login(&app).await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/v1/pages/save",
        Some(&token),
        Some(json!({"draft": {"title": "Gallery", "blocks": [
            {"id": "1700000000000", "type": "text", "content": "Convocation", "url": ""}
        ]}})),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, html) = send(&app, Method::GET, &format!("/api/v1/pages/{}/preview", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let html = html.as_str().unwrap();
    assert!(html.contains("<h1>Gallery</h1>"));
    assert!(html.contains("<p>Convocation</p>"));

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/pages/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/api/v1/pages/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn media_upload_list_delete() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());
    let token = login(&app).await;

    // "hello" in base64
    let (status, item) = send(
        &app,
        Method::POST,
        "/api/v1/media",
        Some(&token),
        Some(json!({"name": "notes.txt", "contentType": "text/plain", "data": "aGVsbG8="})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["size"], 5);
    assert_eq!(item["type"], "text/plain");
    let storage_path = item["storagePath"].as_str().unwrap();
    assert!(item["url"].as_str().unwrap().ends_with(storage_path));
    assert_eq!(std::fs::read(dir.path().join(storage_path)).unwrap(), b"hello");

    let (_, media) = send(&app, Method::GET, "/api/v1/media", Some(&token), None).await;
    assert_eq!(media.as_array().unwrap().len(), 1);

    let id = item["id"].as_str().unwrap();
    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/media/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!dir.path().join(storage_path).exists());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/media",
        Some(&token),
        Some(json!({"name": "bad.bin", "data": "not base64!"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn media_upload_larger_than_default_body_limit() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());
    let token = login(&app).await;

    let photo = vec![7u8; 3 * 1024 * 1024];
    let (status, item) = send(
        &app,
        Method::POST,
        "/api/v1/media",
        Some(&token),
        Some(json!({
            "name": "convocation.jpg",
            "contentType": "image/jpeg",
            "data": base64::engine::general_purpose::STANDARD.encode(&photo),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["size"], 3 * 1024 * 1024);
    let storage_path = item["storagePath"].as_str().unwrap();
    assert_eq!(std::fs::read(dir.path().join(storage_path)).unwrap().len(), photo.len());

    let too_big = vec![7u8; 4 * 1024 * 1024 + 1];
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/media",
        Some(&token),
        Some(json!({
            "name": "poster.png",
            "data": base64::engine::general_purpose::STANDARD.encode(&too_big),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, media) = send(&app, Method::GET, "/api/v1/media", Some(&token), None).await;
    assert_eq!(media.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());
    let token = login(&app).await;

    let (status, _) = send(&app, Method::POST, "/api/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/v1/media", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
