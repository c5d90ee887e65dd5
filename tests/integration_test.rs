use axum::http::StatusCode;
use postboard::api::{self, AppState};
use postboard::config::Config;
use postboard::db::init_db;
use postboard::Repository;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn setup_test_app() -> (axum::Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let static_dir = temp_dir.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("hello.txt"), "hello static").unwrap();

    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        database_path: db_path,
        static_dir: static_dir.to_string_lossy().to_string(),
    };

    (api::create_router(AppState::new(repo, config)), temp_dir)
}

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, String) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(axum::body::Body::from(body.unwrap_or_default().to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _temp) = setup_test_app().await;
    let (status, body) = send(app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ok"));
}

#[tokio::test]
async fn test_ready_endpoint() {
    let (app, _temp) = setup_test_app().await;
    let (status, body) = send(app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ready"));
}

#[tokio::test]
async fn test_index_renders_html() {
    let (app, _temp) = setup_test_app().await;
    let (status, body) = send(app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<!DOCTYPE html>"));
    assert!(body.contains("No posts yet."));
}

#[tokio::test]
async fn test_static_file_served() {
    let (app, _temp) = setup_test_app().await;
    let (status, body) = send(app, "GET", "/static/hello.txt", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello static");
}

#[tokio::test]
async fn test_missing_static_file_is_404() {
    let (app, _temp) = setup_test_app().await;
    let (status, _) = send(app, "GET", "/static/nope.js", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preview_renders_bbcode() {
    let (app, _temp) = setup_test_app().await;
    let (status, body) = send(
        app,
        "POST",
        "/preview",
        Some(r#"{"content": "[b]bold[/b] [i]open"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["html"], "<b>bold</b> <i>open</i>");
    assert_eq!(json["unclosed"], serde_json::json!(["i"]));
}

#[tokio::test]
async fn test_preview_requires_content() {
    let (app, _temp) = setup_test_app().await;
    let (status, body) = send(app, "POST", "/preview", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("content"));
}

#[tokio::test]
async fn test_create_is_post_only() {
    let (app, _temp) = setup_test_app().await;
    let (status, _) = send(app, "GET", "/create", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
