//! The facade over real HTTP: an axum stand-in for the backend, a token
//! file in a temp dir, and a "restart" in between.

#![cfg(feature = "http")]

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use shaadisetgo::prelude::*;

const TOKEN: &str = "3f9a0c6e2b7d4e11a8c5f0b2d9e7a6c4";

fn admin() -> Value {
    json!({ "id": "a-1", "name": "Farah", "role": "admin", "email": "farah@example.com" })
}

async fn me(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {TOKEN}");
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Json(json!({ "user": admin() })).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Token is not valid" })))
            .into_response(),
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "farah@example.com" && body["password"] == "pw" {
        Json(json!({ "token": TOKEN, "user": admin() })).into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid credentials" }))).into_response()
    }
}

async fn start_backend() -> String {
    let app = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/login", post(login));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn config(base_url: String, dir: &tempfile::TempDir) -> ClientConfig {
    ClientConfig {
        api: ApiConfig::with_base_url(base_url),
        token_path: dir.path().join("state/session.json"),
        routes_file: None,
    }
}

#[tokio::test]
async fn test_login_survives_restart_over_http() {
    let base = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(base, &dir);

    let first = ShaadiClient::builder().build_http(&config).unwrap();
    assert_eq!(first.boot().await, Session::signed_out());
    assert!(first.login("farah@example.com", "pw").await);
    drop(first);

    let second = ShaadiClient::builder().build_http(&config).unwrap();
    let session = second.boot().await;

    assert!(session.is_authenticated());
    assert_eq!(session.role(), Some(Role::Admin));
    assert_eq!(
        second.navigate("/admin/dashboard").unwrap().decision,
        Decision::Render
    );
}

#[tokio::test]
async fn test_rejected_login_reports_backend_error_text() {
    let base = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let client = ShaadiClient::builder().build_http(&config(base, &dir)).unwrap();
    client.boot().await;

    assert!(!client.login("farah@example.com", "wrong").await);

    let error = client.session().snapshot().last_error.unwrap();
    assert_eq!(error.kind, ErrorKind::InvalidCredentials);
    assert_eq!(error.message, "Invalid credentials");
    assert!(!dir.path().join("state/session.json").exists());
}

#[tokio::test]
async fn test_routes_file_replaces_builtin_table() {
    let base = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let routes = dir.path().join("routes.json");
    std::fs::write(&routes, br#"[{ "path": "/", "access": "public" }]"#).unwrap();
    let config = ClientConfig {
        routes_file: Some(routes),
        ..config(base, &dir)
    };

    let client = ShaadiClient::builder().build_http(&config).unwrap();

    assert_eq!(client.routes().len(), 1);
    assert!(client.navigate("/bookings").is_err());
}

#[test]
fn test_build_http_rejects_bad_base_url() {
    let dir = tempfile::tempdir().unwrap();
    let result = ShaadiClient::builder().build_http(&config("localhost:5000".into(), &dir));
    assert!(matches!(result, Err(ShaadiError::Transport(_))));
}
