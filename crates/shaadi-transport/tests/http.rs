//! Integration tests for the HTTP auth client.
//!
//! These spin up a real axum server on a random port that mimics the
//! marketplace backend's auth routes, then drive [`HttpAuthApi`] against
//! it. Unlike the unit tests, these verify that requests are actually
//! shaped the way the backend expects (bearer header, JSON bodies) and
//! that every kind of answer is classified correctly.

#![cfg(feature = "http")]

use std::time::Duration;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use shaadi_protocol::{Credentials, RegistrationProfile, Role};
use shaadi_transport::{ApiConfig, AuthApi, HttpAuthApi, TransportError};

// =========================================================================
// Fake backend
// =========================================================================

fn asha() -> Value {
    json!({
        "_id": "64f0c0ffee",
        "name": "Asha",
        "role": "vendor",
        "email": "asha@example.com"
    })
}

async fn me(headers: HeaderMap) -> Response {
    let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    match auth {
        Some("Bearer wrapped-token") => Json(json!({ "user": asha() })).into_response(),
        Some("Bearer bare-token") => Json(asha()).into_response(),
        Some("Bearer virtuals-token") => {
            let mut user = asha();
            user["id"] = user["_id"].clone();
            user["displayName"] = json!("asha_k");
            Json(json!({ "user": user })).into_response()
        }
        Some("Bearer html-token") => "<html>maintenance</html>".into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Token is not valid" })),
        )
            .into_response(),
    }
}

async fn slow_me() -> Response {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(asha()).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    match (body["email"].as_str(), body["password"].as_str()) {
        (Some("asha@example.com"), Some("pw")) => {
            Json(json!({ "token": "wrapped-token", "user": asha() })).into_response()
        }
        (Some("blank@example.com"), _) => {
            Json(json!({ "token": "", "user": asha() })).into_response()
        }
        (Some("crash@example.com"), _) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "database unavailable" })),
        )
            .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        )
            .into_response(),
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Email already registered" })),
        )
            .into_response();
    }
    let identity = json!({
        "id": "new-1",
        "name": body["name"],
        "role": body["role"],
        "email": body["email"],
    });
    (
        StatusCode::CREATED,
        Json(json!({ "token": "fresh-token", "user": identity })),
    )
        .into_response()
}

/// Starts the fake backend on a random port and returns its base URL.
async fn start_backend() -> String {
    let app = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/slow/me", get(slow_me))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{addr}")
}

async fn client() -> HttpAuthApi {
    let base = start_backend().await;
    HttpAuthApi::new(ApiConfig::with_base_url(base)).expect("valid config")
}

// =========================================================================
// verify()
// =========================================================================

#[tokio::test]
async fn test_verify_sends_bearer_and_unwraps_user_envelope() {
    let api = client().await;

    let identity = api.verify("wrapped-token").await.expect("should verify");

    assert_eq!(identity.id.as_str(), "64f0c0ffee");
    assert_eq!(identity.role, Role::Vendor);
}

#[tokio::test]
async fn test_verify_accepts_body_with_both_id_spellings() {
    let api = client().await;

    let identity = api.verify("virtuals-token").await.expect("should verify");

    assert_eq!(identity.id.as_str(), "64f0c0ffee");
    assert_eq!(identity.display_name, "Asha");
}

#[tokio::test]
async fn test_verify_accepts_bare_identity_body() {
    let api = client().await;

    let identity = api.verify("bare-token").await.expect("should verify");

    assert_eq!(identity.display_name, "Asha");
}

#[tokio::test]
async fn test_verify_unknown_token_is_rejected_with_backend_message() {
    let api = client().await;

    let err = api.verify("stale").await.unwrap_err();

    assert!(matches!(
        err,
        TransportError::Rejected { status: 401, ref message }
            if message == "Token is not valid"
    ));
}

#[tokio::test]
async fn test_verify_non_json_success_is_malformed() {
    let api = client().await;

    let err = api.verify("html-token").await.unwrap_err();

    assert!(matches!(err, TransportError::Malformed(_)));
}

// =========================================================================
// login()
// =========================================================================

#[tokio::test]
async fn test_login_success_returns_grant() {
    let api = client().await;

    let grant = api
        .login(&Credentials::new("asha@example.com", "pw"))
        .await
        .expect("should log in");

    assert_eq!(grant.token, "wrapped-token");
    assert_eq!(grant.identity.email, "asha@example.com");
}

#[tokio::test]
async fn test_login_wrong_password_is_rejected() {
    let api = client().await;

    let err = api
        .login(&Credentials::new("asha@example.com", "wrong"))
        .await
        .unwrap_err();

    assert!(err.is_rejection());
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_login_server_error_is_not_a_rejection() {
    let api = client().await;

    let err = api
        .login(&Credentials::new("crash@example.com", "pw"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransportError::Server { status: 500, ref message }
            if message == "database unavailable"
    ));
}

#[tokio::test]
async fn test_login_grant_with_blank_token_is_malformed() {
    let api = client().await;

    let err = api
        .login(&Credentials::new("blank@example.com", "pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Malformed(_)));
}

// =========================================================================
// register()
// =========================================================================

#[tokio::test]
async fn test_register_created_returns_grant_for_requested_role() {
    let api = client().await;
    let profile = RegistrationProfile::new("Dev", "dev@example.com", "pw")
        .with_role(Role::Vendor);

    let grant = api.register(&profile).await.expect("should register");

    assert_eq!(grant.token, "fresh-token");
    assert_eq!(grant.identity.role, Role::Vendor);
    assert_eq!(grant.identity.display_name, "Dev");
}

#[tokio::test]
async fn test_register_conflict_is_rejected() {
    let api = client().await;
    let profile = RegistrationProfile::new("T", "taken@example.com", "pw");

    let err = api.register(&profile).await.unwrap_err();

    assert_eq!(err.status(), Some(409));
}

// =========================================================================
// Network failures
// =========================================================================

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Grab a free port, then close it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = HttpAuthApi::new(ApiConfig::with_base_url(format!("http://{addr}")))
        .unwrap();

    let err = api.verify("anything").await.unwrap_err();

    assert!(matches!(err, TransportError::Network(_)));
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let base = start_backend().await;
    let config = ApiConfig {
        me_path: "/api/slow/me".into(),
        timeout: Some(Duration::from_millis(100)),
        ..ApiConfig::with_base_url(base)
    };
    let api = HttpAuthApi::new(config).unwrap();

    let err = api.verify("bare-token").await.unwrap_err();

    assert!(matches!(err, TransportError::Network(_)));
}
