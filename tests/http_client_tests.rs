use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use quiz_portal::{
    ApiClient, AppState, HttpApiClient, StoreError, View,
    api::path_with_query,
    config::{AppConfig, Env},
    models::Role,
};
use serde_json::{Value, json};
use std::path::Path;

const TOKEN: &str = "tok-abc";
const SESSION_COOKIE: &str = "session=s3cr3t";

// --- Fake Backend ---

async fn login(Json(body): Json<Value>) -> Response {
    if body["user_mail"] == "user@example.com" && body["user_pass"] == "Valid123" {
        (
            StatusCode::OK,
            [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/"))],
            Json(json!({
                "message": "Login successful",
                "role": ["customer"],
                "auth_token": TOKEN
            })),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "bad credentials" })),
        )
            .into_response()
    }
}

async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Needs the token header.
async fn scores(headers: HeaderMap) -> Response {
    let token = headers
        .get("Authentication-Token")
        .and_then(|v| v.to_str().ok());
    if token != Some(TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Authentication required" })),
        )
            .into_response();
    }
    Json(json!([{
        "score_id": "sc1",
        "q_id": "q1",
        "time_stamp": "2024-01-10 10:30:00.123456",
        "total_score": 75.0
    }]))
    .into_response()
}

/// Needs the session cookie; refuses with a plain-text body otherwise.
async fn subjects(headers: HeaderMap) -> Response {
    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains(SESSION_COOKIE));
    if !has_cookie {
        return (StatusCode::UNAUTHORIZED, "no session").into_response();
    }
    Json(json!([{ "sub_id": "s1", "sub_name": "Maths", "sub_desc": null, "chapters": [] }]))
        .into_response()
}

async fn spawn_backend() -> String {
    let app = axum::Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/scores", get(scores))
        .route("/api/subjects", get(subjects));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config_for(base_url: &str, dir: &Path) -> AppConfig {
    AppConfig {
        env: Env::Local,
        api_base_url: base_url.to_string(),
        storage_path: dir.join("session.json"),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_full_session_against_backend() {
    let base = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::new(config_for(&base, dir.path())).unwrap();

    // Before sign-in the cookie-protected endpoint refuses with a non-JSON body.
    let err = app.quiz.fetch_subjects().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Failed to fetch subjects");

    let session = app.auth.login("user@example.com", "Valid123").await.unwrap();
    assert_eq!(session.role, Role::Customer);

    // The quiz store shares the client: token header and cookie jar both apply.
    app.quiz.fetch_user_scores().await.unwrap();
    assert_eq!(app.quiz.user_scores().len(), 1);
    assert_eq!(app.quiz.user_scores()[0].total_score, 75.0);
    app.quiz.fetch_subjects().await.unwrap();
    assert_eq!(app.quiz.subjects()[0].name, "Maths");

    let route = app.router.resolve("/user/scores").unwrap();
    assert_eq!(route.view, View::UserScores);

    // Empty 204 body on logout; the token is no longer sent afterwards.
    app.auth.logout().await;
    assert!(!app.auth.is_authenticated());
    let err = app.quiz.fetch_user_scores().await.unwrap_err();
    assert_eq!(err.to_string(), "Authentication required");
}

#[tokio::test]
async fn test_session_restored_in_new_process() {
    let base = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();

    let mut first = AppState::new(config_for(&base, dir.path())).unwrap();
    first.auth.login("user@example.com", "Valid123").await.unwrap();

    // Same storage file, brand new client with an empty cookie jar.
    let mut second = AppState::new(config_for(&base, dir.path())).unwrap();
    assert!(second.auth.check_session());
    assert_eq!(second.auth.current_user(), first.auth.current_user());

    // The restored token is enough for token-protected endpoints.
    second.quiz.fetch_user_scores().await.unwrap();
    assert_eq!(second.quiz.user_scores().len(), 1);
}

#[tokio::test]
async fn test_bad_credentials_message_from_backend() {
    let base = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::new(config_for(&base, dir.path())).unwrap();

    let err = app.auth.login("user@example.com", "wrong").await.unwrap_err();

    assert_eq!(err.to_string(), "bad credentials");
    assert!(!app.auth.is_authenticated());
    assert!(!dir.path().join("session.json").exists());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Reserve a port, then free it so nothing is listening there.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = AppState::new(config_for(&format!("http://{addr}"), dir.path())).unwrap();

    let err = app.auth.login("user@example.com", "Valid123").await.unwrap_err();

    assert!(matches!(err, StoreError::Transport { .. }));
    assert_eq!(err.to_string(), "Network error. Please try again.");
}

#[tokio::test]
async fn test_client_trims_base_url_and_sends_token() {
    let base = spawn_backend().await;
    let client = HttpApiClient::new(&format!("{base}/")).unwrap();
    assert_eq!(client.base_url(), base);

    let refused = client.get("/api/scores").await.unwrap();
    assert_eq!(refused.status, 401);

    client.set_auth_token(Some(TOKEN.to_string()));
    let accepted = client.get("/api/scores").await.unwrap();
    assert!(accepted.is_success());
    assert!(accepted.body.is_array());

    let missing = client.get("/api/nowhere").await.unwrap();
    assert_eq!(missing.status, 404);
    assert_eq!(missing.body, Value::Null);
    assert_eq!(missing.error_message("fallback"), "fallback");
}

#[test]
fn test_path_with_query_encodes_and_skips_empty_values() {
    assert_eq!(path_with_query("/api/admin/users", &[("q", "")]), "/api/admin/users");
    assert_eq!(
        path_with_query("/api/admin/users", &[("q", "a b&c=d")]),
        "/api/admin/users?q=a+b%26c%3Dd"
    );
    assert_eq!(
        path_with_query("/api/admin/scores", &[("user_id", ""), ("q_id", "q1")]),
        "/api/admin/scores?q_id=q1"
    );
}
