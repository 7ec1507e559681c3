//! Fake REST backend for client tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
};
use kanban_remote::{ClientConfig, CredentialVault, HttpResourceClient};
use serde::Deserialize;
use serde_json::{Value, json};

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn dashboard() -> Json<Value> {
    Json(json!({
        "data": {"boards": [{"id": 1, "title": "Roadmap", "visibility": "team", "isFavorite": false}]}
    }))
}

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    match bearer(&headers) {
        Some(token) if token == "valid-token" => (
            StatusCode::OK,
            Json(json!({"data": {"id": 7, "email": "ana@example.com", "nickname": "ana"}})),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"errorCode": "UNAUTHORIZED", "message": "token expired"})),
        ),
    }
}

#[derive(Deserialize)]
struct EmailQuery {
    email: String,
}

async fn check_email(Query(q): Query<EmailQuery>) -> (StatusCode, Json<Value>) {
    if q.email == "taken@example.com" {
        (
            StatusCode::CONFLICT,
            Json(json!({"errorCode": "DUPLICATE_EMAIL", "message": "email already registered"})),
        )
    } else {
        (StatusCode::OK, Json(json!({"data": null})))
    }
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "sleepy@example.com" {
        (
            StatusCode::FORBIDDEN,
            Json(json!({"errorCode": "DEACTIVATED_ACCOUNT", "message": "account deactivated"})),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({"data": {"accessToken": "valid-token"}})),
        )
    }
}

async fn move_card(Path((board_id, card_id)): Path<(u64, u64)>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"data": {"boardId": board_id, "cardId": card_id, "listId": body["listId"], "position": body["position"]}}))
}

async fn echo_request_id(headers: HeaderMap) -> Json<Value> {
    let id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({"data": {"requestId": id}}))
}

async fn unavailable() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "<html>maintenance</html>")
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"data": {"boards": []}}))
}

/// Router of the fake backend. `slow_dashboard` makes `/boards` hang.
pub fn router(slow_dashboard: bool) -> Router {
    let boards = if slow_dashboard { get(slow) } else { get(dashboard) };

    Router::new()
        .route("/boards", boards)
        .route("/users/me", get(me))
        .route("/users/me/activity", get(echo_request_id))
        .route("/auth/check-email", get(check_email))
        .route("/auth/login", post(login))
        .route("/boards/{board_id}/cards/{card_id}/position", put(move_card))
        .route("/teams", get(unavailable))
        .route("/health", get(|| async { "ok" }))
}

/// Serves `router` on an ephemeral port and returns its address.
pub async fn spawn_backend(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Builds an HTTP client against `addr`.
pub fn client_for(addr: SocketAddr, vault: CredentialVault, timeout_secs: u64) -> HttpResourceClient {
    let config = ClientConfig::builder()
        .base_url(format!("http://{}", addr))
        .timeout_secs(timeout_secs)
        .build()
        .unwrap();
    HttpResourceClient::new(config, vault).unwrap()
}
