mod common;

use common::{client_for, router, spawn_backend};
use kanban_core::{ErrorClass, ErrorCode};
use kanban_remote::{CredentialVault, Credentials, Endpoint, RemoteRequest, ResourceClient};
use serde_json::json;

#[tokio::test]
async fn fetches_envelope_data() {
    let addr = spawn_backend(router(false)).await;
    let client = client_for(addr, CredentialVault::in_memory(), 5);

    let data = client
        .call(&RemoteRequest::new(Endpoint::Dashboard))
        .await
        .unwrap();

    assert_eq!(data["boards"][0]["title"], "Roadmap");
}

#[tokio::test]
async fn attaches_bearer_token_from_vault() {
    let addr = spawn_backend(router(false)).await;
    let vault = CredentialVault::in_memory();
    let client = client_for(addr, vault.clone(), 5);

    let err = client
        .call(&RemoteRequest::new(Endpoint::Me))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthorized);
    assert_eq!(err.class(), ErrorClass::AuthExpired);
    assert_eq!(err.status, Some(401));

    vault.save(&Credentials::new("valid-token"), false).unwrap();

    let me = client.call(&RemoteRequest::new(Endpoint::Me)).await.unwrap();
    assert_eq!(me["nickname"], "ana");
}

#[tokio::test]
async fn maps_error_code_from_envelope() {
    let addr = spawn_backend(router(false)).await;
    let client = client_for(addr, CredentialVault::in_memory(), 5);

    let err = client
        .call(&RemoteRequest::new(Endpoint::CheckEmail).with_query("email", "taken@example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::DuplicateEmail);
    assert_eq!(err.class(), ErrorClass::Validation);
    assert_eq!(err.message.as_deref(), Some("email already registered"));

    let ok = client
        .call(&RemoteRequest::new(Endpoint::CheckEmail).with_query("email", "free@example.com"))
        .await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn deactivated_account_is_a_conflict() {
    let addr = spawn_backend(router(false)).await;
    let client = client_for(addr, CredentialVault::in_memory(), 5);

    let err = client
        .call(
            &RemoteRequest::new(Endpoint::Login)
                .with_body(json!({"email": "sleepy@example.com", "password": "x"})),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::DeactivatedAccount);
    assert_eq!(err.class(), ErrorClass::Conflict);
}

#[tokio::test]
async fn sends_body_and_path_params() {
    let addr = spawn_backend(router(false)).await;
    let client = client_for(addr, CredentialVault::in_memory(), 5);

    let data = client
        .call(
            &RemoteRequest::new(Endpoint::MoveCard {
                board_id: 4,
                card_id: 12,
            })
            .with_body(json!({"listId": 2, "position": 0})),
        )
        .await
        .unwrap();

    assert_eq!(data, json!({"boardId": 4, "cardId": 12, "listId": 2, "position": 0}));
}

#[tokio::test]
async fn sends_request_id_header() {
    let addr = spawn_backend(router(false)).await;
    let client = client_for(addr, CredentialVault::in_memory(), 5);

    let data = client
        .call(&RemoteRequest::new(Endpoint::MyActivity))
        .await
        .unwrap();

    let id = data["requestId"].as_str().unwrap();
    assert!(uuid_like(id), "unexpected request id: {}", id);
}

#[tokio::test]
async fn non_envelope_server_error_maps_to_status() {
    let addr = spawn_backend(router(false)).await;
    let client = client_for(addr, CredentialVault::in_memory(), 5);

    let err = client
        .call(&RemoteRequest::new(Endpoint::Teams))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Server(503));
    assert!(err.is_transient());
}

#[tokio::test]
async fn slow_backend_surfaces_timeout() {
    let addr = spawn_backend(router(true)).await;
    let client = client_for(addr, CredentialVault::in_memory(), 1);

    let err = client
        .call(&RemoteRequest::new(Endpoint::Dashboard))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Timeout);
    assert_eq!(err.class(), ErrorClass::Transport);
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    // Bind and immediately release a port so nothing listens on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, CredentialVault::in_memory(), 2);
    let err = client
        .call(&RemoteRequest::new(Endpoint::Dashboard))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Network);
    assert!(err.is_transient());
}

#[tokio::test]
async fn health_check_hits_health_route() {
    let addr = spawn_backend(router(false)).await;
    let client = client_for(addr, CredentialVault::in_memory(), 5);

    assert!(client.health_check().await.is_ok());
}

fn uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().filter(|c| *c == '-').count() == 4
}
