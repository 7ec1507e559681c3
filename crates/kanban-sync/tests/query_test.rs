mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedClient, board_json, dashboard_json, settle, unauthorized};
use kanban_core::{Dashboard, ErrorCode};
use kanban_remote::{CredentialVault, Credentials, Endpoint, RemoteError};
use kanban_sync::kanban::{FavoriteInput, ToggleFavorite, keys, resources};
use kanban_sync::{
    Change, EntryStatus, MutationCoordinator, Query, QueryCache, QueryClient, QueryError,
    RetryPolicy, Session,
};
use parking_lot::Mutex;
use serde_json::{Value, json};

fn client(backend: &ScriptedClient, cache: &QueryCache, retries: u32) -> QueryClient {
    QueryClient::with_options(
        cache.clone(),
        backend.shared(),
        None,
        RetryPolicy {
            retries,
            backoff: Duration::from_millis(100),
        },
    )
}

#[tokio::test]
async fn fresh_entry_is_served_from_cache() {
    let backend = ScriptedClient::new();
    let cache = QueryCache::new();
    cache.write(keys::dashboard(), dashboard_json());
    let queries = client(&backend, &cache, 0);

    let dashboard: Dashboard = queries.fetch_as(&resources::dashboard()).await.unwrap();

    assert_eq!(dashboard.boards.len(), 2);
    assert!(backend.calls().is_empty());
    assert_eq!(cache.metrics().hits(), 1);
}

#[tokio::test]
async fn concurrent_fetches_share_one_request() {
    let backend = ScriptedClient::new();
    backend.on(Endpoint::Board(1), Ok(board_json()));
    backend.hold(Endpoint::Board(1));

    let cache = QueryCache::new();
    let queries = client(&backend, &cache, 0);

    let tasks: Vec<_> = (0..3)
        .map(|_| {
            let queries = queries.clone();
            tokio::spawn(async move { queries.fetch(&resources::board(1)).await })
        })
        .collect();
    settle().await;

    assert_eq!(backend.calls_to(Endpoint::Board(1)), 1);
    assert_eq!(cache.status(&keys::board(1)), Some(EntryStatus::Fetching));

    backend.release(Endpoint::Board(1), 1);
    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap().unwrap());
    }

    assert_eq!(backend.calls_to(Endpoint::Board(1)), 1);
    assert!(results.iter().all(|data| Arc::ptr_eq(data, &results[0])));
    assert_eq!(cache.status(&keys::board(1)), Some(EntryStatus::Fresh));
    assert_eq!(cache.metrics().misses(), 1);
}

#[tokio::test(start_paused = true)]
async fn transient_read_failures_are_retried() {
    let backend = ScriptedClient::new();
    backend
        .once(Endpoint::Dashboard, Err(RemoteError::timeout()))
        .once(Endpoint::Dashboard, Err(RemoteError::new(ErrorCode::Server(503))))
        .on(Endpoint::Dashboard, Ok(dashboard_json()));

    let cache = QueryCache::new();
    let queries = client(&backend, &cache, 2);

    let data = queries.fetch(&resources::dashboard()).await.unwrap();

    assert_eq!(data.as_ref(), &dashboard_json());
    assert_eq!(backend.calls_to(Endpoint::Dashboard), 3);
}

#[tokio::test(start_paused = true)]
async fn retries_stop_at_the_limit() {
    let backend = ScriptedClient::new();
    backend.on(Endpoint::Dashboard, Err(RemoteError::network("down")));

    let cache = QueryCache::new();
    let queries = client(&backend, &cache, 1);

    let err = queries.fetch(&resources::dashboard()).await.unwrap_err();

    assert!(err.is_transient());
    assert_eq!(backend.calls_to(Endpoint::Dashboard), 2);
    assert!(cache.data(&keys::dashboard()).is_none());
}

#[tokio::test]
async fn non_transient_failures_are_not_retried() {
    let backend = ScriptedClient::new();
    backend.on(Endpoint::Board(9), Err(RemoteError::new(ErrorCode::NotFound).at_status(404)));

    let cache = QueryCache::new();
    let queries = client(&backend, &cache, 3);

    let err = queries.fetch(&resources::board(9)).await.unwrap_err();

    assert_eq!(err.user_message(), "It no longer exists.");
    assert_eq!(backend.calls_to(Endpoint::Board(9)), 1);
}

#[tokio::test]
async fn write_during_fetch_wins() {
    let backend = ScriptedClient::new();
    backend.on(Endpoint::Board(1), Ok(json!({"id": 1, "title": "from server"})));
    backend.hold(Endpoint::Board(1));

    let cache = QueryCache::new();
    let queries = client(&backend, &cache, 0);

    let fetch = {
        let queries = queries.clone();
        tokio::spawn(async move { queries.fetch(&resources::board(1)).await })
    };
    settle().await;

    cache.write(keys::board(1), json!({"id": 1, "title": "local"}));
    backend.release(Endpoint::Board(1), 1);
    fetch.await.unwrap().unwrap();

    assert_eq!(cache.data(&keys::board(1)).unwrap()["title"], "local");
}

#[tokio::test]
async fn late_fetch_does_not_overwrite_data_written_after_clear() {
    let backend = ScriptedClient::new();
    backend.on(Endpoint::Me, Ok(json!({"id": 1, "nickname": "old-user"})));
    backend.hold(Endpoint::Me);

    let cache = QueryCache::new();
    let queries = client(&backend, &cache, 0);

    let fetch = {
        let queries = queries.clone();
        tokio::spawn(async move { queries.fetch(&resources::me()).await })
    };
    settle().await;

    cache.clear();
    cache.write(keys::me(), json!({"id": 2, "nickname": "new-user"}));
    backend.release(Endpoint::Me, 1);
    fetch.await.unwrap().unwrap();

    assert_eq!(cache.data(&keys::me()).unwrap()["nickname"], "new-user");
}

#[tokio::test]
async fn rejected_credentials_on_read_end_the_session() {
    let backend = ScriptedClient::new();
    backend.on(Endpoint::Me, Err(unauthorized()));

    let cache = QueryCache::new();
    cache.write(keys::dashboard(), dashboard_json());
    let session = Session::new(CredentialVault::in_memory(), cache.clone());
    session.sign_in(&Credentials::new("tok"), false).unwrap();

    let queries = QueryClient::with_options(
        cache.clone(),
        backend.shared(),
        Some(session.clone()),
        RetryPolicy::none(),
    );

    let err = queries.fetch(&resources::me()).await.unwrap_err();

    assert_eq!(err, QueryError::AuthExpired);
    assert!(!session.is_signed_in());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn resource_handle_follows_loading_and_invalidation() {
    let backend = ScriptedClient::new();
    backend.on(Endpoint::Board(1), Ok(board_json()));

    let cache = QueryCache::new();
    let queries = client(&backend, &cache, 0);

    let mut handle = queries.use_resource(resources::board(1));
    assert_eq!(handle.key(), &keys::board(1));

    while handle.state().data.is_none() {
        handle.changed().await.unwrap();
    }
    let state = handle.state();
    assert_eq!(state.status, Some(EntryStatus::Fresh));
    assert_eq!(state.data.as_deref(), Some(&board_json()));

    cache.invalidate(&keys::board(1));
    let state = handle.changed().await.unwrap();
    assert!(state.is_stale());
    // Stale data stays readable until the refetch lands.
    assert!(state.data.is_some());

    handle.load().await.unwrap();
    assert_eq!(backend.calls_to(Endpoint::Board(1)), 2);
}

#[tokio::test]
async fn subscribers_see_optimistic_write_then_invalidation() {
    let backend = ScriptedClient::new();
    backend.on(Endpoint::FavoriteBoard(1), Ok(Value::Null));

    let cache = QueryCache::new();
    cache.write(keys::board(1), board_json());
    cache.write(keys::dashboard(), dashboard_json());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let _boards = {
        let seen = seen.clone();
        cache.subscribe(Query::Prefix(keys::all_boards()), move |event| {
            seen.lock().push((event.key.to_string(), event.change));
        })
    };

    let coordinator = MutationCoordinator::new(cache.clone(), backend.shared());
    coordinator
        .mutate(
            ToggleFavorite,
            FavoriteInput {
                board_id: 1,
                favorite: true,
            },
        )
        .await
        .unwrap();

    let board = keys::board(1).to_string();
    assert_eq!(
        seen.lock().clone(),
        vec![
            (board.clone(), Change::Written),
            (board, Change::Invalidated),
        ]
    );
}
