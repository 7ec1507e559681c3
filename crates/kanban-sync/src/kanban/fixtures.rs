//! Cached payloads shared by the mutation tests.

use serde_json::{Value, json};

use super::keys;
use crate::cache::QueryCache;

pub(crate) fn board_json() -> Value {
    json!({
        "id": 1,
        "title": "Roadmap",
        "visibility": "team",
        "isFavorite": false,
        "lists": [
            {"id": 10, "title": "Todo", "cards": [
                {"id": 100, "title": "A"},
                {"id": 101, "title": "B"},
                {"id": 102, "title": "C"},
                {"id": 103, "title": "D"}
            ]},
            {"id": 20, "title": "Doing", "cards": [
                {"id": 200, "title": "X"},
                {"id": 201, "title": "Y"}
            ]},
            {"id": 99, "title": "Favorites", "isVirtual": true, "cards": [
                {"id": 101, "title": "B"}
            ]}
        ]
    })
}

pub(crate) fn dashboard_json() -> Value {
    json!({
        "boards": [
            {"id": 1, "title": "Roadmap", "visibility": "team", "isFavorite": false},
            {"id": 2, "title": "Ops", "visibility": "private", "isFavorite": true}
        ]
    })
}

pub(crate) fn seeded_cache() -> QueryCache {
    let cache = QueryCache::new();
    cache.write(keys::board(1), board_json());
    cache.write(keys::dashboard(), dashboard_json());
    cache.write(
        keys::board_members(1),
        json!([{"userId": 7, "nickname": "ana", "role": "owner"}]),
    );
    cache.write(
        keys::me(),
        json!({"id": 7, "email": "ana@example.com", "nickname": "ana"}),
    );
    cache
}
