use kanban_core::{
    Board, CacheKey, Dashboard, ErrorClass, ErrorCode, KeyPattern, Visibility, cache_key,
    key_pattern,
};

#[test]
fn dashboard_and_board_keys_are_distinct_families() {
    let dashboard = cache_key!["dashboard"];
    let board = cache_key!["board", 1];

    assert!(!key_pattern!["board"].matches(&dashboard));
    assert!(key_pattern!["board"].matches(&board));
    assert!(KeyPattern::from(&board).matches(&cache_key!["board", 1, "members"]));
}

#[test]
fn key_built_from_ids_matches_macro() {
    let board_id: u64 = 42;
    assert_eq!(CacheKey::root("board").push(board_id), cache_key!["board", 42]);
}

#[test]
fn every_backend_code_has_a_class() {
    let codes = [
        "ACCOUNT_NOT_FOUND",
        "PASSWORD_MISMATCH",
        "DEACTIVATED_ACCOUNT",
        "DUPLICATE_EMAIL",
        "DUPLICATE_NICKNAME",
        "EXPIRED_VERIFICATION",
        "WRONG_VERIFICATION_CODE",
        "FAVORITE_LIMIT_EXCEEDED",
    ];

    for raw in codes {
        let code = ErrorCode::parse(raw);
        assert_eq!(code.as_str(), raw);
        assert_ne!(code.class(), ErrorClass::Transport, "{} must not be transport", raw);
    }
}

#[test]
fn board_summary_round_trips_through_dashboard_json() {
    let json = r#"{"boards":[{"id":3,"title":"Q3","visibility":"public","isFavorite":false}]}"#;
    let mut dashboard: Dashboard = serde_json::from_str(json).unwrap();
    dashboard.set_favorite(3, true);

    let value = serde_json::to_value(&dashboard).unwrap();
    assert_eq!(value["boards"][0]["isFavorite"], true);
    assert_eq!(dashboard.board(3).map(|b| b.visibility), Some(Visibility::Public));
}

#[test]
fn board_without_lists_has_no_containers() {
    let board: Board =
        serde_json::from_str(r#"{"id":1,"title":"Empty","visibility":"team"}"#).unwrap();
    assert!(board.containers().is_empty());
}
