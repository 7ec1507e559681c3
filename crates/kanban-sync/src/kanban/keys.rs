//! Cache keys of the kanban resources.

use kanban_core::{CacheKey, KeyPattern, cache_key, key_pattern};

pub fn dashboard() -> CacheKey {
    cache_key!["dashboard"]
}

pub fn board(id: u64) -> CacheKey {
    cache_key!["board", id]
}

pub fn board_members(id: u64) -> CacheKey {
    cache_key!["board", id, "members"]
}

pub fn teams() -> CacheKey {
    cache_key!["team"]
}

pub fn team(id: u64) -> CacheKey {
    cache_key!["team", id]
}

pub fn me() -> CacheKey {
    cache_key!["user", "me"]
}

pub fn my_activity() -> CacheKey {
    cache_key!["user", "me", "activity"]
}

/// Every board and everything below it.
pub fn all_boards() -> KeyPattern {
    key_pattern!["board"]
}

/// The team list and every team.
pub fn all_teams() -> KeyPattern {
    key_pattern!["team"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert_eq!(board(4).to_string(), "board/4");
        assert_eq!(board_members(4).to_string(), "board/4/members");
        assert!(all_boards().matches(&board_members(4)));
        assert!(!all_boards().matches(&dashboard()));
        assert!(all_teams().matches(&teams()));
        assert!(all_teams().matches(&team(2)));
        assert!(me().as_pattern().matches(&my_activity()));
    }
}
