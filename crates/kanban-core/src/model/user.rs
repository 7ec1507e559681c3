use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: u64,
    pub email: String,
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Fields not modelled here, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One line of the profile activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<u64>,
    pub message: String,
    /// RFC 3339 timestamp as sent by the backend.
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
