use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::BoardMember;

/// A team owning boards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<BoardMember>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
