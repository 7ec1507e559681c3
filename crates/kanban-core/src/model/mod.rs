//! Resource models exchanged with the REST backend.
//!
//! Payloads are camelCase JSON. The cache stores them as opaque
//! `serde_json::Value`s; these types are the typed view used by
//! optimistic patches and by callers. Fields a type does not name are
//! kept in its `extra` map so a round trip through the model is lossless.

mod board;
mod team;
mod user;

pub use board::{Board, BoardList, BoardMember, BoardSummary, Card, Dashboard, MemberRole, Visibility};
pub use team::Team;
pub use user::{ActivityEntry, Profile};
