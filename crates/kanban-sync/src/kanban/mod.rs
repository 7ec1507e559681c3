//! Kanban resources and mutations.
//!
//! Cache key families:
//!
//! | key                          | payload              |
//! |------------------------------|----------------------|
//! | `dashboard`                  | [`Dashboard`]        |
//! | `board/{id}`                 | [`Board`]            |
//! | `board/{id}/members`         | `Vec<BoardMember>`   |
//! | `team`                       | `Vec<Team>`          |
//! | `team/{id}`                  | [`Team`]             |
//! | `user/me`                    | [`Profile`]          |
//! | `user/me/activity`           | `Vec<ActivityEntry>` |
//!
//! [`Dashboard`]: kanban_core::Dashboard
//! [`Board`]: kanban_core::Board
//! [`Team`]: kanban_core::Team
//! [`Profile`]: kanban_core::Profile

pub mod auth;
pub mod boards;
pub mod cards;
pub mod keys;
pub mod members;
pub mod resources;
pub mod teams;
pub mod users;

#[cfg(test)]
mod fixtures;

use kanban_core::CacheKey;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::MutationError;
use crate::mutation::CacheView;

pub use auth::{
    CheckField, ConfirmVerification, Login, LoginInput, SendVerification, SignUp, SignUpInput,
    VerificationInput,
};
pub use boards::{
    CreateBoard, CreateBoardInput, DeleteBoard, FavoriteInput, ToggleFavorite,
    UpdateBoardVisibility, VisibilityInput,
};
pub use cards::{CardMoveInput, MoveCard};
pub use members::{AddBoardMember, MemberInput, RemoveBoardMember, RemoveMemberInput};
pub use teams::{CreateTeam, CreateTeamInput, InviteInput, InviteTeamMember};
pub use users::{ProfileInput, UpdateProfile};

/// Reads a cached payload as `T`.
pub(crate) fn cached<T: DeserializeOwned>(
    view: &CacheView<'_>,
    key: &CacheKey,
) -> Result<Option<T>, MutationError> {
    view.read_as(key)
        .map_err(|e| MutationError::Decode(format!("{}: {}", key, e)))
}

/// Serializes a patched model back into a payload.
pub(crate) fn payload<T: Serialize>(value: &T) -> Result<Value, MutationError> {
    serde_json::to_value(value).map_err(|e| MutationError::Decode(e.to_string()))
}
