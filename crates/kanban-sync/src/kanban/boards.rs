//! Board-level mutations: creation, favorite flag, visibility, deletion.

use kanban_core::{Board, BoardSummary, CacheKey, Dashboard, KeyPattern, Visibility};
use kanban_remote::{Endpoint, RemoteRequest};
use serde_json::{Value, json};

use super::{cached, keys, payload};
use crate::error::MutationError;
use crate::mutation::{CacheView, Mutation, Patch, decode_payload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBoardInput {
    pub title: String,
    pub visibility: Visibility,
    /// Owning team, if any.
    pub team_id: Option<u64>,
}

/// Creates a board. Waits for the backend; the new id is not known before.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateBoard;

impl Mutation for CreateBoard {
    type Input = CreateBoardInput;
    type Output = BoardSummary;

    fn name(&self) -> &'static str {
        "create_board"
    }

    fn affected_keys(&self, _input: &CreateBoardInput) -> Vec<CacheKey> {
        Vec::new()
    }

    fn exclusive_keys(&self, _input: &CreateBoardInput) -> Vec<CacheKey> {
        vec![keys::dashboard()]
    }

    fn request(&self, input: &CreateBoardInput) -> RemoteRequest {
        let mut body = json!({ "title": input.title, "visibility": input.visibility });
        if let Some(team_id) = input.team_id {
            body["teamId"] = json!(team_id);
        }
        RemoteRequest::new(Endpoint::CreateBoard).with_body(body)
    }

    fn commit_keys(&self, _input: &CreateBoardInput) -> Vec<KeyPattern> {
        vec![keys::dashboard().as_pattern()]
    }

    fn decode(&self, _input: &CreateBoardInput, payload: Value) -> Result<BoardSummary, MutationError> {
        decode_payload(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteInput {
    pub board_id: u64,
    pub favorite: bool,
}

/// Marks or unmarks a board as favorite.
///
/// The flag flips at once on the board and on its dashboard entry.
/// `FAVORITE_LIMIT_EXCEEDED` comes back as a conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleFavorite;

impl Mutation for ToggleFavorite {
    type Input = FavoriteInput;
    type Output = ();

    fn name(&self) -> &'static str {
        "toggle_favorite"
    }

    fn affected_keys(&self, input: &FavoriteInput) -> Vec<CacheKey> {
        vec![keys::board(input.board_id), keys::dashboard()]
    }

    fn optimistic_patch(
        &self,
        view: &CacheView<'_>,
        input: &FavoriteInput,
    ) -> Result<Option<Patch>, MutationError> {
        let mut patch = Patch::new();

        if let Some(mut board) = cached::<Board>(view, &keys::board(input.board_id))? {
            board.is_favorite = input.favorite;
            patch = patch.set(keys::board(input.board_id), payload(&board)?);
        }
        if let Some(mut dashboard) = cached::<Dashboard>(view, &keys::dashboard())? {
            if dashboard.set_favorite(input.board_id, input.favorite) {
                patch = patch.set(keys::dashboard(), payload(&dashboard)?);
            }
        }

        Ok(Some(patch))
    }

    fn request(&self, input: &FavoriteInput) -> RemoteRequest {
        if input.favorite {
            Endpoint::FavoriteBoard(input.board_id).into()
        } else {
            Endpoint::UnfavoriteBoard(input.board_id).into()
        }
    }

    fn commit_keys(&self, input: &FavoriteInput) -> Vec<KeyPattern> {
        vec![
            keys::board(input.board_id).as_pattern(),
            keys::dashboard().as_pattern(),
        ]
    }

    fn decode(&self, _input: &FavoriteInput, _payload: Value) -> Result<(), MutationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityInput {
    pub board_id: u64,
    pub visibility: Visibility,
}

/// Changes who can see a board.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateBoardVisibility;

impl Mutation for UpdateBoardVisibility {
    type Input = VisibilityInput;
    type Output = ();

    fn name(&self) -> &'static str {
        "update_board_visibility"
    }

    fn affected_keys(&self, input: &VisibilityInput) -> Vec<CacheKey> {
        vec![keys::board(input.board_id), keys::dashboard()]
    }

    fn optimistic_patch(
        &self,
        view: &CacheView<'_>,
        input: &VisibilityInput,
    ) -> Result<Option<Patch>, MutationError> {
        let mut patch = Patch::new();

        if let Some(mut board) = cached::<Board>(view, &keys::board(input.board_id))? {
            board.visibility = input.visibility;
            patch = patch.set(keys::board(input.board_id), payload(&board)?);
        }
        if let Some(mut dashboard) = cached::<Dashboard>(view, &keys::dashboard())? {
            let entry = dashboard.boards.iter_mut().find(|b| b.id == input.board_id);
            if let Some(entry) = entry {
                entry.visibility = input.visibility;
                patch = patch.set(keys::dashboard(), payload(&dashboard)?);
            }
        }

        Ok(Some(patch))
    }

    fn request(&self, input: &VisibilityInput) -> RemoteRequest {
        RemoteRequest::new(Endpoint::UpdateBoardVisibility(input.board_id))
            .with_body(json!({ "visibility": input.visibility }))
    }

    fn commit_keys(&self, input: &VisibilityInput) -> Vec<KeyPattern> {
        vec![
            keys::board(input.board_id).as_pattern(),
            keys::dashboard().as_pattern(),
        ]
    }

    fn decode(&self, _input: &VisibilityInput, _payload: Value) -> Result<(), MutationError> {
        Ok(())
    }
}

/// Deletes a board.
///
/// The board, its members and its dashboard entry disappear at once;
/// rollback puts all three back.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteBoard;

impl Mutation for DeleteBoard {
    type Input = u64;
    type Output = ();

    fn name(&self) -> &'static str {
        "delete_board"
    }

    fn affected_keys(&self, board_id: &u64) -> Vec<CacheKey> {
        vec![
            keys::board(*board_id),
            keys::board_members(*board_id),
            keys::dashboard(),
        ]
    }

    fn optimistic_patch(
        &self,
        view: &CacheView<'_>,
        board_id: &u64,
    ) -> Result<Option<Patch>, MutationError> {
        let mut patch = Patch::new()
            .remove(keys::board(*board_id))
            .remove(keys::board_members(*board_id));

        if let Some(mut dashboard) = cached::<Dashboard>(view, &keys::dashboard())? {
            if dashboard.remove_board(*board_id) {
                patch = patch.set(keys::dashboard(), payload(&dashboard)?);
            }
        }

        Ok(Some(patch))
    }

    fn request(&self, board_id: &u64) -> RemoteRequest {
        Endpoint::DeleteBoard(*board_id).into()
    }

    fn commit_keys(&self, _board_id: &u64) -> Vec<KeyPattern> {
        vec![keys::dashboard().as_pattern()]
    }

    fn decode(&self, _board_id: &u64, _payload: Value) -> Result<(), MutationError> {
        Ok(())
    }
}
