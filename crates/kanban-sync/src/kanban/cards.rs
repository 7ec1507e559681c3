//! Card moves.

use kanban_core::{
    Board, CacheKey, CardMove, ContainerId, ItemId, KeyPattern, try_reorder,
};
use kanban_remote::{Endpoint, RemoteRequest};
use serde_json::{Value, json};

use super::{cached, keys, payload};
use crate::error::MutationError;
use crate::mutation::{CacheView, Mutation, Patch};

/// Drag-and-drop move of a card, possibly to another list.
///
/// `to_index` counts positions after the card left its source list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardMoveInput {
    pub board_id: u64,
    pub card_id: u64,
    pub from_list: u64,
    pub from_index: usize,
    pub to_list: u64,
    pub to_index: usize,
}

impl CardMoveInput {
    pub fn as_move(&self) -> CardMove {
        CardMove {
            item: ItemId(self.card_id),
            from: ContainerId(self.from_list),
            from_index: self.from_index,
            to: ContainerId(self.to_list),
            to_index: self.to_index,
        }
    }
}

/// Moves a card on a board.
///
/// The move is checked against the cached board before anything is
/// written: virtual lists are not valid endpoints and a card that is not
/// where the UI claims fails with [`MutationError::InvalidMove`]. Moves on
/// one board are serialized.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveCard;

impl Mutation for MoveCard {
    type Input = CardMoveInput;
    type Output = ();

    fn name(&self) -> &'static str {
        "move_card"
    }

    fn affected_keys(&self, input: &CardMoveInput) -> Vec<CacheKey> {
        vec![keys::board(input.board_id)]
    }

    fn optimistic_patch(
        &self,
        view: &CacheView<'_>,
        input: &CardMoveInput,
    ) -> Result<Option<Patch>, MutationError> {
        let key = keys::board(input.board_id);
        let Some(mut board) = cached::<Board>(view, &key)? else {
            return Ok(None);
        };

        let containers = board.containers();
        let reorder = try_reorder(&containers, &input.as_move())?;
        if reorder.is_empty() {
            return Ok(None);
        }

        board.apply_layout(&reorder.applied_to(&containers));
        Ok(Some(Patch::new().set(key, payload(&board)?)))
    }

    fn request(&self, input: &CardMoveInput) -> RemoteRequest {
        RemoteRequest::new(Endpoint::MoveCard {
            board_id: input.board_id,
            card_id: input.card_id,
        })
        .with_body(json!({
            "listId": input.to_list,
            "position": input.to_index,
        }))
    }

    fn commit_keys(&self, input: &CardMoveInput) -> Vec<KeyPattern> {
        vec![keys::board(input.board_id).as_pattern()]
    }

    fn decode(&self, _input: &CardMoveInput, _payload: Value) -> Result<(), MutationError> {
        Ok(())
    }
}
