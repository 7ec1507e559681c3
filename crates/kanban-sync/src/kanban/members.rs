//! Board membership mutations.

use kanban_core::{BoardMember, CacheKey, KeyPattern, MemberRole};
use kanban_remote::{Endpoint, RemoteRequest};
use serde_json::{Map, Value, json};

use super::{cached, keys, payload};
use crate::error::MutationError;
use crate::mutation::{CacheView, Mutation, Patch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInput {
    pub board_id: u64,
    pub user_id: u64,
    /// Shown in the member list until the refetch brings the real one.
    pub nickname: String,
    pub role: MemberRole,
}

/// Adds a member to a board.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddBoardMember;

impl Mutation for AddBoardMember {
    type Input = MemberInput;
    type Output = ();

    fn name(&self) -> &'static str {
        "add_board_member"
    }

    fn affected_keys(&self, input: &MemberInput) -> Vec<CacheKey> {
        vec![keys::board_members(input.board_id)]
    }

    fn optimistic_patch(
        &self,
        view: &CacheView<'_>,
        input: &MemberInput,
    ) -> Result<Option<Patch>, MutationError> {
        let key = keys::board_members(input.board_id);
        let Some(mut members) = cached::<Vec<BoardMember>>(view, &key)? else {
            return Ok(None);
        };
        if members.iter().any(|m| m.user_id == input.user_id) {
            return Ok(None);
        }

        members.push(BoardMember {
            user_id: input.user_id,
            nickname: input.nickname.clone(),
            role: input.role,
            extra: Map::new(),
        });
        Ok(Some(Patch::new().set(key, payload(&members)?)))
    }

    fn request(&self, input: &MemberInput) -> RemoteRequest {
        RemoteRequest::new(Endpoint::AddBoardMember(input.board_id))
            .with_body(json!({ "userId": input.user_id, "role": input.role }))
    }

    fn commit_keys(&self, input: &MemberInput) -> Vec<KeyPattern> {
        vec![keys::board_members(input.board_id).as_pattern()]
    }

    fn decode(&self, _input: &MemberInput, _payload: Value) -> Result<(), MutationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveMemberInput {
    pub board_id: u64,
    pub user_id: u64,
}

/// Removes a member from a board.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveBoardMember;

impl Mutation for RemoveBoardMember {
    type Input = RemoveMemberInput;
    type Output = ();

    fn name(&self) -> &'static str {
        "remove_board_member"
    }

    fn affected_keys(&self, input: &RemoveMemberInput) -> Vec<CacheKey> {
        vec![keys::board_members(input.board_id)]
    }

    fn optimistic_patch(
        &self,
        view: &CacheView<'_>,
        input: &RemoveMemberInput,
    ) -> Result<Option<Patch>, MutationError> {
        let key = keys::board_members(input.board_id);
        let Some(mut members) = cached::<Vec<BoardMember>>(view, &key)? else {
            return Ok(None);
        };

        let before = members.len();
        members.retain(|m| m.user_id != input.user_id);
        if members.len() == before {
            return Ok(None);
        }
        Ok(Some(Patch::new().set(key, payload(&members)?)))
    }

    fn request(&self, input: &RemoveMemberInput) -> RemoteRequest {
        Endpoint::RemoveBoardMember {
            board_id: input.board_id,
            user_id: input.user_id,
        }
        .into()
    }

    fn commit_keys(&self, input: &RemoveMemberInput) -> Vec<KeyPattern> {
        vec![keys::board_members(input.board_id).as_pattern()]
    }

    fn decode(&self, _input: &RemoveMemberInput, _payload: Value) -> Result<(), MutationError> {
        Ok(())
    }
}
