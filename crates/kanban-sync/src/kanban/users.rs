//! Profile mutations.

use kanban_core::{CacheKey, KeyPattern, Profile};
use kanban_remote::{Endpoint, RemoteRequest};
use serde::Serialize;
use serde_json::Value;

use super::{cached, keys, payload};
use crate::error::MutationError;
use crate::mutation::{CacheView, Mutation, Patch, decode_payload};

/// Fields to change; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Edits the signed-in user's profile.
///
/// A taken nickname comes back as a validation error on `nickname`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateProfile;

impl Mutation for UpdateProfile {
    type Input = ProfileInput;
    type Output = Profile;

    fn name(&self) -> &'static str {
        "update_profile"
    }

    fn affected_keys(&self, _input: &ProfileInput) -> Vec<CacheKey> {
        vec![keys::me()]
    }

    fn optimistic_patch(
        &self,
        view: &CacheView<'_>,
        input: &ProfileInput,
    ) -> Result<Option<Patch>, MutationError> {
        let Some(mut profile) = cached::<Profile>(view, &keys::me())? else {
            return Ok(None);
        };

        if let Some(nickname) = &input.nickname {
            profile.nickname = nickname.clone();
        }
        if let Some(bio) = &input.bio {
            profile.bio = Some(bio.clone());
        }
        Ok(Some(Patch::new().set(keys::me(), payload(&profile)?)))
    }

    fn request(&self, input: &ProfileInput) -> RemoteRequest {
        RemoteRequest::new(Endpoint::UpdateMe).with_body(serde_json::to_value(input).unwrap_or_default())
    }

    fn commit_keys(&self, _input: &ProfileInput) -> Vec<KeyPattern> {
        vec![keys::me().as_pattern()]
    }

    fn decode(&self, _input: &ProfileInput, payload: Value) -> Result<Profile, MutationError> {
        decode_payload(payload)
    }
}
