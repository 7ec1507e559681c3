//! Team mutations. Neither is optimistic: the team list refetches on commit.

use kanban_core::{CacheKey, KeyPattern, Team};
use kanban_remote::{Endpoint, RemoteRequest};
use serde_json::{Value, json};

use super::keys;
use crate::error::MutationError;
use crate::mutation::{Mutation, decode_payload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTeamInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateTeam;

impl Mutation for CreateTeam {
    type Input = CreateTeamInput;
    type Output = Team;

    fn name(&self) -> &'static str {
        "create_team"
    }

    fn affected_keys(&self, _input: &CreateTeamInput) -> Vec<CacheKey> {
        Vec::new()
    }

    fn request(&self, input: &CreateTeamInput) -> RemoteRequest {
        RemoteRequest::new(Endpoint::CreateTeam).with_body(json!({
            "name": input.name,
            "description": input.description,
        }))
    }

    fn commit_keys(&self, _input: &CreateTeamInput) -> Vec<KeyPattern> {
        vec![keys::teams().as_pattern()]
    }

    fn decode(&self, _input: &CreateTeamInput, payload: Value) -> Result<Team, MutationError> {
        decode_payload(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteInput {
    pub team_id: u64,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InviteTeamMember;

impl Mutation for InviteTeamMember {
    type Input = InviteInput;
    type Output = ();

    fn name(&self) -> &'static str {
        "invite_team_member"
    }

    fn affected_keys(&self, _input: &InviteInput) -> Vec<CacheKey> {
        Vec::new()
    }

    fn exclusive_keys(&self, input: &InviteInput) -> Vec<CacheKey> {
        vec![keys::team(input.team_id)]
    }

    fn request(&self, input: &InviteInput) -> RemoteRequest {
        RemoteRequest::new(Endpoint::InviteTeamMember(input.team_id))
            .with_body(json!({ "email": input.email }))
    }

    fn commit_keys(&self, input: &InviteInput) -> Vec<KeyPattern> {
        vec![keys::team(input.team_id).as_pattern()]
    }

    fn decode(&self, _input: &InviteInput, _payload: Value) -> Result<(), MutationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_team() {
        let input = CreateTeamInput {
            name: "Platform".to_string(),
            description: None,
        };
        let request = CreateTeam.request(&input);
        assert_eq!(request.endpoint(), Endpoint::CreateTeam);
        assert_eq!(request.body().unwrap()["name"], "Platform");

        let team = CreateTeam
            .decode(&input, json!({"id": 4, "name": "Platform"}))
            .unwrap();
        assert_eq!(team.id, 4);
        assert!(CreateTeam.commit_keys(&input)[0].matches(&keys::team(4)));
    }

    #[test]
    fn test_invite_is_exclusive_on_team() {
        let input = InviteInput {
            team_id: 2,
            email: "bo@example.com".to_string(),
        };
        assert!(InviteTeamMember.affected_keys(&input).is_empty());
        assert_eq!(InviteTeamMember.exclusive_keys(&input), vec![keys::team(2)]);
        assert_eq!(
            InviteTeamMember.request(&input).endpoint().path(),
            "/teams/2/invitations"
        );
    }
}
