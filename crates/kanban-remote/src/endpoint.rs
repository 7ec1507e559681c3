//! Endpoint catalog and request description.

use std::fmt;

use serde_json::Value;

/// HTTP verb of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Returns true for read-only, idempotent verbs the caller may retry.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Backend endpoints used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    // Auth / session
    Login,
    Logout,
    Reactivate,
    CheckEmail,
    CheckNickname,
    SendVerification,
    VerifyCode,
    SignUp,

    // Users
    Me,
    UpdateMe,
    MyActivity,

    // Teams
    Teams,
    CreateTeam,
    Team(u64),
    InviteTeamMember(u64),

    // Boards
    Dashboard,
    Board(u64),
    CreateBoard,
    DeleteBoard(u64),
    UpdateBoardVisibility(u64),
    FavoriteBoard(u64),
    UnfavoriteBoard(u64),
    BoardMembers(u64),
    AddBoardMember(u64),
    RemoveBoardMember { board_id: u64, user_id: u64 },

    // Cards
    MoveCard { board_id: u64, card_id: u64 },
}

impl Endpoint {
    /// HTTP verb used by this endpoint.
    pub fn method(&self) -> HttpMethod {
        use Endpoint::*;
        match self {
            CheckEmail | CheckNickname | Me | MyActivity | Teams | Team(_) | Dashboard
            | Board(_) | BoardMembers(_) => HttpMethod::Get,
            UpdateMe | UpdateBoardVisibility(_) => HttpMethod::Patch,
            MoveCard { .. } => HttpMethod::Put,
            DeleteBoard(_) | UnfavoriteBoard(_) | RemoveBoardMember { .. } => HttpMethod::Delete,
            Login | Logout | Reactivate | SendVerification | VerifyCode | SignUp | CreateTeam
            | InviteTeamMember(_) | CreateBoard | FavoriteBoard(_) | AddBoardMember(_) => {
                HttpMethod::Post
            },
        }
    }

    /// Path relative to the configured base URL.
    pub fn path(&self) -> String {
        use Endpoint::*;
        match self {
            Login => "/auth/login".to_string(),
            Logout => "/auth/logout".to_string(),
            Reactivate => "/auth/reactivate".to_string(),
            CheckEmail => "/auth/check-email".to_string(),
            CheckNickname => "/auth/check-nickname".to_string(),
            SendVerification => "/auth/verification".to_string(),
            VerifyCode => "/auth/verification/confirm".to_string(),
            SignUp => "/auth/signup".to_string(),
            Me | UpdateMe => "/users/me".to_string(),
            MyActivity => "/users/me/activity".to_string(),
            Teams | CreateTeam => "/teams".to_string(),
            Team(id) => format!("/teams/{}", id),
            InviteTeamMember(id) => format!("/teams/{}/invitations", id),
            Dashboard => "/boards".to_string(),
            CreateBoard => "/boards".to_string(),
            Board(id) | DeleteBoard(id) => format!("/boards/{}", id),
            UpdateBoardVisibility(id) => format!("/boards/{}/visibility", id),
            FavoriteBoard(id) | UnfavoriteBoard(id) => format!("/boards/{}/favorite", id),
            BoardMembers(id) | AddBoardMember(id) => format!("/boards/{}/members", id),
            RemoveBoardMember { board_id, user_id } => {
                format!("/boards/{}/members/{}", board_id, user_id)
            },
            MoveCard { board_id, card_id } => {
                format!("/boards/{}/cards/{}/position", board_id, card_id)
            },
        }
    }

    /// Returns false for endpoints reachable without a session.
    pub fn requires_auth(&self) -> bool {
        use Endpoint::*;
        !matches!(
            self,
            Login | Reactivate | CheckEmail | CheckNickname | SendVerification | VerifyCode | SignUp
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// A call to be issued through a [`ResourceClient`](crate::ResourceClient).
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    endpoint: Endpoint,
    body: Option<Value>,
    query: Vec<(String, String)>,
}

impl RemoteRequest {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            body: None,
            query: Vec::new(),
        }
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a query-string parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }
}

impl From<Endpoint> for RemoteRequest {
    fn from(endpoint: Endpoint) -> Self {
        Self::new(endpoint)
    }
}
