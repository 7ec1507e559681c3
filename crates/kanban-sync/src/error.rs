//! Error types for queries and mutations.

use kanban_core::{CacheKey, ErrorClass, ErrorCode, ReorderError};
use kanban_remote::{ClientConfigError, CredentialError, RemoteError};

/// Generic text shown for every transport failure.
pub const TRY_AGAIN: &str = "Something went wrong with the connection. Please try again.";

/// Why a mutation did not commit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MutationError {
    /// Network unreachable, timeout, server failure. Always rolled back.
    #[error("transport error: {code}")]
    Transport {
        code: ErrorCode,
        message: Option<String>,
    },

    /// Field-level rejection by the backend.
    #[error("validation failed{}: {code}", field.map(|f| format!(" on {}", f)).unwrap_or_default())]
    Validation {
        field: Option<&'static str>,
        code: ErrorCode,
        message: Option<String>,
    },

    /// Domain conflict that needs a recovery flow.
    #[error("conflict: {code}")]
    Conflict {
        code: ErrorCode,
        message: Option<String>,
    },

    /// Credentials were rejected; the session has been cleared.
    #[error("session expired")]
    AuthExpired,

    /// Another mutation holds an exclusive key.
    #[error("busy: a mutation on {key} is still in flight")]
    Busy { key: CacheKey },

    /// The requested card move is not valid for the cached board.
    #[error("invalid move: {0}")]
    InvalidMove(#[from] ReorderError),

    /// The optimistic patch touched a key the mutation did not declare.
    #[error("optimistic patch writes undeclared key {key}")]
    UndeclaredKey { key: CacheKey },

    /// The backend accepted the request but its reply could not be read.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The mutation task ended without a result.
    #[error("mutation aborted: {0}")]
    Aborted(String),
}

impl MutationError {
    /// Classifies a backend failure.
    pub fn from_remote(error: RemoteError) -> Self {
        let RemoteError { code, message, .. } = error;
        match code.class() {
            ErrorClass::Transport => Self::Transport { code, message },
            ErrorClass::Validation => Self::Validation {
                field: code.field(),
                code,
                message,
            },
            ErrorClass::Conflict => Self::Conflict { code, message },
            ErrorClass::AuthExpired => Self::AuthExpired,
        }
    }

    /// Backend code behind this error, when there is one.
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            Self::Transport { code, .. }
            | Self::Validation { code, .. }
            | Self::Conflict { code, .. } => Some(code),
            _ => None,
        }
    }

    /// True for conflicts carrying `code`.
    pub fn is_conflict(&self, code: &ErrorCode) -> bool {
        matches!(self, Self::Conflict { code: c, .. } if c == code)
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } | Self::Decode(_) | Self::Aborted(_) => TRY_AGAIN.to_string(),
            Self::Validation { code, message, .. } | Self::Conflict { code, message } => message
                .clone()
                .unwrap_or_else(|| default_message(code).to_string()),
            Self::AuthExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::Busy { .. } => "Another change is still being saved.".to_string(),
            Self::InvalidMove(_) => "That card can't be moved there.".to_string(),
            Self::UndeclaredKey { .. } => TRY_AGAIN.to_string(),
        }
    }
}

impl From<RemoteError> for MutationError {
    fn from(error: RemoteError) -> Self {
        Self::from_remote(error)
    }
}

fn default_message(code: &ErrorCode) -> &'static str {
    match code {
        ErrorCode::AccountNotFound => "No account exists for this email.",
        ErrorCode::PasswordMismatch => "The password is incorrect.",
        ErrorCode::DuplicateEmail => "This email is already in use.",
        ErrorCode::DuplicateNickname => "This nickname is already taken.",
        ErrorCode::WrongVerificationCode => "The verification code is incorrect.",
        ErrorCode::ExpiredVerification => "The verification code has expired. Start again.",
        ErrorCode::DeactivatedAccount => "This account is deactivated.",
        ErrorCode::FavoriteLimitExceeded => "You have reached the favorite board limit.",
        ErrorCode::NotFound => "It no longer exists.",
        _ => TRY_AGAIN,
    }
}

/// Why a resource read failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Credentials were rejected; the session has been cleared.
    #[error("session expired")]
    AuthExpired,

    #[error("cannot decode {key}: {reason}")]
    Decode { key: CacheKey, reason: String },
}

impl QueryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Remote(e) if e.is_transient())
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Remote(e) => MutationError::from_remote(e.clone()).user_message(),
            Self::AuthExpired => MutationError::AuthExpired.user_message(),
            Self::Decode { .. } => TRY_AGAIN.to_string(),
        }
    }
}

/// Errors assembling a [`KanbanApp`](crate::KanbanApp) from configuration.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("client configuration error: {0}")]
    Client(#[from] ClientConfigError),

    #[error("credential storage error: {0}")]
    Credentials(#[from] CredentialError),
}
