//! Error types for the remote client.

use std::path::PathBuf;

use kanban_core::{ErrorClass, ErrorCode};

/// Failure of a single remote call.
///
/// Carries the machine-readable [`ErrorCode`] the caller branches on, plus
/// the backend's human-readable message when one was sent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}{}", message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct RemoteError {
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Optional message from the backend.
    pub message: Option<String>,
    /// HTTP status, when the backend answered at all.
    pub status: Option<u16>,
}

impl RemoteError {
    /// Creates an error from a code alone.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
            status: None,
        }
    }

    /// Creates an error carrying a backend message.
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            status: None,
        }
    }

    /// Creates a network-unreachable error.
    pub fn network(reason: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::Network, reason)
    }

    /// Creates a timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorCode::Timeout)
    }

    /// Creates an undecodable-response error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::Decode, reason)
    }

    /// Attaches the HTTP status.
    pub fn at_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the error class of the code.
    pub fn class(&self) -> ErrorClass {
        self.code.class()
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

/// Errors reading or writing stored credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// An I/O error occurred.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored credentials could not be parsed.
    #[error("corrupt credentials file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl CredentialError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientConfigError {
    #[error("base URL is required")]
    MissingBaseUrl,

    #[error("invalid base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("failed to build HTTP client: {0}")]
    Transport(String),
}
