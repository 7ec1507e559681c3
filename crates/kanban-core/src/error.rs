//! Backend error codes and their classification.
//!
//! The REST backend answers failures with an envelope carrying a stable
//! `errorCode` string. [`ErrorCode`] parses those strings, and adds the
//! transport-level conditions the client detects itself (network failure,
//! timeout, 5xx, undecodable body). [`ErrorCode::class`] maps every code
//! onto the four error classes the UI layer distinguishes.
//!
//! # Example
//!
//! ```
//! use kanban_core::{ErrorClass, ErrorCode};
//!
//! let code = ErrorCode::parse("DEACTIVATED_ACCOUNT");
//! assert_eq!(code, ErrorCode::DeactivatedAccount);
//! assert_eq!(code.class(), ErrorClass::Conflict);
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Machine-readable error code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The backend could not be reached.
    Network,
    /// The request did not complete within the configured bound.
    Timeout,
    /// The backend answered with a 5xx status and no domain code.
    Server(u16),
    /// The response body could not be decoded.
    Decode,
    /// Current credentials were rejected.
    Unauthorized,
    /// The requested resource does not exist.
    NotFound,
    /// No account matches the given email.
    AccountNotFound,
    /// Password does not match the account.
    PasswordMismatch,
    /// The account exists but was deactivated by its owner.
    DeactivatedAccount,
    /// Email is already registered.
    DuplicateEmail,
    /// Nickname is already taken.
    DuplicateNickname,
    /// The verification code expired; the flow must restart.
    ExpiredVerification,
    /// The verification code does not match.
    WrongVerificationCode,
    /// The user already has the maximum number of favorite boards.
    FavoriteLimitExceeded,
    /// Any code this client does not know about.
    Other(String),
}

/// Error classes surfaced to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Network unreachable, timeout, server failure. Always rolls back.
    Transport,
    /// Field-level rejection (duplicate email, wrong password...).
    Validation,
    /// Domain conflict that may have a recovery flow.
    Conflict,
    /// Credentials rejected; the whole session must be reset.
    AuthExpired,
}

impl ErrorCode {
    /// Parses a backend `errorCode` string. Unknown codes are preserved.
    pub fn parse(code: &str) -> Self {
        match code {
            "UNAUTHORIZED" | "INVALID_TOKEN" | "EXPIRED_TOKEN" => Self::Unauthorized,
            "NOT_FOUND" => Self::NotFound,
            "ACCOUNT_NOT_FOUND" => Self::AccountNotFound,
            "PASSWORD_MISMATCH" => Self::PasswordMismatch,
            "DEACTIVATED_ACCOUNT" => Self::DeactivatedAccount,
            "DUPLICATE_EMAIL" => Self::DuplicateEmail,
            "DUPLICATE_NICKNAME" => Self::DuplicateNickname,
            "EXPIRED_VERIFICATION" => Self::ExpiredVerification,
            "WRONG_VERIFICATION_CODE" => Self::WrongVerificationCode,
            "FAVORITE_LIMIT_EXCEEDED" => Self::FavoriteLimitExceeded,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the wire representation of this code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Network => "NETWORK",
            Self::Timeout => "TIMEOUT",
            Self::Server(_) => "SERVER_ERROR",
            Self::Decode => "DECODE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::DeactivatedAccount => "DEACTIVATED_ACCOUNT",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::DuplicateNickname => "DUPLICATE_NICKNAME",
            Self::ExpiredVerification => "EXPIRED_VERIFICATION",
            Self::WrongVerificationCode => "WRONG_VERIFICATION_CODE",
            Self::FavoriteLimitExceeded => "FAVORITE_LIMIT_EXCEEDED",
            Self::Other(code) => code,
        }
    }

    /// Classifies the code into the UI error taxonomy.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Network | Self::Timeout | Self::Server(_) | Self::Decode | Self::Other(_) => {
                ErrorClass::Transport
            },
            Self::Unauthorized => ErrorClass::AuthExpired,
            Self::NotFound
            | Self::AccountNotFound
            | Self::PasswordMismatch
            | Self::DuplicateEmail
            | Self::DuplicateNickname
            | Self::WrongVerificationCode => ErrorClass::Validation,
            Self::DeactivatedAccount | Self::ExpiredVerification | Self::FavoriteLimitExceeded => {
                ErrorClass::Conflict
            },
        }
    }

    /// Name of the form field a validation code refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::AccountNotFound | Self::DuplicateEmail => Some("email"),
            Self::PasswordMismatch => Some("password"),
            Self::DuplicateNickname => Some("nickname"),
            Self::WrongVerificationCode => Some("verificationCode"),
            _ => None,
        }
    }

    /// Returns true for conditions that may succeed when retried as-is.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::Server(_))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(status) => write!(f, "SERVER_ERROR({})", status),
            other => f.write_str(other.as_str()),
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_codes() {
        assert_eq!(ErrorCode::parse("ACCOUNT_NOT_FOUND"), ErrorCode::AccountNotFound);
        assert_eq!(ErrorCode::parse("DUPLICATE_NICKNAME"), ErrorCode::DuplicateNickname);
        assert_eq!(
            ErrorCode::parse("FAVORITE_LIMIT_EXCEEDED"),
            ErrorCode::FavoriteLimitExceeded
        );
        assert_eq!(ErrorCode::parse("EXPIRED_TOKEN"), ErrorCode::Unauthorized);
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let code = ErrorCode::parse("SOMETHING_NEW");
        assert_eq!(code, ErrorCode::Other("SOMETHING_NEW".to_string()));
        assert_eq!(code.as_str(), "SOMETHING_NEW");
    }

    #[test]
    fn test_classification() {
        assert_eq!(ErrorCode::Timeout.class(), ErrorClass::Transport);
        assert_eq!(ErrorCode::Server(503).class(), ErrorClass::Transport);
        assert_eq!(ErrorCode::DuplicateEmail.class(), ErrorClass::Validation);
        assert_eq!(ErrorCode::PasswordMismatch.class(), ErrorClass::Validation);
        assert_eq!(ErrorCode::DeactivatedAccount.class(), ErrorClass::Conflict);
        assert_eq!(ErrorCode::ExpiredVerification.class(), ErrorClass::Conflict);
        assert_eq!(ErrorCode::Unauthorized.class(), ErrorClass::AuthExpired);
    }

    #[test]
    fn test_field_mapping() {
        assert_eq!(ErrorCode::DuplicateEmail.field(), Some("email"));
        assert_eq!(ErrorCode::DuplicateNickname.field(), Some("nickname"));
        assert_eq!(ErrorCode::Timeout.field(), None);
    }

    #[test]
    fn test_is_transient() {
        assert!(ErrorCode::Network.is_transient());
        assert!(ErrorCode::Timeout.is_transient());
        assert!(ErrorCode::Server(500).is_transient());
        assert!(!ErrorCode::Decode.is_transient());
        assert!(!ErrorCode::DuplicateEmail.is_transient());
    }

    #[test]
    fn test_serde_round_trip_uses_wire_string() {
        let json = serde_json::to_string(&ErrorCode::DeactivatedAccount).unwrap();
        assert_eq!(json, r#""DEACTIVATED_ACCOUNT""#);

        let code: ErrorCode = serde_json::from_str(r#""WRONG_VERIFICATION_CODE""#).unwrap();
        assert_eq!(code, ErrorCode::WrongVerificationCode);
    }
}
