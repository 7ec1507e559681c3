//! Response envelope `{ data, message?, errorCode? }`.

use kanban_core::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RemoteError;

/// Envoltorio comun de todas las respuestas del backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = Value> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            error_code: None,
        }
    }

    /// Failure envelope with a backend error code.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            error_code: Some(code.into()),
        }
    }
}

impl Envelope<Value> {
    /// Interprets a decoded envelope received with the given HTTP status.
    ///
    /// An `errorCode` always wins; otherwise the status decides. A
    /// successful envelope without `data` yields `Value::Null`.
    pub fn into_result(self, status: u16) -> Result<Value, RemoteError> {
        if let Some(code) = self.error_code {
            let mut err = RemoteError::new(ErrorCode::parse(&code)).at_status(status);
            err.message = self.message;
            return Err(err);
        }

        if (200..300).contains(&status) {
            return Ok(self.data.unwrap_or(Value::Null));
        }

        let mut err = RemoteError::new(status_code(status)).at_status(status);
        err.message = self.message;
        Err(err)
    }
}

/// Maps an HTTP status without a domain code onto an [`ErrorCode`].
pub(crate) fn status_code(status: u16) -> ErrorCode {
    match status {
        401 => ErrorCode::Unauthorized,
        404 => ErrorCode::NotFound,
        408 | 504 => ErrorCode::Timeout,
        500..=599 => ErrorCode::Server(status),
        other => ErrorCode::Other(format!("HTTP_{}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let envelope: Envelope =
            serde_json::from_value(json!({"data": {"id": 1}, "message": "ok"})).unwrap();
        assert_eq!(envelope.into_result(200).unwrap(), json!({"id": 1}));
    }

    #[test]
    fn test_success_without_data_is_null() {
        let envelope: Envelope = serde_json::from_value(json!({})).unwrap();
        assert_eq!(envelope.into_result(204).unwrap(), Value::Null);
    }

    #[test]
    fn test_error_code_wins_over_status() {
        let envelope: Envelope = serde_json::from_value(json!({
            "errorCode": "DUPLICATE_NICKNAME",
            "message": "nickname taken"
        }))
        .unwrap();

        let err = envelope.into_result(409).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateNickname);
        assert_eq!(err.message.as_deref(), Some("nickname taken"));
        assert_eq!(err.status, Some(409));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_code(401), ErrorCode::Unauthorized);
        assert_eq!(status_code(404), ErrorCode::NotFound);
        assert_eq!(status_code(503), ErrorCode::Server(503));
        assert_eq!(status_code(504), ErrorCode::Timeout);
        assert_eq!(status_code(418), ErrorCode::Other("HTTP_418".to_string()));
    }
}
