//! Resource client trait definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::endpoint::RemoteRequest;
use crate::error::RemoteError;

/// Transport to the kanban backend.
///
/// Implementations issue exactly one request per call: no retries, no
/// caching, no local state changes. The returned payload is the
/// envelope's `data` (`Value::Null` when the backend sent none).
///
/// # Implementors
///
/// - `HttpResourceClient` - Talks to the REST backend over HTTP
/// - Test doubles scripting responses per endpoint
///
/// # Example
///
/// ```ignore
/// use kanban_remote::{Endpoint, RemoteRequest, ResourceClient};
///
/// struct Offline;
///
/// #[async_trait]
/// impl ResourceClient for Offline {
///     async fn call(&self, _request: &RemoteRequest) -> Result<Value, RemoteError> {
///         Err(RemoteError::network("offline"))
///     }
///
///     fn name(&self) -> &str {
///         "offline"
///     }
/// }
/// ```
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Issues `request` and returns the response payload.
    ///
    /// # Errors
    ///
    /// - `ErrorCode::Network` / `ErrorCode::Timeout` when the backend is unreachable
    /// - The backend's `errorCode` when the envelope carries one
    /// - `ErrorCode::Decode` when the body is not a valid envelope
    async fn call(&self, request: &RemoteRequest) -> Result<Value, RemoteError>;

    /// Returns the name of this client, for logging.
    fn name(&self) -> &str;

    /// Verifies the backend is reachable.
    ///
    /// The default implementation assumes it is.
    async fn health_check(&self) -> Result<(), RemoteError> {
        Ok(())
    }
}
