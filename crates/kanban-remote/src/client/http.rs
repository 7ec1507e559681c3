//! HTTP implementation of [`ResourceClient`] over `reqwest`.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::config::ClientConfig;
use super::traits::ResourceClient;
use crate::credentials::CredentialVault;
use crate::endpoint::{Endpoint, HttpMethod, RemoteRequest};
use crate::envelope::{Envelope, status_code};
use crate::error::{ClientConfigError, RemoteError};

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Resource client talking to the REST backend.
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    config: ClientConfig,
    http: reqwest::Client,
    vault: CredentialVault,
}

impl HttpResourceClient {
    /// Creates a client. The bearer token is read from `vault` on every call.
    pub fn new(config: ClientConfig, vault: CredentialVault) -> Result<Self, ClientConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| ClientConfigError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            http,
            vault,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn transport_error(e: reqwest::Error, endpoint: Endpoint) -> RemoteError {
        if e.is_timeout() {
            warn!(endpoint = %endpoint, "Request timed out");
            RemoteError::timeout()
        } else if e.is_decode() {
            RemoteError::decode(e.to_string())
        } else {
            warn!(endpoint = %endpoint, error = %e, "Request failed before a response");
            RemoteError::network(e.to_string())
        }
    }

    fn decode_body(status: StatusCode, body: &[u8]) -> Result<Value, RemoteError> {
        if body.is_empty() {
            return if status.is_success() {
                Ok(Value::Null)
            } else {
                Err(RemoteError::new(status_code(status.as_u16())).at_status(status.as_u16()))
            };
        }

        match serde_json::from_slice::<Envelope>(body) {
            Ok(envelope) => envelope.into_result(status.as_u16()),
            // Non-envelope error bodies (proxies, load balancers) fall back to the status.
            Err(_) if !status.is_success() => {
                Err(RemoteError::new(status_code(status.as_u16())).at_status(status.as_u16()))
            },
            Err(e) => Err(RemoteError::decode(e.to_string()).at_status(status.as_u16())),
        }
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    #[instrument(skip_all, fields(endpoint = %request.endpoint()))]
    async fn call(&self, request: &RemoteRequest) -> Result<Value, RemoteError> {
        let endpoint = request.endpoint();
        let url = self.config.url(&endpoint.path());
        let request_id = Uuid::now_v7().to_string();

        let mut builder = self
            .http
            .request(Self::method(endpoint.method()), &url)
            .header(REQUEST_ID_HEADER, &request_id);

        if endpoint.requires_auth() {
            if let Some(token) = self.vault.access_token() {
                builder = builder.bearer_auth(token);
            }
        }
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        debug!(request_id = %request_id, url = %url, "Sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| Self::transport_error(e, endpoint))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::transport_error(e, endpoint))?;

        let result = Self::decode_body(status, &body);

        match &result {
            Ok(_) => debug!(request_id = %request_id, status = status.as_u16(), "Request completed"),
            Err(e) => debug!(
                request_id = %request_id,
                status = status.as_u16(),
                code = %e.code,
                "Request rejected"
            ),
        }

        result
    }

    fn name(&self) -> &str {
        "http"
    }

    async fn health_check(&self) -> Result<(), RemoteError> {
        let url = self.config.url("/health");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(e, Endpoint::Dashboard))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            Err(RemoteError::new(status_code(status)).at_status(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_decode_success_body() {
        let body = serde_json::to_vec(&json!({"data": {"id": 3}})).unwrap();
        let value = HttpResourceClient::decode_body(StatusCode::OK, &body).unwrap();
        assert_eq!(value, json!({"id": 3}));
    }

    #[test]
    fn test_decode_empty_body() {
        let value = HttpResourceClient::decode_body(StatusCode::NO_CONTENT, &[]).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_decode_non_envelope_error_uses_status() {
        let err =
            HttpResourceClient::decode_body(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>")
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::Server(502));
    }

    #[test]
    fn test_decode_garbage_success_is_decode_error() {
        let err = HttpResourceClient::decode_body(StatusCode::OK, b"not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::Decode);
    }

    #[test]
    fn test_new_client() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:9")
            .build()
            .unwrap();
        let client = HttpResourceClient::new(config, CredentialVault::in_memory()).unwrap();
        assert_eq!(client.name(), "http");
        assert_eq!(client.config().base_url(), "http://localhost:9");
    }
}
