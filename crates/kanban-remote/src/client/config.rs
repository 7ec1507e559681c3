//! Remote client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientConfigError;

/// Configuration for the HTTP resource client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash.
    base_url: String,

    /// Bounded wait per request before surfacing `Timeout`.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    user_agent: String,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("kanban-sync/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Creates a new builder for ClientConfig.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the user agent.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Joins an endpoint path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the per-request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
        let base_url = self
            .base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or(ClientConfigError::MissingBaseUrl)?;

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientConfigError::InvalidBaseUrl(base_url));
        }

        let timeout_secs = self.timeout_secs.unwrap_or_else(default_timeout_secs);
        if timeout_secs == 0 {
            return Err(ClientConfigError::ZeroTimeout);
        }

        Ok(ClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
        })
    }
}
