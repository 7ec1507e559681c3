//! Runtime configuration.
//!
//! Loaded from an optional file (any format the `config` crate detects by
//! extension) overlaid with `KANBAN_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use kanban_remote::{ClientConfig, ClientConfigError};
use serde::{Deserialize, Serialize};

use crate::query::RetryPolicy;

/// Prefix of the environment variables read by [`SyncConfig::load`].
pub const ENV_PREFIX: &str = "KANBAN";

/// What happens when a mutation targets a key another mutation holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusivityPolicy {
    /// Wait for earlier mutations on the key, in issue order.
    #[default]
    Queue,
    /// Fail with `Busy`.
    Reject,
}

/// Configuracion del cliente de sincronizacion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Backend base URL, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub exclusivity: ExclusivityPolicy,
    /// Extra attempts for reads failing with a transient error.
    pub query_retries: u32,
    /// Backoff before the first retry; doubles on each further retry.
    pub retry_backoff_ms: u64,
    /// Directory of the persistent credential tier. Without it both tiers
    /// live in memory.
    pub credentials_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 15,
            exclusivity: ExclusivityPolicy::Queue,
            query_retries: 2,
            retry_backoff_ms: 200,
            credentials_dir: None,
        }
    }
}

impl SyncConfig {
    /// Loads from `file` (if given) and the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::build(file, Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Loads from `file` (if given) and an explicit variable map instead of
    /// the process environment.
    pub fn load_with_env(file: Option<&Path>, vars: config::Map<String, String>) -> Result<Self, ConfigError> {
        Self::build(
            file,
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(Some(vars)),
        )
    }

    fn build(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        builder.add_source(env).build()?.try_deserialize()
    }

    /// Validated HTTP client configuration.
    pub fn client_config(&self) -> Result<ClientConfig, ClientConfigError> {
        ClientConfig::builder()
            .base_url(&self.base_url)
            .timeout_secs(self.request_timeout_secs)
            .build()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.query_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}
