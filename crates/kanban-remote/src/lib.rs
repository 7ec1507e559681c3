//! # Kanban Remote
//!
//! Typed transport to the kanban REST backend.
//!
//! This crate is pure transport: it never touches local cache state and
//! performs no retries. Retry and rollback policy belong to the caller.
//!
//! ## Features
//!
//! - Async trait-based [`ResourceClient`] abstraction
//! - Endpoint catalog for auth, users, teams, boards, members and cards
//! - `{ data, message?, errorCode? }` envelope decoding into [`RemoteError`]
//! - Two-tier credential storage selected by "keep me signed in"
//!
//! ## Example
//!
//! ```ignore
//! use kanban_remote::{ClientConfig, Endpoint, HttpResourceClient, RemoteRequest, ResourceClient};
//!
//! let config = ClientConfig::builder()
//!     .base_url("https://kanban.example.com/api")
//!     .timeout_secs(10)
//!     .build()?;
//!
//! let client = HttpResourceClient::new(config, vault)?;
//! let dashboard = client.call(&RemoteRequest::new(Endpoint::Dashboard)).await?;
//! ```

pub mod client;
pub mod credentials;
pub mod endpoint;
pub mod envelope;
pub mod error;

// Re-exports
pub use client::{ClientConfig, ClientConfigBuilder, HttpResourceClient, ResourceClient};
pub use credentials::{
    CredentialStore, CredentialVault, Credentials, FileCredentialStore, MemoryCredentialStore,
    StorageTier,
};
pub use endpoint::{Endpoint, HttpMethod, RemoteRequest};
pub use envelope::Envelope;
pub use error::{ClientConfigError, CredentialError, RemoteError};

// Re-export kanban_core for consumers
pub use kanban_core;
