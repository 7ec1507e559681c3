//! Resource client abstraction and its HTTP implementation.

mod config;
mod http;
mod traits;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use http::HttpResourceClient;
pub use traits::ResourceClient;
