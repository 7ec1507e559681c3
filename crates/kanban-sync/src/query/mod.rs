//! Resource reads through the cache.

mod client;
mod resource;

pub use client::{QueryClient, RetryPolicy};
pub use resource::{Resource, ResourceHandle, ResourceState};
