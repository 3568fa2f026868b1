//! HTTP transport layer wrapping reqwest.
//!
//! The transport owns everything about the HTTP exchange itself: user agent
//! choice, static headers, cache-busting and the POST. It knows nothing about
//! framing.

mod agents;
pub mod config;
mod http;

pub use agents::AgentPool;
pub use config::HttpConfig;
pub use http::{HttpTransport, add_random_url_param};

use std::future::Future;

use bytes::Bytes;

use crate::error::Result;

/// Trait for the request/response exchange under a channel.
pub trait Transport: Send + Sync {
    /// Send wire bytes and return the raw response body.
    ///
    /// An empty body is reported as `Ok(None)`. Network faults are errors so
    /// callers can tell a dead link from a target that printed nothing.
    fn send(&self, body: Vec<u8>) -> impl Future<Output = Result<Option<Bytes>>> + Send;
}
