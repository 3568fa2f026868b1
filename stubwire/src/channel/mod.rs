//! Obfuscated channel: framing plus one transport.
//!
//! This module handles key derivation, payload encoding and the marker-based
//! framing that lets both ends find the payload inside arbitrary HTTP bodies.

mod builder;
pub mod codec;
mod framer;
mod keys;
mod padding;
mod patterns;

pub use builder::ChannelBuilder;
pub use framer::Framer;
pub use keys::{KeyMaterial, MARKER_LEN, SHARED_KEY_LEN};
pub use padding::{DEFAULT_PADDING_LEN, Padding};
pub use patterns::{DEBUG_TAG, MarkerPatterns};

use log::debug;

use crate::error::Result;
use crate::transport::Transport;

/// Number of wire bytes shown in request debug logs.
const PREVIEW_LEN: usize = 32;

/// One target endpoint plus the key material derived from its password.
///
/// A channel carries one request/response round trip at a time:
/// `wrap → send → unwrap` runs as one sequence with no overlap. Independent
/// channels share nothing mutable and may be driven concurrently.
#[derive(Debug)]
pub struct Channel<T> {
    framer: Framer,
    transport: T,
}

impl<T: Transport> Channel<T> {
    /// Create a channel from a framer and a transport.
    pub fn new(framer: Framer, transport: T) -> Self {
        Self { framer, transport }
    }

    /// Send a payload and return the decoded reply payload.
    ///
    /// `Ok(None)` means the target answered without a framed payload (or with
    /// an empty body). Transport faults and undecodable payloads are errors.
    pub async fn send(&self, payload: &[u8]) -> Result<Option<Vec<u8>>> {
        let wire = self.framer.wrap(payload)?;
        debug!(
            "[R] {}...",
            String::from_utf8_lossy(&wire[..wire.len().min(PREVIEW_LEN)])
        );

        let Some(response) = self.transport.send(wire).await? else {
            debug!("Empty response from target");
            return Ok(None);
        };

        let segments = self.framer.extract_debug(&response);
        if !segments.is_empty() {
            debug!("{}", segments.join("\n"));
        }

        let reply = self.framer.unwrap(&response)?;
        if reply.is_none() {
            debug!("Response of {} bytes carried no payload", response.len());
        }
        Ok(reply)
    }

    /// Get the framer.
    pub fn framer(&self) -> &Framer {
        &self.framer
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
