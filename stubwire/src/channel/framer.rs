//! Wrapping and unwrapping of framed messages.

use super::codec;
use super::keys::KeyMaterial;
use super::padding::Padding;
use super::patterns::MarkerPatterns;
use crate::error::CodecError;

/// Frames payloads as `pad || header || encoded || trailer || pad`.
///
/// One framer exists per channel. Its key material and padding are fixed
/// at construction.
#[derive(Debug, Clone)]
pub struct Framer {
    keys: KeyMaterial,
    patterns: MarkerPatterns,
    padding: Padding,
}

impl Framer {
    /// Create a framer for the given key material and padding mode.
    pub fn new(keys: KeyMaterial, padding: Padding) -> Result<Self, CodecError> {
        let patterns = MarkerPatterns::new(keys.header(), keys.trailer())?;
        Ok(Self {
            keys,
            patterns,
            padding,
        })
    }

    /// Create a framer from a password with freshly generated fixed padding.
    pub fn from_password(password: &str) -> Result<Self, CodecError> {
        Self::new(KeyMaterial::derive(password), Padding::generate())
    }

    /// Compress, XOR and base64-encode a payload.
    pub fn encode(&self, plaintext: &[u8]) -> Result<Vec<u8>, CodecError> {
        codec::encode(plaintext, self.keys.shared_key())
    }

    /// Reverse of [`Framer::encode`].
    pub fn decode(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CodecError> {
        codec::decode(ciphertext, self.keys.shared_key())
    }

    /// Build the wire bytes for a payload.
    pub fn wrap(&self, payload: &[u8]) -> Result<Vec<u8>, CodecError> {
        let encoded = self.encode(payload)?;
        let (prepend, append) = self.padding.pair();

        let header = self.keys.header();
        let trailer = self.keys.trailer();
        let mut wire = Vec::with_capacity(
            prepend.len() + header.len() + encoded.len() + trailer.len() + append.len(),
        );
        wire.extend_from_slice(&prepend);
        wire.extend_from_slice(header);
        wire.extend_from_slice(&encoded);
        wire.extend_from_slice(trailer);
        wire.extend_from_slice(&append);
        Ok(wire)
    }

    /// Extract and decode the payload from a response.
    ///
    /// Returns `Ok(None)` when the markers are absent, which is the normal
    /// outcome for a target that printed unrelated output. A payload that is
    /// found but cannot be decoded is an error.
    pub fn unwrap(&self, response: &[u8]) -> Result<Option<Vec<u8>>, CodecError> {
        match self.patterns.find_payload(response) {
            Some(encoded) => self.decode(&encoded).map(Some),
            None => Ok(None),
        }
    }

    /// Collect diagnostic segments emitted by the stub.
    pub fn extract_debug(&self, response: &[u8]) -> Vec<String> {
        self.patterns.find_debug(response)
    }

    /// Get the key material.
    pub fn keys(&self) -> &KeyMaterial {
        &self.keys
    }

    /// Get the padding mode.
    pub fn padding(&self) -> &Padding {
        &self.padding
    }
}
