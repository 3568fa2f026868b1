//! Key material derived from the channel password.

use std::fmt;
use std::fmt::Write as _;

use md5::{Digest, Md5};

/// Length of the XOR key in bytes.
pub const SHARED_KEY_LEN: usize = 8;

/// Length of each framing marker in bytes.
pub const MARKER_LEN: usize = 12;

/// Shared obfuscation key and framing markers for one password.
///
/// Both ends derive the same values from the password, so no handshake is
/// needed. This is an obfuscation token, not a cryptographic key: anyone who
/// knows the password (or can guess it) computes the same bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    shared_key: [u8; SHARED_KEY_LEN],
    header: [u8; MARKER_LEN],
    trailer: [u8; MARKER_LEN],
}

impl KeyMaterial {
    /// Derive key material from a password.
    ///
    /// The lowercase hex MD5 digest of the password is sliced into
    /// `[0..8]` (shared key), `[8..20]` (header) and `[20..32]` (trailer).
    pub fn derive(password: &str) -> Self {
        let digest = Md5::digest(password.as_bytes());
        let mut hex = String::with_capacity(32);
        for byte in digest.iter() {
            // Writing to a String cannot fail
            let _ = write!(hex, "{byte:02x}");
        }
        let hex = hex.as_bytes();

        let mut shared_key = [0u8; SHARED_KEY_LEN];
        let mut header = [0u8; MARKER_LEN];
        let mut trailer = [0u8; MARKER_LEN];
        shared_key.copy_from_slice(&hex[0..8]);
        header.copy_from_slice(&hex[8..20]);
        trailer.copy_from_slice(&hex[20..32]);

        Self {
            shared_key,
            header,
            trailer,
        }
    }

    /// The XOR key.
    pub fn shared_key(&self) -> &[u8] {
        &self.shared_key
    }

    /// Marker preceding the encoded payload.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Marker following the encoded payload.
    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("shared_key", &"<redacted>")
            .field("header", &String::from_utf8_lossy(&self.header))
            .field("trailer", &String::from_utf8_lossy(&self.trailer))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_known_password() {
        // md5("hunter2") = 2ab96390c7dbe3439de74d0c9b0b1767
        let keys = KeyMaterial::derive("hunter2");
        assert_eq!(keys.shared_key(), b"2ab96390");
        assert_eq!(keys.header(), b"c7dbe3439de7");
        assert_eq!(keys.trailer(), b"4d0c9b0b1767");
    }

    #[test]
    fn test_derive_is_deterministic() {
        assert_eq!(KeyMaterial::derive("secret"), KeyMaterial::derive("secret"));
        assert_ne!(KeyMaterial::derive("secret"), KeyMaterial::derive("Secret"));
    }

    #[test]
    fn test_markers_are_distinct() {
        let keys = KeyMaterial::derive("hunter2");
        assert_ne!(keys.header(), keys.trailer());
        assert_eq!(keys.header().len(), MARKER_LEN);
        assert_eq!(keys.trailer().len(), MARKER_LEN);
    }

    #[test]
    fn test_debug_hides_shared_key() {
        let keys = KeyMaterial::derive("hunter2");
        let debug = format!("{:?}", keys);
        assert!(!debug.contains("2ab96390"));
        assert!(debug.contains("c7dbe3439de7"));
    }
}
