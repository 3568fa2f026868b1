//! Camouflage padding around framed payloads.

use std::borrow::Cow;

use crate::random::{PRINTABLE, random_bytes, random_bytes_upto};

/// Default padding length in bytes.
pub const DEFAULT_PADDING_LEN: usize = 16;

/// Random printable noise placed before the header and after the trailer.
///
/// Padding carries no information; the peer locates the payload through the
/// markers alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Padding {
    /// One pair generated when the channel is created and reused for every
    /// request on that channel.
    Fixed { prepend: Vec<u8>, append: Vec<u8> },

    /// A fresh pair for every request, each of random length in `1..=max_len`.
    PerCall { max_len: usize },
}

impl Padding {
    /// Generate a fixed pair of [`DEFAULT_PADDING_LEN`] printable bytes.
    pub fn generate() -> Self {
        Self::Fixed {
            prepend: random_bytes(DEFAULT_PADDING_LEN, PRINTABLE),
            append: random_bytes(DEFAULT_PADDING_LEN, PRINTABLE),
        }
    }

    /// Regenerate padding on every request.
    pub fn per_call() -> Self {
        Self::PerCall {
            max_len: DEFAULT_PADDING_LEN,
        }
    }

    /// Padding for the next message as `(prepend, append)`.
    pub fn pair(&self) -> (Cow<'_, [u8]>, Cow<'_, [u8]>) {
        match self {
            Self::Fixed { prepend, append } => {
                (Cow::Borrowed(prepend.as_slice()), Cow::Borrowed(append.as_slice()))
            }
            Self::PerCall { max_len } => (
                Cow::Owned(random_bytes_upto(*max_len, PRINTABLE)),
                Cow::Owned(random_bytes_upto(*max_len, PRINTABLE)),
            ),
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_padding_is_stable() {
        let padding = Padding::generate();
        let (a1, b1) = padding.pair();
        let (a2, b2) = padding.pair();
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
        assert_eq!(a1.len(), DEFAULT_PADDING_LEN);
    }

    #[test]
    fn test_per_call_lengths() {
        let padding = Padding::PerCall { max_len: 8 };
        for _ in 0..50 {
            let (a, b) = padding.pair();
            assert!((1..=8).contains(&a.len()));
            assert!((1..=8).contains(&b.len()));
            assert!(a.iter().all(|c| PRINTABLE.contains(c)));
        }
    }

    #[test]
    fn test_zero_length_per_call() {
        let (a, b) = Padding::PerCall { max_len: 0 }.pair();
        assert!(a.is_empty() && b.is_empty());
    }
}
