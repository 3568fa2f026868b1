//! Random string helpers shared by padding, tokens and cache-busting.

use rand::Rng;
use rand::seq::SliceRandom;

/// ASCII letters.
pub const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// ASCII letters and digits.
pub const ALPHANUMERIC: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Printable ASCII: digits, letters, punctuation and whitespace.
pub const PRINTABLE: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ\
!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ \t\n\r\x0b\x0c";

/// Generate `len` random bytes drawn from `charset`.
pub fn random_bytes(len: usize, charset: &[u8]) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..len)
        .filter_map(|_| charset.choose(&mut rng).copied())
        .collect()
}

/// Generate between 1 and `max_len` random bytes drawn from `charset`.
///
/// Returns an empty vector when `max_len` is zero.
pub fn random_bytes_upto(max_len: usize, charset: &[u8]) -> Vec<u8> {
    if max_len == 0 {
        return Vec::new();
    }
    let len = rand::thread_rng().gen_range(1..=max_len);
    random_bytes(len, charset)
}

/// String form of [`random_bytes_upto`] for ASCII charsets.
pub fn random_string_upto(max_len: usize, charset: &[u8]) -> String {
    String::from_utf8_lossy(&random_bytes_upto(max_len, charset)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes_from_charset() {
        let bytes = random_bytes(64, LETTERS);
        assert_eq!(bytes.len(), 64);
        assert!(bytes.iter().all(|b| b.is_ascii_alphabetic()));
    }

    #[test]
    fn test_random_string_upto_bounds() {
        for _ in 0..50 {
            let s = random_string_upto(4, LETTERS);
            assert!((1..=4).contains(&s.len()));
        }
        assert!(random_string_upto(0, LETTERS).is_empty());
    }

    #[test]
    fn test_printable_has_no_high_bytes() {
        assert!(PRINTABLE.iter().all(|b| b.is_ascii()));
        assert_eq!(PRINTABLE.len(), 100);
    }
}
