//! Payload obfuscation: zlib, cyclic XOR and unpadded base64.

use std::io::{Read, Write};

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::CodecError;

/// Standard alphabet, never emits `=` and accepts input with or without it.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// XOR `data` in place against `key`, repeating the key as needed.
pub fn xor_cycle(data: &mut [u8], key: &[u8]) {
    if key.is_empty() {
        return;
    }
    for (byte, k) in data.iter_mut().zip(key.iter().cycle()) {
        *byte ^= k;
    }
}

/// Compress, XOR and base64-encode a payload.
pub fn encode(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(plaintext).map_err(CodecError::Compress)?;
    let mut compressed = encoder.finish().map_err(CodecError::Compress)?;

    xor_cycle(&mut compressed, key);

    Ok(BASE64.encode(&compressed).into_bytes())
}

/// Reverse of [`encode`].
///
/// ASCII whitespace inside the encoded text is ignored, since stubs and
/// intermediaries sometimes wrap long output lines.
pub fn decode(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CodecError> {
    let cleaned: Vec<u8> = ciphertext
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    let mut xored = BASE64.decode(&cleaned)?;
    xor_cycle(&mut xored, key);

    let mut plaintext = Vec::new();
    ZlibDecoder::new(xored.as_slice())
        .read_to_end(&mut plaintext)
        .map_err(CodecError::Decompress)?;

    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const KEY: &[u8] = b"2ab96390";

    #[test]
    fn test_xor_cycle_repeats_key() {
        let mut data = *b"abc";
        xor_cycle(&mut data, b"def");
        assert_eq!(data, [0x05, 0x07, 0x05]);

        let mut data = vec![0u8; 5];
        xor_cycle(&mut data, b"ab");
        assert_eq!(data, b"ababa");
    }

    #[test]
    fn test_encode_strips_padding() {
        for len in 0..16 {
            let encoded = encode(&vec![b'x'; len], KEY).unwrap();
            assert!(!encoded.ends_with(b"="));
        }
    }

    #[test]
    fn test_decode_accepts_padded_input() {
        let mut encoded = encode(b"id", KEY).unwrap();
        while encoded.len() % 4 != 0 {
            encoded.push(b'=');
        }
        assert_eq!(decode(&encoded, KEY).unwrap(), b"id");
    }

    #[test]
    fn test_decode_ignores_whitespace() {
        let encoded = encode(b"uid=33(www-data)", KEY).unwrap();
        let mut wrapped = Vec::new();
        for chunk in encoded.chunks(5) {
            wrapped.extend_from_slice(chunk);
            wrapped.extend_from_slice(b"\r\n");
        }
        assert_eq!(decode(&wrapped, KEY).unwrap(), b"uid=33(www-data)");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode(b"!!not base64!!", KEY).unwrap_err();
        assert!(matches!(err, CodecError::Base64(_)));
    }

    #[test]
    fn test_decode_wrong_key_fails_decompression() {
        let encoded = encode(b"some output", KEY).unwrap();
        let err = decode(&encoded, b"ffffffff").unwrap_err();
        assert!(matches!(err, CodecError::Decompress(_)));
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let encoded = encode(&data, KEY).unwrap();
            prop_assert_eq!(decode(&encoded, KEY).unwrap(), data);
        }
    }
}
