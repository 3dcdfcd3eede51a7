//! Payload encoding for data embedded in generated artifacts:
//! gzip, then standard base64.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use crate::error::Result;

/// Gzip `data` and encode it as base64.
pub fn compress(data: &[u8]) -> Result<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

/// Serialize `value` as JSON and [`compress`] it.
pub fn compress_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    compress(&serde_json::to_vec(value)?)
}

/// Inverse of [`compress`].
pub fn decompress(encoded: &str) -> Result<Vec<u8>> {
    let compressed = STANDARD.decode(encoded.trim())?;
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RulesError;

    #[test]
    fn compress_then_decompress() {
        let text = b"LET X = 1\nLET Y = 2\n";
        let encoded = compress(text).unwrap();
        assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric() || "+/=".contains(c)));
        assert_eq!(decompress(&encoded).unwrap(), text);
    }

    #[test]
    fn empty_input_still_produces_a_gzip_stream() {
        let encoded = compress(b"").unwrap();
        assert!(!encoded.is_empty());
        assert!(decompress(&encoded).unwrap().is_empty());
    }

    #[test]
    fn invalid_base64_is_an_error() {
        assert!(matches!(decompress("not base64!"), Err(RulesError::Base64(_))));
    }
}
