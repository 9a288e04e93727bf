//! Shareable links: source text compressed with zstd and packed into
//! URL-safe base64 without padding.

use std::io::Read;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::settings::MAX_SOURCE_BYTES;

const LEVEL: i32 = 19;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("compression failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("decoded source exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("decoded source is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn encode(source: &str) -> Result<String, CodecError> {
    let compressed = zstd::encode_all(source.as_bytes(), LEVEL)?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

pub fn try_decode(encoded: &str) -> Result<String, CodecError> {
    let compressed = URL_SAFE_NO_PAD.decode(encoded.trim())?;
    let decoder = zstd::stream::read::Decoder::new(compressed.as_slice())?;

    let mut bytes = Vec::new();
    decoder
        .take(MAX_SOURCE_BYTES as u64 + 1)
        .read_to_end(&mut bytes)?;
    if bytes.len() > MAX_SOURCE_BYTES {
        return Err(CodecError::TooLarge {
            limit: MAX_SOURCE_BYTES,
        });
    }
    Ok(String::from_utf8(bytes)?)
}

/// Decode a shared link, falling back to `default` when it is unusable.
pub fn decode(encoded: &str, default: &str) -> String {
    match try_decode(encoded) {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!("graph_lens: cannot decode shared source ({}), using default", e);
            default.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "digraph G {\n  \"a b\" -> c;\n  c -> d [label=\"é\"];\n}\n";

    #[test]
    fn test_encode_decode() {
        let encoded = encode(SOURCE).unwrap();
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(try_decode(&encoded).unwrap(), SOURCE);
    }

    #[test]
    fn test_garbage_falls_back() {
        assert_eq!(decode("!!not base64!!", "digraph {}"), "digraph {}");
        // valid base64, not a zstd frame
        assert_eq!(decode("aGVsbG8", "fallback"), "fallback");
        assert!(matches!(try_decode("%%%"), Err(CodecError::Base64(_))));
    }

    #[test]
    fn test_empty_source() {
        let encoded = encode("").unwrap();
        assert_eq!(decode(&encoded, "fallback"), "");
    }

    #[test]
    fn test_non_utf8_payload_rejected() {
        let compressed = zstd::encode_all(&[0xff, 0xfe, 0x00][..], 3).unwrap();
        let encoded = URL_SAFE_NO_PAD.encode(compressed);
        assert!(matches!(try_decode(&encoded), Err(CodecError::Utf8(_))));
        assert_eq!(decode(&encoded, "fallback"), "fallback");
    }
}
