//! Note body decoding.
//!
//! Bodies arrive from the note store as optional byte blobs. Gzip-framed
//! blobs are inflated and handed to a [`TextRecovery`]; anything else is
//! treated as plain text. Decoding is best-effort: a corrupt body yields an
//! empty string so one unreadable note never blocks the rest of an index
//! pass.

use std::io::Read;

use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::warn;

use crate::extract::TextRecovery;

/// Leading bytes of a gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// A gzip-framed body could not be inflated.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("gzip stream is corrupt or truncated: {0}")]
    Decompress(#[from] std::io::Error),
}

/// Returns true when `bytes` starts with the gzip magic number.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Inflate a complete gzip buffer.
pub fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

/// Decode an optional note body into readable text.
///
/// Never fails: a missing body is `""`, a corrupt gzip stream is logged
/// and also becomes `""`, and invalid UTF-8 is replaced lossily. Control
/// characters in plain bodies become line breaks.
pub fn decode_content(content: Option<&[u8]>, recovery: &dyn TextRecovery) -> String {
    let Some(bytes) = content else {
        return String::new();
    };

    if is_gzip(bytes) {
        match gunzip(bytes) {
            Ok(inflated) => recovery.recover(&inflated),
            Err(e) => {
                warn!(error = %e, bytes = bytes.len(), "failed to decode note body");
                String::new()
            }
        }
    } else {
        let text: String = String::from_utf8_lossy(bytes)
            .chars()
            .map(|c| if is_hard_control(c) { '\n' } else { c })
            .collect();
        text.trim().to_string()
    }
}

/// Control characters other than tab and line feed.
fn is_hard_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::HeuristicRecovery;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_absent_content_is_empty() {
        let recovery = HeuristicRecovery::default();
        assert_eq!(decode_content(None, &recovery), "");
    }

    #[test]
    fn test_gzip_roundtrip_bytes() {
        let original = b"Shopping list\nApples and oranges";
        let compressed = gzip(original);
        assert!(is_gzip(&compressed));
        assert_eq!(gunzip(&compressed).unwrap(), original.to_vec());
    }

    #[test]
    fn test_gzip_content_goes_through_recovery() {
        let mut body = b"\x08\x00\x12Trip to Lisbon\x1a".to_vec();
        body.extend_from_slice(b"Pack sunscreen and a hat.\x00\x02ab\x03xy\x04zz\x05");
        body.extend_from_slice(b"trailing metadata region");
        let recovery = HeuristicRecovery::default();
        let text = decode_content(Some(&gzip(&body)), &recovery);
        assert_eq!(text, "Trip to Lisbon\nPack sunscreen and a hat.");
    }

    #[test]
    fn test_plain_buffer_passes_through() {
        let recovery = HeuristicRecovery::default();
        let text = decode_content(Some(b"  just plain text \n"), &recovery);
        assert_eq!(text, "just plain text");
    }

    #[test]
    fn test_plain_buffer_control_bytes_become_line_breaks() {
        let recovery = HeuristicRecovery::default();
        let text = decode_content(Some(b"abc\x00def\x07ghi\r\n\x7f"), &recovery);
        assert_eq!(text, "abc\ndef\nghi");
        assert!(!text.chars().any(|c| c.is_control() && c != '\n'));
    }

    #[test]
    fn test_plain_buffer_lossy() {
        let recovery = HeuristicRecovery::default();
        let text = decode_content(Some(b"caf\xe9"), &recovery);
        assert_eq!(text, "caf\u{FFFD}");
    }

    #[test]
    fn test_corrupt_gzip_is_empty() {
        let recovery = HeuristicRecovery::default();
        let corrupt = [0x1F, 0x8B, 0x08, 0x00, 0xde, 0xad, 0xbe, 0xef];
        assert_eq!(decode_content(Some(&corrupt), &recovery), "");
    }

    #[test]
    fn test_truncated_gzip_is_empty() {
        let recovery = HeuristicRecovery::default();
        let full = gzip(b"A note long enough that truncation cuts the deflate stream.");
        let truncated = &full[..full.len() / 2];
        assert_eq!(decode_content(Some(truncated), &recovery), "");
    }

    #[test]
    fn test_single_byte_is_not_gzip() {
        assert!(!is_gzip(&[0x1F]));
    }
}
