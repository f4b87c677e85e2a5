//! Readable-text recovery from decompressed note bodies.
//!
//! Note bodies are an undocumented binary format: prose comes first,
//! interleaved with structural bytes, followed by a trailing metadata
//! region. There is no schema to parse against, so recovery is heuristic:
//! control bytes become line breaks, each line is classified as prose or
//! garbage, and a run of consecutive garbage lines marks the start of the
//! metadata region.
//!
//! The heuristic lives behind [`TextRecovery`] so callers never depend on
//! how the text was recovered.

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Letters the body format uses as single-byte structural tags.
const MARKER_TAG_LETTERS: &str = "JRZbhjrxz";

/// Tunable constants for the line classifier.
///
/// The defaults were tuned empirically against real note bodies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionThresholds {
    /// Lines with fewer characters than this are garbage.
    pub min_line_chars: usize,
    /// Lines shorter than this use `short_line_ratio`, others `long_line_ratio`.
    pub short_line_chars: usize,
    /// Minimum printable fraction for short lines.
    pub short_line_ratio: f64,
    /// Minimum printable fraction for long lines.
    pub long_line_ratio: f64,
    /// Consecutive garbage lines that end extraction.
    pub garbage_run_limit: usize,
}

impl Default for ExtractionThresholds {
    fn default() -> Self {
        Self {
            min_line_chars: 3,
            short_line_chars: 10,
            short_line_ratio: 0.98,
            long_line_ratio: 0.90,
            garbage_run_limit: 3,
        }
    }
}

impl ExtractionThresholds {
    /// Check the invariants the line scan relies on.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        for (name, ratio) in [
            ("short_line_ratio", self.short_line_ratio),
            ("long_line_ratio", self.long_line_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ExtractionError::RatioOutOfRange { name, value: ratio });
            }
        }
        if self.garbage_run_limit == 0 {
            return Err(ExtractionError::ZeroRunLimit);
        }
        Ok(())
    }
}

/// The line classifier hit a condition it cannot work under.
#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("{name} must be within [0.0, 1.0], got {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },
    #[error("garbage_run_limit must be > 0")]
    ZeroRunLimit,
}

/// Recover readable prose from a decompressed note body.
pub trait TextRecovery: Send + Sync {
    /// Best-effort recovery. Never fails; may return an empty string.
    fn recover(&self, bytes: &[u8]) -> String;
}

/// Line-classifying recovery with a simple-pass fallback.
///
/// The binary validates `[extraction]` when the config loads, so the
/// fallback only runs for library callers that build a `HeuristicRecovery`
/// from thresholds of their own.
#[derive(Debug, Clone, Default)]
pub struct HeuristicRecovery {
    thresholds: ExtractionThresholds,
}

impl HeuristicRecovery {
    pub fn new(thresholds: ExtractionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ExtractionThresholds {
        &self.thresholds
    }
}

impl TextRecovery for HeuristicRecovery {
    fn recover(&self, bytes: &[u8]) -> String {
        match extract_readable(bytes, &self.thresholds) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "line classification failed, using simple extraction");
                simple_extract(bytes)
            }
        }
    }
}

/// Run the line-classifying scan over `bytes`.
///
/// Keeps every prose line up to the first run of `garbage_run_limit`
/// consecutive garbage lines; nothing after that run is considered.
pub fn extract_readable(
    bytes: &[u8],
    thresholds: &ExtractionThresholds,
) -> Result<String, ExtractionError> {
    thresholds.validate()?;

    let decoded = String::from_utf8_lossy(bytes);
    let normalized: String = decoded
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .map(|c| if is_field_delimiter(c) { '\n' } else { c })
        .collect();

    let mut kept: Vec<&str> = Vec::new();
    let mut garbage_run = 0usize;

    for line in normalized.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_garbage_line(line, thresholds) {
            garbage_run += 1;
            if garbage_run >= thresholds.garbage_run_limit {
                break;
            }
        } else {
            garbage_run = 0;
            kept.push(line);
        }
    }

    Ok(kept.join("\n").trim().to_string())
}

/// Strip hard control characters and collapse whitespace.
pub fn simple_extract(bytes: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(bytes);
    let cleaned: String = decoded
        .chars()
        .map(|c| {
            if c.is_control() || c == char::REPLACEMENT_CHARACTER {
                ' '
            } else {
                c
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Control bytes that separate structural fields (everything in C0 except
/// tab, line feed and carriage return).
fn is_field_delimiter(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}')
}

fn is_garbage_line(line: &str, thresholds: &ExtractionThresholds) -> bool {
    let len = line.chars().count();
    if len < thresholds.min_line_chars {
        return true;
    }
    if line.chars().all(is_marker_char) {
        return true;
    }

    let printable = line.chars().filter(|&c| is_printable(c)).count();
    let ratio = printable as f64 / len as f64;
    let required = if len < thresholds.short_line_chars {
        thresholds.short_line_ratio
    } else {
        thresholds.long_line_ratio
    };
    ratio < required
}

fn is_marker_char(c: char) -> bool {
    c == '*'
        || c.is_whitespace()
        || c.is_ascii_digit()
        || c.is_ascii_punctuation()
        || MARKER_TAG_LETTERS.contains(c)
}

/// Letters of any script count, along with the symbol and emoji blocks
/// and the combining marks that scripts such as Devanagari rely on.
fn is_printable(c: char) -> bool {
    if c.is_alphabetic() || c.is_numeric() {
        return true;
    }
    matches!(c,
        '\t'
        | '\u{20}'..='\u{7E}'
        | '\u{A0}'..='\u{24F}'
        // Combining diacritics
        | '\u{300}'..='\u{36F}'
        // Armenian, Hebrew, Arabic, Syriac
        | '\u{530}'..='\u{74F}'
        // Indic scripts through Sinhala, then Thai and Lao
        | '\u{900}'..='\u{DFF}'
        | '\u{E00}'..='\u{EFF}'
        // Georgian
        | '\u{10A0}'..='\u{10FF}'
        // General Punctuation through Dingbats
        | '\u{2000}'..='\u{27BF}'
        // Supplemental Arrows-B through Misc Symbols and Arrows
        | '\u{2900}'..='\u{2BFF}'
        // CJK punctuation
        | '\u{3000}'..='\u{303F}'
        | '\u{FE00}'..='\u{FE0F}'
        // Emoji and pictographs
        | '\u{1F000}'..='\u{1FAFF}'
    )
}
