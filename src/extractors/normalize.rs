// src/extractors/normalize.rs
use once_cell::sync::Lazy;
use regex::Regex;

use crate::acquisition::models::TextOrigin;

// Whitespace runs inside a single line.
static INLINE_WS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Failed to compile INLINE_WS_RE")
});

/// Clean one page of raw text.
///
/// Whitespace runs inside a line become a single space, every line is trimmed
/// and blank lines are dropped, so the result is one non-empty line per row of
/// text. OCR output additionally gets a few character repairs; native text is
/// left alone because it may carry real `|`, `[` and `]` characters.
pub fn normalize_page_text(text: &str, origin: TextOrigin) -> String {
    let repaired = match origin {
        TextOrigin::Ocr => repair_ocr_confusions(text),
        TextOrigin::Native => text.to_string(),
    };

    repaired
        .lines()
        .map(|line| INLINE_WS_RE.replace_all(line.trim(), " "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Character substitutions for common OCR misreads.
pub fn repair_ocr_confusions(text: &str) -> String {
    text.replace('|', "I")
        .replace('[', "(")
        .replace(']', ")")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

/// Split normalized text into trimmed, non-empty lines.
///
/// Every lookahead window in the scanner counts positions in this compacted
/// sequence, never raw line numbers.
pub fn compact_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
