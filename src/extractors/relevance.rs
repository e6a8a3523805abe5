// src/extractors/relevance.rs

/// A page belongs to the schedule if it carries one of the marker phrases.
///
/// Exact, case-sensitive substring test. A marker mangled by OCR means the
/// page is skipped.
pub fn is_relevant_page(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| text.contains(marker.as_str()))
}
