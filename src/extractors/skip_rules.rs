// src/extractors/skip_rules.rs
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::config::ExtractionConfig;

// Bare decimal page marker such as "3.1"
static PAGE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\.\d+$").expect("Failed to compile PAGE_MARKER_RE")
});

// Report tracking stamp: "Sch: 1/3 Rpt: 4/12"
static REPORT_TRACKING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Sch:.*Rpt:").expect("Failed to compile REPORT_TRACKING_RE")
});

// Page counter: "2 of 7"
static PAGE_COUNTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\d+\s+of\s+\d+$").expect("Failed to compile PAGE_COUNTER_RE")
});

/// Recognizes form boilerplate that must never be captured as a field value.
///
/// Header and footer vocabulary lives here and nowhere else; the field
/// resolver also uses [`LineClassifier::strip_phrases`] for its final cleanup.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    header_phrases: Vec<String>,
    footer_phrases: Vec<String>,
    footer_phrases_lower: Vec<String>,
}

impl LineClassifier {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            header_phrases: config.header_phrases.clone(),
            footer_phrases: config.footer_phrases.clone(),
            footer_phrases_lower: config
                .footer_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    pub fn is_boilerplate(&self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }

        let lower = line.to_lowercase();
        if self.footer_phrases_lower.iter().any(|p| lower.contains(p.as_str())) {
            tracing::trace!("footer line: '{}'", line);
            return true;
        }

        if self.header_phrases.iter().any(|p| line.contains(p.as_str())) {
            tracing::trace!("header line: '{}'", line);
            return true;
        }

        PAGE_MARKER_RE.is_match(line)
            || REPORT_TRACKING_RE.is_match(line)
            || PAGE_COUNTER_RE.is_match(line)
    }

    /// Remove every header and footer phrase from `value` as a literal substring.
    pub fn strip_phrases(&self, value: &str) -> String {
        let mut out = value.to_string();
        for phrase in self.header_phrases.iter().chain(&self.footer_phrases) {
            if out.contains(phrase.as_str()) {
                out = out.replace(phrase.as_str(), "");
            }
        }
        out
    }
}
