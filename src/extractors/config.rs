// src/extractors/config.rs
use crate::utils::error::ExtractError;

/// Section title keywords identifying a Schedule A1 page.
pub const DEFAULT_SECTION_MARKERS: &[&str] = &["MONETARY POLITICAL CONTRIBUTIONS"];

/// Column headings, instructions and form labels. Matched case-sensitively.
pub const DEFAULT_HEADER_PHRASES: &[&str] = &[
    "MONETARY POLITICAL CONTRIBUTIONS",
    "SCHEDULE A1",
    "Full name of contributor",
    "Contributor address",
    "Amount of contribution ($)",
    "Principal occupation / Job title",
    "Employer (See Instructions)",
    "Contributor's principal occupation",
    "out-of-state committee",
    "Use Instruction Guide",
    "FILER NAME",
    "Filer ID (Ethics Commission Filers)",
    "TOTAL PAGES SCHEDULE A1",
    "(See Instructions)",
];

/// Page footers and attribution lines. Matched case-insensitively.
pub const DEFAULT_FOOTER_PHRASES: &[&str] = &[
    "www.ethics.state.tx.us",
    "Forms provided by Texas Ethics Commission",
    "Texas Ethics Commission",
    "Version V1.",
];

/// Controls how a list of phrases is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }

    fn push(&mut self, value: T) {
        match self {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(value),
            ListOverride::Default => *self = ListOverride::Extend(vec![value]),
        }
    }
}

/// Tunables for the record extraction engine.
///
/// Phrase lists are resolved against the built-in defaults when the config is
/// built, so every consumer sees the same vocabulary.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub(crate) section_markers: Vec<String>,
    pub(crate) header_phrases: Vec<String>,
    pub(crate) footer_phrases: Vec<String>,
    /// Lines after an anchor searched for the city/state/ZIP line.
    pub(crate) address_window: usize,
    /// Upper bound (relative to the anchor) of the occupation/employer window.
    pub(crate) field_window: usize,
    /// How far ahead to look for the next record when narrowing the field window.
    pub(crate) next_anchor_window: usize,
    /// How far ahead the scanner looks to resynchronise on the next anchor.
    pub(crate) resync_window: usize,
    /// Cursor advance after a record when no nearby anchor was found.
    pub(crate) fallback_skip: usize,
    pub(crate) max_name_chars: usize,
    /// Native text shorter than this (non-whitespace chars) triggers OCR in auto mode.
    pub(crate) min_text_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            section_markers: owned(DEFAULT_SECTION_MARKERS),
            header_phrases: owned(DEFAULT_HEADER_PHRASES),
            footer_phrases: owned(DEFAULT_FOOTER_PHRASES),
            address_window: 3,
            field_window: 15,
            next_anchor_window: 20,
            resync_window: 10,
            fallback_skip: 1,
            max_name_chars: 100,
            min_text_chars: 50,
        }
    }
}

impl ExtractionConfig {
    pub fn min_text_chars(&self) -> usize {
        self.min_text_chars
    }

    pub fn section_markers(&self) -> &[String] {
        &self.section_markers
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    section_markers: ListOverride<String>,
    header_phrases: ListOverride<String>,
    footer_phrases: ListOverride<String>,
    address_window: Option<usize>,
    field_window: Option<usize>,
    next_anchor_window: Option<usize>,
    resync_window: Option<usize>,
    fallback_skip: Option<usize>,
    max_name_chars: Option<usize>,
    min_text_chars: Option<usize>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Phrase lists ──

    pub fn set_section_markers(mut self, markers: Vec<String>) -> Self {
        self.section_markers = ListOverride::Replace(markers);
        self
    }

    pub fn add_section_marker(mut self, marker: String) -> Self {
        self.section_markers.push(marker);
        self
    }

    pub fn set_header_phrases(mut self, phrases: Vec<String>) -> Self {
        self.header_phrases = ListOverride::Replace(phrases);
        self
    }

    pub fn add_header_phrase(mut self, phrase: String) -> Self {
        self.header_phrases.push(phrase);
        self
    }

    pub fn set_footer_phrases(mut self, phrases: Vec<String>) -> Self {
        self.footer_phrases = ListOverride::Replace(phrases);
        self
    }

    pub fn add_footer_phrase(mut self, phrase: String) -> Self {
        self.footer_phrases.push(phrase);
        self
    }

    // ── Windows ──

    pub fn address_window(mut self, lines: usize) -> Self {
        self.address_window = Some(lines);
        self
    }

    pub fn field_window(mut self, lines: usize) -> Self {
        self.field_window = Some(lines);
        self
    }

    pub fn next_anchor_window(mut self, lines: usize) -> Self {
        self.next_anchor_window = Some(lines);
        self
    }

    pub fn resync_window(mut self, lines: usize) -> Self {
        self.resync_window = Some(lines);
        self
    }

    pub fn fallback_skip(mut self, lines: usize) -> Self {
        self.fallback_skip = Some(lines);
        self
    }

    // ── Limits ──

    pub fn max_name_chars(mut self, chars: usize) -> Self {
        self.max_name_chars = Some(chars);
        self
    }

    pub fn min_text_chars(mut self, chars: usize) -> Self {
        self.min_text_chars = Some(chars);
        self
    }

    /// Resolve phrase lists and validate the window sizes.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let defaults = ExtractionConfig::default();

        let config = ExtractionConfig {
            section_markers: clean_phrases(self.section_markers.resolve(&defaults.section_markers)),
            header_phrases: clean_phrases(self.header_phrases.resolve(&defaults.header_phrases)),
            footer_phrases: clean_phrases(self.footer_phrases.resolve(&defaults.footer_phrases)),
            address_window: self.address_window.unwrap_or(defaults.address_window),
            field_window: self.field_window.unwrap_or(defaults.field_window),
            next_anchor_window: self.next_anchor_window.unwrap_or(defaults.next_anchor_window),
            resync_window: self.resync_window.unwrap_or(defaults.resync_window),
            fallback_skip: self.fallback_skip.unwrap_or(defaults.fallback_skip),
            max_name_chars: self.max_name_chars.unwrap_or(defaults.max_name_chars),
            min_text_chars: self.min_text_chars.unwrap_or(defaults.min_text_chars),
        };

        if config.section_markers.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "at least one section marker phrase is required".to_string(),
            ));
        }

        for (name, value) in [
            ("address_window", config.address_window),
            ("field_window", config.field_window),
            ("next_anchor_window", config.next_anchor_window),
            ("resync_window", config.resync_window),
            ("fallback_skip", config.fallback_skip),
            ("max_name_chars", config.max_name_chars),
        ] {
            if value == 0 {
                return Err(ExtractError::InvalidConfig(format!("{} must be greater than 0", name)));
            }
        }

        Ok(config)
    }
}

/// Empty phrases would match every line, so they are dropped.
fn clean_phrases(phrases: Vec<String>) -> Vec<String> {
    phrases
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default() {
        let built = ExtractionConfigBuilder::new().build().unwrap();
        let default = ExtractionConfig::default();
        assert_eq!(built.section_markers, default.section_markers);
        assert_eq!(built.address_window, 3);
        assert_eq!(built.field_window, 15);
        assert_eq!(built.next_anchor_window, 20);
        assert_eq!(built.resync_window, 10);
        assert_eq!(built.fallback_skip, 1);
        assert_eq!(built.min_text_chars, 50);
    }

    #[test]
    fn test_extend_keeps_defaults() {
        let config = ExtractionConfigBuilder::new()
            .add_footer_phrase("Printed by FilerSoft".to_string())
            .build()
            .unwrap();
        assert!(config.footer_phrases.iter().any(|p| p == "www.ethics.state.tx.us"));
        assert!(config.footer_phrases.iter().any(|p| p == "Printed by FilerSoft"));
    }

    #[test]
    fn test_replace_drops_defaults_and_blank_entries() {
        let config = ExtractionConfigBuilder::new()
            .set_section_markers(vec!["SCHEDULE B".to_string(), "  ".to_string()])
            .build()
            .unwrap();
        assert_eq!(config.section_markers, vec!["SCHEDULE B".to_string()]);
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = ExtractionConfigBuilder::new().resync_window(0).build().unwrap_err();
        assert!(err.to_string().contains("resync_window"));
    }

    #[test]
    fn test_empty_markers_rejected() {
        let result = ExtractionConfigBuilder::new().set_section_markers(vec![]).build();
        assert!(matches!(result, Err(ExtractError::InvalidConfig(_))));
    }
}
