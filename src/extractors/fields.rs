// src/extractors/fields.rs
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::anchor::{find_next_anchor, is_anchor_line};
use crate::extractors::config::ExtractionConfig;
use crate::extractors::records::AddressParts;
use crate::extractors::skip_rules::LineClassifier;

// State abbreviation followed by the ZIP, e.g. "TX 78701"
static STATE_ZIP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z]{2}\s*\d").expect("Failed to compile STATE_ZIP_RE")
});

// Leftovers once a label has been stripped out of a field.
const PUNCTUATION_ARTIFACTS: &[&str] = &["()", "(", ")"];

/// Address, occupation and employer resolved for one anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFields {
    pub address: Option<String>,
    pub parts: AddressParts,
    pub occupation: Option<String>,
    pub employer: Option<String>,
}

/// A city/state/ZIP line: has a comma somewhere and a two-letter state code
/// followed by a digit somewhere. The two need not appear in that order.
pub fn is_address_shape(line: &str) -> bool {
    line.contains(',') && STATE_ZIP_RE.is_match(line)
}

/// Fills in the secondary fields of a record from the lines below its anchor.
#[derive(Debug)]
pub struct FieldResolver<'c> {
    classifier: &'c LineClassifier,
    address_window: usize,
    field_window: usize,
    next_anchor_window: usize,
}

impl<'c> FieldResolver<'c> {
    pub fn new(config: &ExtractionConfig, classifier: &'c LineClassifier) -> Self {
        Self {
            classifier,
            address_window: config.address_window,
            field_window: config.field_window,
            next_anchor_window: config.next_anchor_window,
        }
    }

    pub fn resolve(&self, lines: &[&str], anchor_index: usize) -> ResolvedFields {
        let address = self.find_address(lines, anchor_index);
        let parts = address.map(AddressParts::parse).unwrap_or_default();

        let window = self.search_window(lines, anchor_index);
        let candidates = self.collect_candidates(lines, window.clone(), address);
        tracing::trace!(
            "anchor {}: window {:?}, {} candidate(s), address {:?}",
            anchor_index,
            window,
            candidates.len(),
            address
        );

        let (occupation, employer) = assign_fields(&candidates);

        ResolvedFields {
            address: address.map(str::to_string),
            parts,
            occupation: occupation.and_then(|v| self.clean_field(&v)),
            employer: employer.and_then(|v| self.clean_field(&v)),
        }
    }

    /// First address-shaped line among the few lines right after the anchor.
    fn find_address<'l>(&self, lines: &[&'l str], anchor_index: usize) -> Option<&'l str> {
        let start = anchor_index + 1;
        let end = start.saturating_add(self.address_window).min(lines.len());
        lines
            .get(start..end)?
            .iter()
            .copied()
            .find(|line| is_address_shape(line))
    }

    /// Lines that may hold occupation/employer, stopping before the next record.
    fn search_window(&self, lines: &[&str], anchor_index: usize) -> Range<usize> {
        let start = anchor_index + 1;
        let mut end = anchor_index.saturating_add(self.field_window).min(lines.len());

        if let Some(next) = find_next_anchor(lines, start, self.next_anchor_window) {
            end = end.min(next);
        }

        start..end.max(start)
    }

    fn collect_candidates<'l>(
        &self,
        lines: &[&'l str],
        window: Range<usize>,
        address: Option<&str>,
    ) -> Vec<&'l str> {
        lines
            .get(window)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|line| {
                !self.classifier.is_boilerplate(line)
                    && Some(*line) != address
                    && !is_anchor_line(line)
                    && !is_address_shape(line)
            })
            .collect()
    }

    /// Strip label text from a resolved value; `None` if nothing useful is left.
    fn clean_field(&self, value: &str) -> Option<String> {
        let stripped = self.classifier.strip_phrases(value);
        let trimmed = stripped.trim();
        if trimmed.is_empty() || PUNCTUATION_ARTIFACTS.contains(&trimmed) {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Map candidate lines onto (occupation, employer).
///
/// A lone candidate is split at its first whitespace run; with two or more the
/// first two lines are taken in order.
fn assign_fields(candidates: &[&str]) -> (Option<String>, Option<String>) {
    match candidates {
        [] => (None, None),
        [only] => match only.split_once(char::is_whitespace) {
            Some((occupation, employer)) => (
                Some(occupation.to_string()),
                Some(employer.trim_start().to_string()),
            ),
            None => (Some(only.to_string()), None),
        },
        [first, second, ..] => (Some(first.to_string()), Some(second.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(lines: &[&str], anchor_index: usize) -> ResolvedFields {
        let config = ExtractionConfig::default();
        let classifier = LineClassifier::new(&config);
        FieldResolver::new(&config, &classifier).resolve(lines, anchor_index)
    }

    #[test]
    fn test_full_record() {
        let lines = [
            "MONETARY POLITICAL CONTRIBUTIONS",
            "01/15/2023 Jane Doe $500.00",
            "Austin, TX 78701",
            "Engineer",
            "Acme Corp",
        ];
        let fields = resolve(&lines, 1);
        assert_eq!(fields.address.as_deref(), Some("Austin, TX 78701"));
        assert_eq!(fields.parts.city.as_deref(), Some("Austin"));
        assert_eq!(fields.parts.state.as_deref(), Some("TX"));
        assert_eq!(fields.parts.zip.as_deref(), Some("78701"));
        assert_eq!(fields.occupation.as_deref(), Some("Engineer"));
        assert_eq!(fields.employer.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_address_only_within_window() {
        let lines = [
            "01/15/2023 Jane Doe $500.00",
            "Retired",
            "line two",
            "line three",
            "Austin, TX 78701",
        ];
        let fields = resolve(&lines, 0);
        assert_eq!(fields.address, None);
        assert_eq!(fields.parts, AddressParts::default());
        // The out-of-window address line is still never a candidate.
        assert_eq!(fields.occupation.as_deref(), Some("Retired"));
        assert_eq!(fields.employer.as_deref(), Some("line two"));
    }

    #[test]
    fn test_single_candidate_with_whitespace_is_split() {
        let lines = ["01/15/2023 Jane Doe $500.00", "Austin, TX 78701", "Attorney  Baker Botts LLP"];
        let fields = resolve(&lines, 0);
        assert_eq!(fields.occupation.as_deref(), Some("Attorney"));
        assert_eq!(fields.employer.as_deref(), Some("Baker Botts LLP"));
    }

    #[test]
    fn test_single_candidate_without_whitespace() {
        let lines = ["01/15/2023 Jane Doe $500.00", "Austin, TX 78701", "Retired"];
        let fields = resolve(&lines, 0);
        assert_eq!(fields.occupation.as_deref(), Some("Retired"));
        assert_eq!(fields.employer, None);
    }

    #[test]
    fn test_no_candidates() {
        let lines = ["01/15/2023 Jane Doe $500.00", "Austin, TX 78701"];
        let fields = resolve(&lines, 0);
        assert_eq!(fields.occupation, None);
        assert_eq!(fields.employer, None);
    }

    #[test]
    fn test_footer_never_becomes_a_field() {
        let lines = ["01/15/2023 Jane Doe $500.00", "www.ethics.state.tx.us"];
        let fields = resolve(&lines, 0);
        assert_eq!(fields.occupation, None);
        assert_eq!(fields.employer, None);
    }

    #[test]
    fn test_window_stops_at_next_record() {
        let lines = [
            "01/15/2023 Jane Doe $500.00",
            "Austin, TX 78701",
            "Engineer",
            "01/16/2023 John Smith $100.00",
            "Dallas, TX 75201",
            "Teacher",
            "Dallas ISD",
        ];
        let fields = resolve(&lines, 0);
        assert_eq!(fields.occupation.as_deref(), Some("Engineer"));
        assert_eq!(fields.employer, None);

        let next = resolve(&lines, 3);
        assert_eq!(next.address.as_deref(), Some("Dallas, TX 75201"));
        assert_eq!(next.occupation.as_deref(), Some("Teacher"));
        assert_eq!(next.employer.as_deref(), Some("Dallas ISD"));
    }

    #[test]
    fn test_duplicate_address_and_boilerplate_excluded() {
        let lines = [
            "01/15/2023 Jane Doe $500.00",
            "Austin, TX 78701",
            "Full name of contributor",
            "Austin, TX 78701-1234",
            "3 of 12",
            "Nurse",
            "St. David's",
        ];
        let fields = resolve(&lines, 0);
        assert_eq!(fields.occupation.as_deref(), Some("Nurse"));
        assert_eq!(fields.employer.as_deref(), Some("St. David's"));
    }

    #[test]
    fn test_punctuation_artifacts_become_absent() {
        let lines = ["01/15/2023 Jane Doe $500.00", "(", "Teacher"];
        let fields = resolve(&lines, 0);
        assert_eq!(fields.occupation, None);
        assert_eq!(fields.employer.as_deref(), Some("Teacher"));
    }

    #[test]
    fn test_clean_field_strips_labels() {
        let config = ExtractionConfig::default();
        let classifier = LineClassifier::new(&config);
        let resolver = FieldResolver::new(&config, &classifier);
        assert_eq!(resolver.clean_field("Teacher (See Instructions)").as_deref(), Some("Teacher"));
        assert_eq!(resolver.clean_field("(See Instructions)"), None);
        assert_eq!(resolver.clean_field(" ) "), None);
    }

    #[test]
    fn test_field_window_upper_bound() {
        let mut lines = vec!["01/15/2023 Jane Doe $500.00"];
        lines.extend(std::iter::repeat("3.1").take(20));
        lines.push("Too Far");
        let fields = resolve(&lines, 0);
        assert_eq!(fields.occupation, None);
    }

    #[test]
    fn test_anchor_on_last_line() {
        let lines = ["Engineer", "01/15/2023 Jane Doe $500.00"];
        assert_eq!(resolve(&lines, 1), ResolvedFields::default());
    }

    #[test]
    fn test_is_address_shape() {
        assert!(is_address_shape("Austin, TX 78701"));
        assert!(is_address_shape("Austin, TX78701"));
        assert!(!is_address_shape("Austin TX 78701"));
        assert!(!is_address_shape("Smith, Jones and Partners"));
        assert!(!is_address_shape("Attorney, Partner"));
    }

    #[test]
    fn test_address_shape_comma_position_is_free() {
        assert!(is_address_shape("TX 78701 Austin,"));
        assert!(is_address_shape("PO Box 12, Suite TX9"));
    }
}
