// src/extractors/anchor.rs
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::config::ExtractionConfig;
use crate::extractors::records::canonical_amount;

// <MM/DD/YYYY> <name ...> <optional $><amount with two decimals>
static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}/\d{2}/\d{4})\s+(.+?)\s*\$?(\d[\d,]*\.\d{2})\b")
        .expect("Failed to compile ANCHOR_RE")
});

// "(ID#: 12345)" fragments printed after the contributor name.
static ID_FRAGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*ID#:[^)]*\)?").expect("Failed to compile ID_FRAGMENT_RE")
});

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s{2,}").expect("Failed to compile MULTI_SPACE_RE")
});

/// The fields read directly off an anchor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMatch {
    /// Index into the compacted line sequence.
    pub index: usize,
    pub date: String,
    pub contributor_name: String,
    /// Canonical `$d,ddd.cc` form.
    pub amount: String,
}

/// True if the line has the date + amount shape that starts a record.
pub fn is_anchor_line(line: &str) -> bool {
    ANCHOR_RE.is_match(line)
}

/// Parse an anchor line; `None` if the line is not an anchor.
pub fn parse_anchor(line: &str, index: usize, max_name_chars: usize) -> Option<AnchorMatch> {
    let caps = ANCHOR_RE.captures(line)?;
    let date = caps.get(1)?.as_str().to_string();
    let raw_amount = caps.get(3)?.as_str();
    let amount = canonical_amount(raw_amount).unwrap_or_else(|| format!("${}", raw_amount));

    Some(AnchorMatch {
        index,
        date,
        contributor_name: clean_contributor_name(caps.get(2)?.as_str(), max_name_chars),
        amount,
    })
}

/// Strip `(ID#: ...)` fragments, squeeze whitespace and cap the length.
pub fn clean_contributor_name(raw: &str, max_chars: usize) -> String {
    let without_id = ID_FRAGMENT_RE.replace_all(raw, " ");
    let squeezed = MULTI_SPACE_RE.replace_all(without_id.trim(), " ");
    squeezed.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Index of the first anchor line in `lines[from .. from + window]`.
pub fn find_next_anchor(lines: &[&str], from: usize, window: usize) -> Option<usize> {
    let end = from.saturating_add(window).min(lines.len());
    (from..end).find(|&idx| is_anchor_line(lines[idx]))
}

/// Walks a page's compacted lines and yields one [`AnchorMatch`] per record.
///
/// After a record the cursor jumps to the next anchor inside the resync
/// window, or moves forward by the fallback skip when there is none.
#[derive(Debug)]
pub struct AnchorScanner<'a> {
    lines: &'a [&'a str],
    cursor: usize,
    last_anchor: Option<usize>,
    resync_window: usize,
    fallback_skip: usize,
    max_name_chars: usize,
}

impl<'a> AnchorScanner<'a> {
    pub fn new(lines: &'a [&'a str], config: &ExtractionConfig) -> Self {
        Self {
            lines,
            cursor: 0,
            last_anchor: None,
            resync_window: config.resync_window,
            fallback_skip: config.fallback_skip.max(1),
            max_name_chars: config.max_name_chars,
        }
    }

    pub fn last_anchor(&self) -> Option<usize> {
        self.last_anchor
    }
}

impl Iterator for AnchorScanner<'_> {
    type Item = AnchorMatch;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.lines.len() {
            let i = self.cursor;
            let Some(anchor) = parse_anchor(self.lines[i], i, self.max_name_chars) else {
                self.cursor += 1;
                continue;
            };

            self.last_anchor = Some(i);
            self.cursor = match find_next_anchor(self.lines, i + 1, self.resync_window) {
                Some(next) => next,
                None => i + self.fallback_skip,
            };
            tracing::trace!("anchor at line {}: {} {} {}", i, anchor.date, anchor.contributor_name, anchor.amount);
            return Some(anchor);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::config::ExtractionConfigBuilder;

    #[test]
    fn test_parse_anchor_basic() {
        let m = parse_anchor("01/15/2023 Jane Doe $500.00", 4, 100).unwrap();
        assert_eq!(m.index, 4);
        assert_eq!(m.date, "01/15/2023");
        assert_eq!(m.contributor_name, "Jane Doe");
        assert_eq!(m.amount, "$500.00");
    }

    #[test]
    fn test_parse_anchor_without_currency_symbol() {
        let m = parse_anchor("02/01/2023 John Smith 1,250.00", 0, 100).unwrap();
        assert_eq!(m.contributor_name, "John Smith");
        assert_eq!(m.amount, "$1,250.00");

        let m = parse_anchor("02/01/2023 John Smith 2500.00", 0, 100).unwrap();
        assert_eq!(m.amount, "$2,500.00");
    }

    #[test]
    fn test_amount_always_canonical() {
        for line in [
            "03/03/2023 A $1.00",
            "03/03/2023 B 10.50",
            "03/03/2023 C $1,000,000.99",
            "03/03/2023 D 999999.01",
        ] {
            let m = parse_anchor(line, 0, 100).unwrap();
            assert!(m.amount.starts_with('$'), "{}", m.amount);
            let (_, cents) = m.amount.split_once('.').unwrap();
            assert_eq!(cents.len(), 2, "{}", m.amount);
        }
    }

    #[test]
    fn test_id_fragment_stripped() {
        let m = parse_anchor("04/10/2023 Jane Doe (ID#: 00012345) $75.00", 0, 100).unwrap();
        assert_eq!(m.contributor_name, "Jane Doe");

        let m = parse_anchor("04/10/2023 (ID#: 77) Acme PAC 75.00", 0, 100).unwrap();
        assert_eq!(m.contributor_name, "Acme PAC");
    }

    #[test]
    fn test_name_capped() {
        let long = format!("05/05/2023 {} $10.00", "x".repeat(150));
        let m = parse_anchor(&long, 0, 100).unwrap();
        assert_eq!(m.contributor_name.chars().count(), 100);
    }

    #[test]
    fn test_non_anchor_lines() {
        assert!(parse_anchor("Austin, TX 78701", 0, 100).is_none());
        assert!(parse_anchor("01/15/2023 no amount here", 0, 100).is_none());
        assert!(parse_anchor("Jane Doe $500.00", 0, 100).is_none());
        assert!(parse_anchor("1/5/2023 Jane $5.00", 0, 100).is_none());
    }

    #[test]
    fn test_find_next_anchor_window() {
        let lines = vec![
            "01/01/2023 A $1.00",
            "x",
            "y",
            "01/02/2023 B $2.00",
        ];
        assert_eq!(find_next_anchor(&lines, 1, 10), Some(3));
        assert_eq!(find_next_anchor(&lines, 1, 2), None);
        assert_eq!(find_next_anchor(&lines, 4, 10), None);
        assert_eq!(find_next_anchor(&lines, 0, usize::MAX), Some(0));
    }

    #[test]
    fn test_scanner_yields_every_anchor() {
        let lines = vec![
            "MONETARY POLITICAL CONTRIBUTIONS",
            "01/01/2023 A $1.00",
            "Austin, TX 78701",
            "01/02/2023 B $2.00",
            "Dallas, TX 75201",
            "Teacher",
        ];
        let config = ExtractionConfig::default();
        let mut scanner = AnchorScanner::new(&lines, &config);
        let found: Vec<usize> = scanner.by_ref().map(|a| a.index).collect();
        assert_eq!(found, vec![1, 3]);
        assert_eq!(scanner.last_anchor(), Some(3));
    }

    #[test]
    fn test_scanner_finds_anchor_beyond_resync_window() {
        let mut lines = vec!["01/01/2023 A $1.00"];
        lines.extend(std::iter::repeat("filler").take(12));
        lines.push("01/02/2023 B $2.00");
        let config = ExtractionConfigBuilder::new().resync_window(10).build().unwrap();
        let found: Vec<usize> = AnchorScanner::new(&lines, &config).map(|a| a.index).collect();
        assert_eq!(found, vec![0, 13]);
    }

    #[test]
    fn test_scanner_no_anchors() {
        let lines = vec!["Engineer", "Acme Corp", "Austin, TX 78701"];
        let config = ExtractionConfig::default();
        assert_eq!(AnchorScanner::new(&lines, &config).count(), 0);
    }
}
