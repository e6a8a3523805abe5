// src/extractors/pipeline.rs
use std::path::PathBuf;

use serde::Serialize;

use crate::acquisition::models::{PageText, PageTextSource, TextOrigin};
use crate::extractors::aggregate::finalize_records;
use crate::extractors::anchor::AnchorScanner;
use crate::extractors::config::ExtractionConfig;
use crate::extractors::dedup::dedupe_records;
use crate::extractors::fields::FieldResolver;
use crate::extractors::normalize::{compact_lines, normalize_page_text};
use crate::extractors::records::{ContributionRecord, PageRecord};
use crate::extractors::relevance::is_relevant_page;
use crate::extractors::skip_rules::LineClassifier;
use crate::utils::error::ExtractError;
use crate::utils::page_debug;

/// Result of a whole-document run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Final, deduplicated and ordered records (possibly empty).
    Records(Vec<ContributionRecord>),
    /// Pages had text but none carried the section marker.
    NoRelevantPages,
    /// No page yielded any text.
    NoExtractableText,
}

impl ExtractionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ExtractionOutcome::Records(_) => "records",
            ExtractionOutcome::NoRelevantPages => "no_relevant_pages",
            ExtractionOutcome::NoExtractableText => "no_extractable_text",
        }
    }

    pub fn records(&self) -> &[ContributionRecord] {
        match self {
            ExtractionOutcome::Records(records) => records,
            _ => &[],
        }
    }
}

/// Page and record counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub pages_total: usize,
    pub pages_with_text: usize,
    pub pages_ocr: usize,
    pub pages_relevant: usize,
    pub pages_empty: usize,
    pub pages_failed: usize,
    pub records_found: usize,
    pub records_kept: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub outcome: ExtractionOutcome,
    pub stats: ExtractionStats,
}

/// Turns page text into contribution records.
pub struct ContributionExtractor {
    config: ExtractionConfig,
    classifier: LineClassifier,
    debug_dir: Option<PathBuf>,
}

impl ContributionExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let classifier = LineClassifier::new(&config);
        Self { config, classifier, debug_dir: None }
    }

    /// Write an annotated line trace for every relevant page into `dir`.
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// Records on one page, or `None` when the page is not part of the schedule.
    pub fn extract_page(&self, page: &PageText) -> Option<Vec<PageRecord>> {
        let normalized = normalize_page_text(&page.text, page.origin);
        if !is_relevant_page(&normalized, &self.config.section_markers) {
            tracing::debug!("Page {}: no section marker, skipping", page.page_number);
            return None;
        }

        let lines = compact_lines(&normalized);
        if let Some(dir) = &self.debug_dir {
            let path = dir.join(format!("page_{}.txt", page.page_number));
            if let Err(e) = page_debug::write_page_trace(&path, &lines, &self.classifier) {
                tracing::warn!("Failed to write page trace {}: {}", path.display(), e);
            }
        }

        let records = self.extract_from_lines(&lines, page.page_number);
        tracing::debug!("Page {}: {} record(s) from {} lines", page.page_number, records.len(), lines.len());
        Some(records)
    }

    /// Scan compacted lines, building one record per anchor.
    pub fn extract_from_lines(&self, lines: &[&str], page_number: usize) -> Vec<PageRecord> {
        let resolver = FieldResolver::new(&self.config, &self.classifier);

        let mut scanner = AnchorScanner::new(lines, &self.config);
        let records: Vec<PageRecord> = scanner
            .by_ref()
            .map(|anchor| {
                let fields = resolver.resolve(lines, anchor.index);
                PageRecord {
                    source_page: page_number,
                    record: ContributionRecord {
                        date: anchor.date,
                        contributor_name: anchor.contributor_name,
                        address: fields.address,
                        city: fields.parts.city,
                        state: fields.parts.state,
                        zip: fields.parts.zip,
                        occupation: fields.occupation,
                        employer: fields.employer,
                        amount: anchor.amount,
                    },
                }
            })
            .collect();

        if let Some(last) = scanner.last_anchor() {
            tracing::trace!("Page {}: last anchor at line {} of {}", page_number, last, lines.len());
        }
        records
    }

    /// Visit every page in order, then deduplicate and order the records.
    ///
    /// A page that cannot be read is skipped. Failing to learn the page count
    /// means the document itself is unreadable and is returned as an error.
    pub fn extract_document(&self, source: &dyn PageTextSource) -> Result<ExtractionReport, ExtractError> {
        let page_count = source.page_count()?;
        tracing::info!("Document has {} page(s)", page_count);

        let mut stats = ExtractionStats {
            pages_total: page_count,
            ..ExtractionStats::default()
        };
        let mut collected: Vec<PageRecord> = Vec::new();

        for page_index in 0..page_count {
            tracing::info!("Processing page {}/{}", page_index + 1, page_count);

            let page = match source.page_text(page_index) {
                Ok(Some(page)) if !page.text.trim().is_empty() => page,
                Ok(_) => {
                    tracing::warn!("Page {}: no text extracted, skipping", page_index + 1);
                    stats.pages_empty += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Page {}: text acquisition failed, skipping: {}", page_index + 1, e);
                    stats.pages_failed += 1;
                    continue;
                }
            };

            stats.pages_with_text += 1;
            if page.origin == TextOrigin::Ocr {
                stats.pages_ocr += 1;
            }

            if let Some(records) = self.extract_page(&page) {
                stats.pages_relevant += 1;
                collected.extend(records);
            }
        }

        stats.records_found = collected.len();

        let outcome = if stats.pages_with_text == 0 {
            tracing::warn!("No text could be extracted from any page");
            ExtractionOutcome::NoExtractableText
        } else if stats.pages_relevant == 0 {
            tracing::warn!("No page contains the section marker");
            ExtractionOutcome::NoRelevantPages
        } else {
            let records = finalize_records(dedupe_records(collected));
            stats.records_kept = records.len();
            ExtractionOutcome::Records(records)
        };

        tracing::info!(
            "Extraction finished: {} relevant page(s), {} record(s) found, {} kept",
            stats.pages_relevant,
            stats.records_found,
            stats.records_kept
        );

        Ok(ExtractionReport { outcome, stats })
    }
}
