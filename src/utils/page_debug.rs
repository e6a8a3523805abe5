// src/utils/page_debug.rs
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::extractors::anchor::is_anchor_line;
use crate::extractors::fields::is_address_shape;
use crate::extractors::skip_rules::LineClassifier;

/// How the engine sees a single line.
pub fn classify_line(line: &str, classifier: &LineClassifier) -> &'static str {
    if is_anchor_line(line) {
        "ANCHOR"
    } else if classifier.is_boilerplate(line) {
        "SKIP"
    } else if is_address_shape(line) {
        "ADDR"
    } else {
        "DATA"
    }
}

/// Saves a page's compacted lines, each tagged with its classification.
pub fn write_page_trace(path: &Path, lines: &[&str], classifier: &LineClassifier) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut out = BufWriter::new(File::create(path)?);
    for (idx, line) in lines.iter().enumerate() {
        writeln!(out, "{:>4} {:<6} | {}", idx, classify_line(line, classifier), line)?;
    }
    out.flush()?;

    tracing::debug!("Saved page trace to {}", path.display());
    Ok(())
}
