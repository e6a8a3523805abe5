// src/acquisition/models.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::TempDir;

use crate::utils::error::AcquireError;

/// Where a page's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrigin {
    /// The document's own text layer.
    Native,
    /// Optical character recognition of the rendered page.
    Ocr,
}

/// Raw text for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number.
    pub page_number: usize,
    pub text: String,
    pub origin: TextOrigin,
}

/// When to run OCR instead of (or after) the text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OcrMode {
    /// OCR only pages whose text layer is too short.
    #[default]
    Auto,
    /// OCR every page.
    Always,
    /// Never OCR.
    Never,
}

/// Supplies per-page text for a document.
///
/// Implementations do the blocking work (external tools, recognizers). The
/// extraction pipeline calls them one page at a time, in order.
pub trait PageTextSource {
    /// Number of pages; an error here means the document cannot be read at all.
    fn page_count(&self) -> Result<usize, AcquireError>;

    /// Text of page `page_index` (0-based). `Ok(None)` means nothing could be read.
    fn page_text(&self, page_index: usize) -> Result<Option<PageText>, AcquireError>;
}

/// The document bytes written to a scratch file for the command-line tools.
///
/// The scratch directory is removed when the value is dropped.
#[derive(Debug)]
pub struct StagedDocument {
    path: PathBuf,
    scratch_dir: TempDir,
}

impl StagedDocument {
    pub fn stage(bytes: &[u8]) -> Result<Self, AcquireError> {
        if bytes.is_empty() {
            return Err(AcquireError::MalformedDocument("document is empty".to_string()));
        }

        let scratch_dir = tempfile::Builder::new().prefix("contrib_extractor").tempdir()?;

        let path = scratch_dir.path().join("document.pdf");
        fs::write(&path, bytes)?;
        tracing::debug!("Staged {} bytes at {}", bytes.len(), path.display());

        Ok(Self { path, scratch_dir })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory for intermediate files (rendered page images).
    pub fn scratch_dir(&self) -> &Path {
        self.scratch_dir.path()
    }
}
