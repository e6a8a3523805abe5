// src/acquisition/poppler.rs
use std::io::ErrorKind;
use std::process::Command;

use crate::acquisition::models::{OcrMode, PageText, PageTextSource, StagedDocument, TextOrigin};
use crate::utils::error::AcquireError;

const PDFINFO: &str = "pdfinfo";
const PDFTOTEXT: &str = "pdftotext";
const PDFTOPPM: &str = "pdftoppm";
const TESSERACT: &str = "tesseract";

/// Run a command to completion and return its stdout as (lossy) UTF-8.
fn run_tool(command: &mut Command, tool: &str) -> Result<String, AcquireError> {
    let output = command.output().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            AcquireError::ToolMissing(tool.to_string())
        } else {
            AcquireError::Io(e)
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AcquireError::ToolFailed {
            tool: tool.to_string(),
            message: format!("{} ({})", stderr.trim(), output.status),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// True if `tool` resolves to an executable on PATH.
pub fn command_available(tool: &str) -> bool {
    which::which(tool).is_ok()
}

/// First of `tools` that cannot be found.
fn first_missing<'t>(tools: &[&'t str]) -> Option<&'t str> {
    tools.iter().copied().find(|tool| !command_available(tool))
}

/// Count of characters that are not whitespace.
pub fn non_whitespace_char_count(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Read the `Pages:` line out of `pdfinfo` output.
pub fn parse_page_count(info: &str) -> Option<usize> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|value| value.trim().parse().ok())
}

/// Tesseract-backed recognizer.
///
/// Construct once per run and hand out by reference; it holds the language
/// and render resolution used for every page.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    lang: String,
    dpi: u32,
}

impl OcrEngine {
    pub fn new(lang: impl Into<String>, dpi: u32) -> Self {
        Self { lang: lang.into(), dpi }
    }

    /// Fails with [`AcquireError::ToolMissing`] when the renderer or tesseract is absent.
    pub fn check_available(&self) -> Result<(), AcquireError> {
        match first_missing(&[PDFTOPPM, TESSERACT]) {
            Some(tool) => Err(AcquireError::ToolMissing(tool.to_string())),
            None => Ok(()),
        }
    }

    /// Render one page to PNG and run tesseract over it.
    pub fn recognize_page(&self, doc: &StagedDocument, page_number: usize) -> Result<String, AcquireError> {
        let prefix = doc.scratch_dir().join(format!("page_{}", page_number));
        let page = page_number.to_string();

        run_tool(
            Command::new(PDFTOPPM)
                .arg("-r")
                .arg(self.dpi.to_string())
                .args(["-f", page.as_str(), "-l", page.as_str(), "-png", "-singlefile"])
                .arg(doc.path())
                .arg(&prefix),
            PDFTOPPM,
        )?;

        let image = prefix.with_extension("png");
        let text = run_tool(
            Command::new(TESSERACT)
                .arg(&image)
                .arg("stdout")
                .args(["-l", self.lang.as_str()]),
            TESSERACT,
        );

        if let Err(e) = std::fs::remove_file(&image) {
            tracing::debug!("Could not remove rendered page {}: {}", image.display(), e);
        }

        text
    }
}

/// Page text from poppler's text layer, with tesseract as a fallback.
pub struct PopplerSource<'a> {
    doc: &'a StagedDocument,
    ocr: Option<&'a OcrEngine>,
    mode: OcrMode,
    min_text_chars: usize,
}

impl<'a> PopplerSource<'a> {
    pub fn new(doc: &'a StagedDocument, ocr: Option<&'a OcrEngine>, mode: OcrMode, min_text_chars: usize) -> Self {
        Self { doc, ocr, mode, min_text_chars }
    }

    fn native_text(&self, page_number: usize) -> Result<String, AcquireError> {
        let page = page_number.to_string();
        run_tool(
            Command::new(PDFTOTEXT)
                .args(["-layout", "-f", page.as_str(), "-l", page.as_str()])
                .arg(self.doc.path())
                .arg("-"),
            PDFTOTEXT,
        )
    }

    fn ocr_text(&self, page_number: usize) -> Result<String, AcquireError> {
        let engine = self
            .ocr
            .ok_or_else(|| AcquireError::ToolMissing(TESSERACT.to_string()))?;
        engine.recognize_page(self.doc, page_number)
    }
}

/// Pick between the text layer and OCR output in auto mode.
///
/// OCR wins only when the text layer is below the threshold and OCR actually
/// produced more text.
pub fn select_auto_text(native: String, ocr: Option<String>, min_text_chars: usize) -> (String, TextOrigin) {
    let native_chars = non_whitespace_char_count(&native);
    if native_chars >= min_text_chars {
        return (native, TextOrigin::Native);
    }
    match ocr {
        Some(ocr) if non_whitespace_char_count(&ocr) > native_chars => (ocr, TextOrigin::Ocr),
        _ => (native, TextOrigin::Native),
    }
}

impl PageTextSource for PopplerSource<'_> {
    fn page_count(&self) -> Result<usize, AcquireError> {
        let info = run_tool(Command::new(PDFINFO).arg(self.doc.path()), PDFINFO).map_err(|e| match e {
            AcquireError::ToolFailed { message, .. } => AcquireError::MalformedDocument(message),
            other => other,
        })?;
        parse_page_count(&info)
            .ok_or_else(|| AcquireError::MalformedDocument("pdfinfo reported no page count".to_string()))
    }

    fn page_text(&self, page_index: usize) -> Result<Option<PageText>, AcquireError> {
        let page_number = page_index + 1;

        let (text, origin) = match self.mode {
            OcrMode::Never => (self.native_text(page_number)?, TextOrigin::Native),
            OcrMode::Always => (self.ocr_text(page_number)?, TextOrigin::Ocr),
            OcrMode::Auto => {
                let native = self.native_text(page_number)?;
                let ocr = if non_whitespace_char_count(&native) < self.min_text_chars && self.ocr.is_some() {
                    tracing::info!("Page {}: text layer below {} chars, trying OCR", page_number, self.min_text_chars);
                    match self.ocr_text(page_number) {
                        Ok(text) => Some(text),
                        Err(e) => {
                            tracing::warn!("Page {}: OCR failed, keeping text layer: {}", page_number, e);
                            None
                        }
                    }
                } else {
                    None
                };
                select_auto_text(native, ocr, self.min_text_chars)
            }
        };

        if text.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(PageText { page_number, text, origin }))
    }
}
