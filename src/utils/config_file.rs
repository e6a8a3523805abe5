// src/utils/config_file.rs
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::acquisition::models::OcrMode;
use crate::extractors::config::ExtractionConfigBuilder;
use crate::utils::error::AppError;

/// On-disk TOML configuration.
/// All fields are optional so partial configs work (merged over defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub phrases: Option<PhrasesConfig>,
    pub windows: Option<WindowsConfig>,
    pub ocr: Option<OcrConfig>,
}

/// `section_markers` / `header` / `footer` replace the built-in lists;
/// the `extra_*` lists are appended to them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhrasesConfig {
    pub section_markers: Option<Vec<String>>,
    pub header: Option<Vec<String>>,
    pub footer: Option<Vec<String>>,
    pub extra_section_markers: Option<Vec<String>>,
    pub extra_header: Option<Vec<String>>,
    pub extra_footer: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowsConfig {
    pub address: Option<usize>,
    pub fields: Option<usize>,
    pub next_anchor: Option<usize>,
    pub resync: Option<usize>,
    pub fallback_skip: Option<usize>,
    pub max_name_chars: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OcrConfig {
    pub mode: Option<String>,
    pub lang: Option<String>,
    pub dpi: Option<u32>,
    pub min_text_chars: Option<usize>,
}

/// Load a config from a specific path.
pub fn load_from_path(path: &Path) -> Result<ConfigFile, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    parse(&content).map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
}

pub fn parse(content: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str(content)
}

impl ConfigFile {
    /// Apply the file's values on top of `builder`.
    pub fn apply(&self, mut builder: ExtractionConfigBuilder) -> ExtractionConfigBuilder {
        if let Some(phrases) = &self.phrases {
            if let Some(v) = &phrases.section_markers {
                builder = builder.set_section_markers(v.clone());
            }
            if let Some(v) = &phrases.header {
                builder = builder.set_header_phrases(v.clone());
            }
            if let Some(v) = &phrases.footer {
                builder = builder.set_footer_phrases(v.clone());
            }
            for marker in phrases.extra_section_markers.iter().flatten() {
                builder = builder.add_section_marker(marker.clone());
            }
            for phrase in phrases.extra_header.iter().flatten() {
                builder = builder.add_header_phrase(phrase.clone());
            }
            for phrase in phrases.extra_footer.iter().flatten() {
                builder = builder.add_footer_phrase(phrase.clone());
            }
        }

        if let Some(windows) = &self.windows {
            if let Some(v) = windows.address {
                builder = builder.address_window(v);
            }
            if let Some(v) = windows.fields {
                builder = builder.field_window(v);
            }
            if let Some(v) = windows.next_anchor {
                builder = builder.next_anchor_window(v);
            }
            if let Some(v) = windows.resync {
                builder = builder.resync_window(v);
            }
            if let Some(v) = windows.fallback_skip {
                builder = builder.fallback_skip(v);
            }
            if let Some(v) = windows.max_name_chars {
                builder = builder.max_name_chars(v);
            }
        }

        if let Some(v) = self.ocr.as_ref().and_then(|o| o.min_text_chars) {
            builder = builder.min_text_chars(v);
        }

        builder
    }

    pub fn ocr_mode(&self) -> Result<Option<OcrMode>, AppError> {
        use clap::ValueEnum;
        self.ocr
            .as_ref()
            .and_then(|o| o.mode.as_deref())
            .map(|mode| {
                OcrMode::from_str(mode, true)
                    .map_err(|_| AppError::Config(format!("unknown OCR mode '{}'", mode)))
            })
            .transpose()
    }

    pub fn ocr_lang(&self) -> Option<&str> {
        self.ocr.as_ref().and_then(|o| o.lang.as_deref())
    }

    pub fn ocr_dpi(&self) -> Option<u32> {
        self.ocr.as_ref().and_then(|o| o.dpi)
    }
}
