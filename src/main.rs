// src/main.rs
mod acquisition;
mod extractors;
mod storage;
mod utils;

use std::path::PathBuf;

use clap::Parser;

use acquisition::client::{self, DocumentSource};
use acquisition::models::{OcrMode, StagedDocument};
use acquisition::poppler::{OcrEngine, PopplerSource};
use extractors::{ContributionExtractor, ExtractionConfig, ExtractionConfigBuilder, ExtractionOutcome, ExtractionReport};
use storage::StorageManager;
use utils::config_file::{self, ConfigFile};
use utils::AppError;

const DEFAULT_OCR_LANG: &str = "eng";
const DEFAULT_OCR_DPI: u32 = 300;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Csv,
    Json,
}

/// Extract Schedule A1 contribution records from a campaign finance report
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path or HTTP(S) URL of the report PDF
    #[arg(short, long)]
    input: String,

    /// Output directory for extracted records
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Output format for the records
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// When to use OCR (default: auto, or the config file's value)
    #[arg(long, value_enum)]
    ocr: Option<OcrMode>,

    /// Tesseract language code
    #[arg(long)]
    ocr_lang: Option<String>,

    /// Render resolution for OCR
    #[arg(long)]
    ocr_dpi: Option<u32>,

    /// Text-layer pages with fewer non-whitespace chars are OCRed in auto mode (default: 50)
    #[arg(long)]
    min_text_chars: Option<usize>,

    /// TOML file with phrase lists, window sizes and OCR settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug mode - save an annotated line trace for every relevant page
    #[arg(short, long)]
    debug: bool,
}

/// Everything the blocking extraction task needs, resolved from CLI and config file.
struct RunSettings {
    config: ExtractionConfig,
    ocr_mode: OcrMode,
    ocr_lang: String,
    ocr_dpi: u32,
    debug_dir: Option<PathBuf>,
}

fn resolve_settings(args: &Args, file: &ConfigFile) -> Result<RunSettings, AppError> {
    let mut builder = file.apply(ExtractionConfigBuilder::new());
    if let Some(chars) = args.min_text_chars {
        builder = builder.min_text_chars(chars);
    }
    let config = builder.build()?;

    Ok(RunSettings {
        config,
        ocr_mode: match args.ocr {
            Some(mode) => mode,
            None => file.ocr_mode()?.unwrap_or_default(),
        },
        ocr_lang: args
            .ocr_lang
            .clone()
            .or_else(|| file.ocr_lang().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_OCR_LANG.to_string()),
        ocr_dpi: args.ocr_dpi.or(file.ocr_dpi()).unwrap_or(DEFAULT_OCR_DPI),
        debug_dir: args.debug.then(|| PathBuf::from(&args.output_dir).join("debug")),
    })
}

/// Stage the document and run the extractor over its pages, in order.
fn run_extraction(bytes: Vec<u8>, settings: RunSettings) -> Result<ExtractionReport, AppError> {
    let staged = StagedDocument::stage(&bytes)?;

    // One recognizer for the whole run, lent to the page source.
    let ocr_engine = match settings.ocr_mode {
        OcrMode::Never => None,
        mode => {
            let engine = OcrEngine::new(settings.ocr_lang.clone(), settings.ocr_dpi);
            match engine.check_available() {
                Ok(()) => Some(engine),
                Err(e) if mode == OcrMode::Always => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("OCR fallback disabled: {}", e);
                    None
                }
            }
        }
    };

    let source = PopplerSource::new(
        &staged,
        ocr_engine.as_ref(),
        settings.ocr_mode,
        settings.config.min_text_chars(),
    );

    let mut extractor = ContributionExtractor::new(settings.config);
    if let Some(dir) = settings.debug_dir {
        extractor = extractor.with_debug_dir(dir);
    }

    Ok(extractor.extract_document(&source)?)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments and merge the optional config file
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    let file_config = match &args.config {
        Some(path) => config_file::load_from_path(path)?,
        None => ConfigFile::default(),
    };
    let settings = resolve_settings(&args, &file_config)?;
    tracing::debug!(
        "OCR mode {:?} (lang {}, {} dpi), markers {:?}",
        settings.ocr_mode,
        settings.ocr_lang,
        settings.ocr_dpi,
        settings.config.section_markers()
    );

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Load the document
    let source = DocumentSource::parse(&args.input);
    let stem = source.stem();
    let bytes = client::load_document(&source).await?;
    tracing::info!("Loaded document ({} bytes)", bytes.len());

    // 5. Extract; page text acquisition shells out and blocks
    let report = tokio::task::spawn_blocking(move || run_extraction(bytes, settings))
        .await
        .map_err(|e| AppError::Processing(format!("extraction task failed: {}", e)))??;

    // 6. Save results
    match storage.save_run_metadata(&stem, &args.input, &report) {
        Ok(path) => tracing::info!("Saved run metadata to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save run metadata: {}", e),
    }

    match &report.outcome {
        ExtractionOutcome::Records(records) => {
            let path = match args.format {
                OutputFormat::Csv => storage.save_records_csv(&stem, records)?,
                OutputFormat::Json => storage.save_records_json(&stem, records)?,
            };
            println!("{} contribution record(s) written to {}", records.len(), path.display());
        }
        ExtractionOutcome::NoRelevantPages => {
            tracing::warn!("No Schedule A1 pages found in {}", args.input);
            println!("No contribution schedule pages found; nothing written");
        }
        ExtractionOutcome::NoExtractableText => {
            return Err(AppError::Processing(format!(
                "No extractable text in any of {} page(s) of {}",
                report.stats.pages_total, args.input
            )));
        }
    }

    tracing::info!("Processing finished: {:?}", report.stats);
    Ok(())
}
