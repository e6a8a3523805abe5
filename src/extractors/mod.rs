// src/extractors/mod.rs
pub mod aggregate;
pub mod anchor;
pub mod config;
pub mod dedup;
pub mod fields;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod relevance;
pub mod skip_rules;

// Re-export key extraction types for convenience
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use pipeline::{ContributionExtractor, ExtractionOutcome, ExtractionReport};
