// src/utils/mod.rs
pub mod config_file;
pub mod error;
pub mod logging;
pub mod page_debug;

pub use error::AppError; // Re-export main error type for convenience
