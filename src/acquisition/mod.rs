// src/acquisition/mod.rs
pub mod client;
pub mod models;
pub mod poppler;
