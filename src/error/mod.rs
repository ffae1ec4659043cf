// src/error/mod.rs
//
// Error layer
//
// - AppError: crate-internal failures (validation, decoding, storage)
// - CatalogError: the closed taxonomy surfaced to the presentation layer
// - ErrorClassifier: transport failure -> CatalogError

pub mod catalog_error;
pub mod classifier;
pub mod types;

pub use catalog_error::CatalogError;
pub use classifier::ErrorClassifier;
pub use types::{AppError, AppResult};
