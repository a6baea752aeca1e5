// src/errors.rs
use thiserror::Error;

/// Errors surfaced by the market-structure pipeline.
///
/// Insufficient data is never an error here: detectors answer it with an
/// empty result. Everything below is a programming or data fault that
/// fails the whole call immediately.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Bar sequence error: {0}")]
    Sequencing(String),

    #[error("Invalid bar data: {0}")]
    InvalidBar(String),
}
