//! Error types for the scanin-core library.

use thiserror::Error;

/// Main error type for the scanin library.
///
/// Field extraction itself never fails; these errors come from decoding OCR
/// payloads, reading files and loading configuration.
#[derive(Error, Debug)]
pub enum ScaninError {
    /// OCR payload error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to the OCR input contract.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR payload could not be decoded.
    #[error("failed to decode OCR payload: {0}")]
    Decode(String),

    /// The payload decoded but produced no usable lines.
    #[error("OCR payload contains no positioned text lines")]
    NoText,
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// Currency code is not one of the supported currencies.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Result type for the scanin library.
pub type Result<T> = std::result::Result<T, ScaninError>;
