//! Core library for heuristic invoice field extraction.
//!
//! This crate provides:
//! - OCR payload decoding into positioned text lines
//! - Layout zones (top band, halves, logo corner) derived from line positions
//! - Field resolvers for vendor name, invoice number, date and total amount
//! - The invoice record model and engine configuration

pub mod error;
pub mod models;
pub mod ocr;
pub mod invoice;

pub use error::{ExtractionError, OcrError, Result, ScaninError};
pub use models::config::ScaninConfig;
pub use models::invoice::{Currency, InvoiceRecord, UNKNOWN};
pub use ocr::{OcrResult, TextLine};
pub use invoice::{extract_invoice, ExtractionResult, HeuristicInvoiceParser, InvoiceParser};
