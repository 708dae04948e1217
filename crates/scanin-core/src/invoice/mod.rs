//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{extract_invoice, ExtractionResult, HeuristicInvoiceParser, InvoiceParser};
pub use rules::FieldResolver;
