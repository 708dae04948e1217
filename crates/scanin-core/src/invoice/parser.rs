//! Heuristic invoice parser combining the per-field resolvers.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::models::invoice::{Currency, InvoiceRecord};
use crate::ocr::{OcrResult, TextLine};

use super::rules::{resolve_date, resolve_invoice_number, resolve_total, resolve_vendor};

/// Result of invoice extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub record: InvoiceRecord,
    /// Line texts joined with newlines.
    pub raw_text: String,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse an invoice from positioned OCR lines.
    fn parse(&self, lines: &[TextLine]) -> ExtractionResult;
}

/// Layout-driven parser: every field is resolved by its own strategy cascade.
pub struct HeuristicInvoiceParser {
    /// Currency used when the document gives no clear signal.
    default_currency: Currency,
    /// Whether to order lines top to bottom before resolving.
    sort_by_position: bool,
}

impl HeuristicInvoiceParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            default_currency: Currency::default(),
            sort_by_position: true,
        }
    }

    /// Set the fallback currency.
    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.default_currency = currency;
        self
    }

    /// Set whether lines are sorted by `y` before resolving.
    pub fn with_position_sort(mut self, sort: bool) -> Self {
        self.sort_by_position = sort;
        self
    }

    /// Parse a decoded OCR service payload.
    pub fn parse_ocr(&self, ocr_result: &OcrResult) -> ExtractionResult {
        self.parse(&ocr_result.text_lines())
    }

    fn extract(&self, lines: &[TextLine]) -> InvoiceRecord {
        let total = resolve_total(lines, self.default_currency);

        InvoiceRecord {
            vendor_name: resolve_vendor(lines),
            invoice_number: resolve_invoice_number(lines),
            date: resolve_date(lines),
            total_amount: total.amount,
            currency: total.currency,
        }
    }
}

impl Default for HeuristicInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for HeuristicInvoiceParser {
    fn parse(&self, lines: &[TextLine]) -> ExtractionResult {
        let start = Instant::now();

        info!("Parsing invoice from {} OCR lines", lines.len());

        let record = if self.sort_by_position {
            let mut sorted = lines.to_vec();
            sorted.sort_by_key(|line| line.y);
            self.extract(&sorted)
        } else {
            self.extract(lines)
        };

        let warnings: Vec<String> = record
            .missing_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();

        debug!(
            "Extracted invoice {} from {} ({} {})",
            record.invoice_number, record.vendor_name, record.total_amount, record.currency
        );

        ExtractionResult {
            record,
            raw_text: lines
                .iter()
                .map(|line| line.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Extract a record with default settings.
pub fn extract_invoice(lines: &[TextLine]) -> InvoiceRecord {
    HeuristicInvoiceParser::new().parse(lines).record
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::models::invoice::UNKNOWN;

    fn line(text: &str, x: i32, y: i32) -> TextLine {
        TextLine::new(text, x, y, 100, 20)
    }

    fn acme_lines() -> Vec<TextLine> {
        vec![
            line("INVOICE #4521", 600, 50),
            line("Acme Corp", 50, 40),
            line("www.acmecorp.com", 50, 600),
            line("Total: €1.234,50", 50, 900),
        ]
    }

    #[test]
    fn test_end_to_end_acme() {
        let record = extract_invoice(&acme_lines());

        assert_eq!(
            record,
            InvoiceRecord {
                vendor_name: "Acme Corp".to_string(),
                invoice_number: "4521".to_string(),
                date: UNKNOWN.to_string(),
                total_amount: Decimal::from_str("1234.50").unwrap(),
                currency: Currency::Eur,
            }
        );
    }

    #[test]
    fn test_end_to_end_untagged_total() {
        let record = extract_invoice(&[line("Total: 99.99", 10, 10)]);

        assert_eq!(record.total_amount, Decimal::from_str("99.99").unwrap());
        assert_eq!(record.currency, Currency::Eur);
    }

    #[test]
    fn test_empty_document_is_all_sentinels() {
        let result = HeuristicInvoiceParser::new().parse(&[]);

        assert_eq!(result.record, InvoiceRecord::unknown(Currency::Eur));
        assert_eq!(result.raw_text, "");
        assert_eq!(
            result.warnings,
            vec![
                "Could not extract vendor_name",
                "Could not extract invoice_number",
                "Could not extract date",
                "Could not extract total_amount",
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let lines = acme_lines();
        let parser = HeuristicInvoiceParser::new();

        let first = serde_json::to_string(&parser.parse(&lines).record).unwrap();
        let second = serde_json::to_string(&parser.parse(&lines).record).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_currency_override() {
        let parser = HeuristicInvoiceParser::new().with_default_currency(Currency::Gbp);
        let result = parser.parse(&[line("Total: 99.99", 10, 10)]);

        assert_eq!(result.record.currency, Currency::Gbp);
    }

    #[test]
    fn test_position_sort_does_not_change_raw_text() {
        let lines = vec![line("second", 0, 100), line("first", 0, 10)];
        let result = HeuristicInvoiceParser::new().parse(&lines);
        assert_eq!(result.raw_text, "second\nfirst");
    }

    #[test]
    fn test_parse_ocr_payload() {
        let payload = r##"{"regions": [{"lines": [
            {"boundingBox": "600,50,120,20", "words": [{"text": "INVOICE"}, {"text": "#4521"}]},
            {"boundingBox": "50,40,120,20", "words": [{"text": "Acme"}, {"text": "Corp"}]},
            {"boundingBox": "50,600,120,20", "words": [{"text": "www.acmecorp.com"}]},
            {"boundingBox": "50,900,120,20", "words": [{"text": "Total:"}, {"text": "€1.234,50"}]}
        ]}]}"##;
        let ocr = OcrResult::from_json(payload).unwrap();
        let result = HeuristicInvoiceParser::new().parse_ocr(&ocr);

        assert_eq!(result.record.vendor_name, "Acme Corp");
        assert_eq!(result.record.invoice_number, "4521");
        assert_eq!(result.warnings, vec!["Could not extract date"]);
    }
}
