//! Invoice number extraction.

use crate::models::invoice::UNKNOWN;
use crate::ocr::{Page, TextLine, Zone};

use super::patterns::{ALNUM_RUN, DIGIT_RUN, INVOICE_NUMBER_PATTERNS};
use super::{run_cascade, FieldResolver, Strategy};

/// Keywords that qualify a top-right line as invoice metadata.
const HEADER_KEYWORDS: &[&str] = &["invoice", "inv", "number", "#"];

/// Keywords that qualify any line as a reference line.
const REFERENCE_KEYWORDS: &[&str] = &["invoice", "inv", "number", "order", "reference"];

/// Label words that are never the number itself.
const LABEL_WORDS: &[&str] = &["invoice", "number", "inv"];

/// Lines containing one of these may carry a bare document number.
const DOCUMENT_WORDS: &[&str] = &["invoice", "delivery docket"];

/// Vertical reach around a `Number:` label, in pixels.
const LABEL_VERTICAL_TOLERANCE: i32 = 50;

/// Horizontal reach to the right of a `Number:` label, in pixels.
const LABEL_HORIZONTAL_TOLERANCE: i32 = 300;

const STRATEGIES: &[Strategy<String>] = &[
    Strategy::new("top-right header", top_right_header),
    Strategy::new("reference line", reference_line),
    Strategy::new("top half", top_half),
    Strategy::new("whole document", whole_document),
    Strategy::new("number label proximity", number_label_proximity),
    Strategy::new("document line digits", document_line_digits),
];

/// Invoice number resolver.
pub struct InvoiceNumberResolver;

impl InvoiceNumberResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvoiceNumberResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldResolver for InvoiceNumberResolver {
    type Output = String;

    fn resolve(&self, lines: &[TextLine]) -> Option<String> {
        run_cascade("invoice_number", &Page::new(lines), STRATEGIES)
    }
}

/// Resolve the invoice number, or [`UNKNOWN`].
pub fn resolve_invoice_number(lines: &[TextLine]) -> String {
    InvoiceNumberResolver::new()
        .resolve(lines)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Try every labeled pattern in order, skipping single-character captures.
fn labeled_number(text: &str) -> Option<String> {
    INVOICE_NUMBER_PATTERNS.iter().find_map(|pattern| {
        let id = pattern.captures(text)?.get(1)?.as_str();
        (id.chars().count() > 1).then(|| id.to_string())
    })
}

/// Any alphanumeric run of three or more that is not a label word.
fn unlabeled_token(text: &str) -> Option<String> {
    ALNUM_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|token| {
            let lower = token.to_lowercase();
            !LABEL_WORDS.iter().any(|word| *word == lower)
        })
        .map(str::to_string)
}

fn top_right_header(page: &Page<'_>) -> Option<String> {
    page.in_zone(Zone::TopRight)
        .filter(|line| line.contains_any(HEADER_KEYWORDS))
        .find_map(|line| labeled_number(&line.text).or_else(|| unlabeled_token(&line.text)))
}

fn reference_line(page: &Page<'_>) -> Option<String> {
    page.with_keywords(REFERENCE_KEYWORDS)
        .find_map(|line| labeled_number(&line.text))
}

fn top_half(page: &Page<'_>) -> Option<String> {
    page.in_zone(Zone::TopHalf)
        .find_map(|line| labeled_number(&line.text))
}

fn whole_document(page: &Page<'_>) -> Option<String> {
    page.lines.iter().find_map(|line| labeled_number(&line.text))
}

/// A long digit run next to, or just right of, the first `Number:` label.
fn number_label_proximity(page: &Page<'_>) -> Option<String> {
    let label = page
        .lines
        .iter()
        .find(|line| line.lower().contains("number:"))?;

    page.lines
        .iter()
        .filter(|line| (line.y - label.y).abs() <= LABEL_VERTICAL_TOLERANCE)
        .filter(|line| line.x >= label.x && line.x <= label.x + LABEL_HORIZONTAL_TOLERANCE)
        .find_map(|line| DIGIT_RUN.find(&line.text))
        .map(|m| m.as_str().to_string())
}

fn document_line_digits(page: &Page<'_>) -> Option<String> {
    page.lines
        .iter()
        .filter(|line| line.contains_any(DOCUMENT_WORDS))
        .find_map(|line| DIGIT_RUN.find(&line.text))
        .map(|m| m.as_str().to_string())
}
