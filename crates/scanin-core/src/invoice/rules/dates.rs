//! Invoice date extraction.
//!
//! The date is returned exactly as printed. Interpreting it is left to
//! [`InvoiceRecord::issue_date`](crate::models::invoice::InvoiceRecord::issue_date).

use crate::models::invoice::UNKNOWN;
use crate::ocr::{Page, TextLine, Zone};

use super::patterns::DATE_PATTERNS;
use super::{run_cascade, FieldResolver, Strategy};

/// Words that label a date line.
const DATE_KEYWORDS: &[&str] = &["date", "issued", "invoice date", "order date", "billing date"];

const STRATEGIES: &[Strategy<String>] = &[
    Strategy::new("labeled date", labeled),
    Strategy::new("date in top half", top_half),
    Strategy::new("date anywhere", anywhere),
];

/// Date field resolver.
pub struct DateResolver;

impl DateResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldResolver for DateResolver {
    type Output = String;

    fn resolve(&self, lines: &[TextLine]) -> Option<String> {
        run_cascade("date", &Page::new(lines), STRATEGIES)
    }
}

/// Resolve the date, or [`UNKNOWN`].
pub fn resolve_date(lines: &[TextLine]) -> String {
    DateResolver::new()
        .resolve(lines)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// First date pattern that matches anywhere in `text`.
fn find_date(text: &str) -> Option<String> {
    DATE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(|m| m.as_str().to_string())
}

fn labeled(page: &Page<'_>) -> Option<String> {
    page.with_keywords(DATE_KEYWORDS)
        .find_map(|line| find_date(&line.text))
}

fn top_half(page: &Page<'_>) -> Option<String> {
    page.in_zone(Zone::TopHalf)
        .find_map(|line| find_date(&line.text))
}

fn anywhere(page: &Page<'_>) -> Option<String> {
    page.lines.iter().find_map(|line| find_date(&line.text))
}
