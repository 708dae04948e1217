//! Total amount extraction.
//!
//! Tiers, strongest first:
//! 1. labeled lines with a currency marker next to the amount;
//! 2. labeled lines without a marker;
//! 3. the largest amount in the bottom band of the page;
//! 4. the largest amount anywhere.
//!
//! Strategies report the currency they saw, if any. The resolver fills in
//! the document currency for candidates that carry none.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::models::invoice::Currency;
use crate::ocr::{Page, TextLine, Zone};

use super::currency::{currency_in_line, detect_document_currency};
use super::numbers::parse_amount;
use super::patterns::{AmountPattern, AMOUNT_ANY, AMOUNT_TAGGED, AMOUNT_UNTAGGED};
use super::{run_cascade, FieldResolver, Strategy};

/// Words marking a line as a likely total.
const TOTAL_KEYWORDS: &[&str] = &["total", "amount", "balance", "due", "payment"];

/// A resolved total and its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalAmount {
    pub amount: Decimal,
    pub currency: Currency,
}

/// An amount found by one strategy, with the currency it saw (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    amount: Decimal,
    currency: Option<Currency>,
}

const STRATEGIES: &[Strategy<Candidate>] = &[
    Strategy::new("labeled amount with currency", labeled_tagged),
    Strategy::new("labeled amount", labeled_untagged),
    Strategy::new("largest amount in bottom zone", largest_in_bottom_zone),
    Strategy::new("largest amount in document", largest_anywhere),
];

/// Total amount resolver.
pub struct AmountResolver {
    default_currency: Currency,
}

impl AmountResolver {
    pub fn new() -> Self {
        Self {
            default_currency: Currency::default(),
        }
    }

    /// Currency used when the document gives no clear signal.
    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.default_currency = currency;
        self
    }
}

impl Default for AmountResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldResolver for AmountResolver {
    type Output = TotalAmount;

    fn resolve(&self, lines: &[TextLine]) -> Option<TotalAmount> {
        let document_currency = detect_document_currency(lines, self.default_currency);
        let page = Page::new(lines);

        run_cascade("total_amount", &page, STRATEGIES).map(|candidate| TotalAmount {
            amount: candidate.amount,
            currency: candidate.currency.unwrap_or(document_currency),
        })
    }
}

/// Resolve the total, falling back to zero in the document currency.
pub fn resolve_total(lines: &[TextLine], default_currency: Currency) -> TotalAmount {
    AmountResolver::new()
        .with_default_currency(default_currency)
        .resolve(lines)
        .unwrap_or_else(|| TotalAmount {
            amount: Decimal::ZERO,
            currency: detect_document_currency(lines, default_currency),
        })
}

/// Apply one pattern to `line`, resolving the currency from the captured
/// marker or, for untagged matches, from symbols elsewhere in the line.
fn match_pattern(pattern: &AmountPattern, line: &TextLine) -> Option<Candidate> {
    let (raw, marker) = pattern.capture(&line.text)?;
    let amount = match parse_amount(raw) {
        Ok(amount) => amount,
        Err(e) => {
            trace!("Skipping amount candidate: {}", e);
            return None;
        }
    };

    let currency = match marker {
        Some(marker) => Currency::from_marker(marker),
        None => currency_in_line(&line.text),
    };
    Some(Candidate { amount, currency })
}

/// The first pattern in `patterns` that matches `line`.
fn match_line(patterns: &[AmountPattern], line: &TextLine) -> Option<Candidate> {
    patterns
        .iter()
        .find_map(|pattern| match_pattern(pattern, line))
}

fn labeled_tagged(page: &Page<'_>) -> Option<Candidate> {
    page.with_keywords(TOTAL_KEYWORDS)
        .find_map(|line| match_line(&AMOUNT_TAGGED, line))
}

fn labeled_untagged(page: &Page<'_>) -> Option<Candidate> {
    page.with_keywords(TOTAL_KEYWORDS)
        .find_map(|line| match_line(&AMOUNT_UNTAGGED, line))
}

fn largest_in_bottom_zone(page: &Page<'_>) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for line in page.in_zone(Zone::Bottom) {
        for pattern in AMOUNT_TAGGED.iter().chain(AMOUNT_UNTAGGED.iter()) {
            if let Some(candidate) = match_pattern(pattern, line) {
                keep_largest(&mut best, candidate);
            }
        }
    }

    best
}

fn largest_anywhere(page: &Page<'_>) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for line in page.lines {
        for caps in AMOUNT_ANY.captures_iter(&line.text) {
            let Ok(amount) = parse_amount(&caps[2]) else {
                continue;
            };

            let currency = caps
                .get(1)
                .and_then(|m| Currency::from_marker(m.as_str()))
                .or_else(|| caps.get(3).and_then(|m| Currency::from_marker(m.as_str())))
                .or_else(|| currency_in_line(&line.text));

            keep_largest(&mut best, Candidate { amount, currency });
        }
    }

    best
}

/// Replace `best` only with a strictly larger, positive amount.
fn keep_largest(best: &mut Option<Candidate>, candidate: Candidate) {
    if candidate.amount <= Decimal::ZERO {
        return;
    }
    match best {
        Some(current) if candidate.amount <= current.amount => {}
        _ => {
            debug!("New largest amount candidate {}", candidate.amount);
            *best = Some(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(text: &str, x: i32, y: i32) -> TextLine {
        TextLine::new(text, x, y, 100, 20)
    }

    #[test]
    fn test_labeled_amount_with_symbol() {
        let lines = vec![
            line("Acme Corp", 50, 40),
            line("Subtotal 10.00", 50, 500),
            line("Total: €1.234,50", 50, 900),
        ];
        let total = resolve_total(&lines, Currency::Eur);

        assert_eq!(total.amount, dec("1234.50"));
        assert_eq!(total.currency, Currency::Eur);
    }

    #[test]
    fn test_code_after_amount() {
        let lines = vec![line("Amount due 250.00 USD", 50, 100)];
        let total = resolve_total(&lines, Currency::Eur);

        assert_eq!(total.amount, dec("250.00"));
        assert_eq!(total.currency, Currency::Usd);
    }

    #[test]
    fn test_untagged_label_uses_document_currency() {
        let lines = vec![line("Total: 99.99", 0, 0)];
        let total = resolve_total(&lines, Currency::Eur);

        assert_eq!(total.amount, dec("99.99"));
        assert_eq!(total.currency, Currency::Eur);

        let lines = vec![line("Prices in GBP", 0, 0), line("Total: 99.99", 0, 50)];
        assert_eq!(resolve_total(&lines, Currency::Eur).currency, Currency::Gbp);
    }

    #[test]
    fn test_bottom_zone_keeps_largest() {
        let lines = vec![
            line("Widget", 50, 100),
            line("12.00 $", 50, 800),
            line("€ 140.00", 50, 900),
            line("85,00", 50, 1000),
        ];
        let total = resolve_total(&lines, Currency::Usd);

        assert_eq!(total.amount, dec("140.00"));
        assert_eq!(total.currency, Currency::Eur);
    }

    #[test]
    fn test_bottom_zone_compares_every_pattern() {
        let lines = vec![line("Acme", 50, 100), line("€ 10.00 or 500.00 EUR", 50, 1000)];
        let total = resolve_total(&lines, Currency::Usd);

        assert_eq!(total.amount, dec("500.00"));
        assert_eq!(total.currency, Currency::Eur);

        let lines = vec![
            line("Acme", 50, 100),
            line("Subtotal: 5.00 Grand total: 900.00", 50, 1000),
        ];
        let candidate = largest_in_bottom_zone(&Page::new(&lines)).unwrap();
        assert_eq!(candidate.amount, dec("900.00"));
    }

    #[test]
    fn test_first_labeled_line_wins() {
        let lines = vec![
            line("Amount due: $40.00", 50, 100),
            line("Total: €900.00", 50, 900),
        ];
        let total = resolve_total(&lines, Currency::Eur);

        assert_eq!(total.amount, dec("40.00"));
        assert_eq!(total.currency, Currency::Usd);
    }

    #[test]
    fn test_largest_anywhere_fallback() {
        let lines = vec![
            line("Item A 12.50", 50, 100),
            line("Item B 18.75", 50, 120),
            line("Thank you", 50, 1000),
        ];
        let total = resolve_total(&lines, Currency::Gbp);

        assert_eq!(total.amount, dec("18.75"));
        assert_eq!(total.currency, Currency::Gbp);
    }

    #[test]
    fn test_no_amount_is_zero_in_document_currency() {
        let lines = vec![line("Paid in dollars", 0, 0)];
        let total = resolve_total(&lines, Currency::Eur);

        assert_eq!(total.amount, Decimal::ZERO);
        assert_eq!(total.currency, Currency::Usd);
        assert_eq!(AmountResolver::new().resolve(&lines), None);
    }

    #[test]
    fn test_empty_document() {
        let total = resolve_total(&[], Currency::Eur);
        assert_eq!(total, TotalAmount { amount: Decimal::ZERO, currency: Currency::Eur });
    }
}
