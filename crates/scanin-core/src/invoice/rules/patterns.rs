//! Common regex patterns for invoice field extraction.
//!
//! Every table is compiled once, on first use, and never mutated.

use lazy_static::lazy_static;
use regex::Regex;

/// Decimal amount with two fractional digits and optional grouping,
/// e.g. `99.99`, `1234,56`, `1.234,56`, `12,345,678.90`.
const AMOUNT: &str = r"((?:\d{1,3}(?:[.,]\d{3})+|\d+)[.,]\d{2})";

/// Currency marker printed before an amount.
const SYMBOL: &str = r"([\$€£])";

/// Currency marker printed after an amount.
const SYMBOL_OR_CODE: &str = r"([\$€£]|EUR|USD|GBP)";

/// Labels that introduce a document total, most specific wording last.
const TOTAL_LABELS: &[&str] = &[
    r"total",
    r"amount\s*due",
    r"balance\s*due",
    r"grand\s*total",
    r"total\s*amount",
    r"total\s*due",
    r"invoice\s*total",
    r"payment\s*due",
];

/// Identifier token following an invoice number label.
const ID_TOKEN: &str = r"([A-Za-z0-9][A-Za-z0-9\-/]*)";

/// Which capture group holds what in an amount pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountLayout {
    /// Group 1 is the currency marker, group 2 the amount.
    CurrencyFirst,
    /// Group 1 is the amount, group 2 the currency marker.
    AmountFirst,
    /// Group 1 is the amount; no currency captured.
    Untagged,
}

/// A compiled amount pattern and its capture layout.
#[derive(Debug)]
pub struct AmountPattern {
    pub regex: Regex,
    pub layout: AmountLayout,
}

impl AmountPattern {
    fn new(pattern: &str, layout: AmountLayout) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            layout,
        }
    }

    /// The first match in `text` as `(amount, marker)`.
    pub fn capture<'t>(&self, text: &'t str) -> Option<(&'t str, Option<&'t str>)> {
        let caps = self.regex.captures(text)?;
        match self.layout {
            AmountLayout::CurrencyFirst => {
                Some((caps.get(2)?.as_str(), Some(caps.get(1)?.as_str())))
            }
            AmountLayout::AmountFirst => {
                Some((caps.get(1)?.as_str(), Some(caps.get(2)?.as_str())))
            }
            AmountLayout::Untagged => Some((caps.get(1)?.as_str(), None)),
        }
    }
}

lazy_static! {
    /// Amount patterns that capture a currency marker: labeled symbol-first,
    /// bare symbol-first, labeled code-after, bare code-after.
    pub static ref AMOUNT_TAGGED: Vec<AmountPattern> = {
        let mut patterns = Vec::new();
        for label in TOTAL_LABELS {
            patterns.push(AmountPattern::new(
                &format!(r"(?i){label}:?\s*{SYMBOL}\s*{AMOUNT}"),
                AmountLayout::CurrencyFirst,
            ));
        }
        patterns.push(AmountPattern::new(
            &format!(r"(?i){SYMBOL}\s*{AMOUNT}"),
            AmountLayout::CurrencyFirst,
        ));
        for label in TOTAL_LABELS {
            patterns.push(AmountPattern::new(
                &format!(r"(?i){label}:?\s*{AMOUNT}\s*{SYMBOL_OR_CODE}"),
                AmountLayout::AmountFirst,
            ));
        }
        patterns.push(AmountPattern::new(
            &format!(r"(?i){AMOUNT}\s*{SYMBOL_OR_CODE}"),
            AmountLayout::AmountFirst,
        ));
        patterns
    };

    /// Labeled amount patterns without a currency marker.
    pub static ref AMOUNT_UNTAGGED: Vec<AmountPattern> = TOTAL_LABELS
        .iter()
        .map(|label| {
            AmountPattern::new(&format!(r"(?i){label}:?\s*{AMOUNT}"), AmountLayout::Untagged)
        })
        .collect();

    /// Any amount, with an optional marker on either side.
    /// Groups: 1 = marker before, 2 = amount, 3 = marker after.
    pub static ref AMOUNT_ANY: Regex = Regex::new(
        &format!(r"(?i){SYMBOL}?\s*{AMOUNT}(?:\s*{SYMBOL_OR_CODE})?")
    ).unwrap();

    /// Date shapes, tried in order. Matches are returned verbatim.
    pub static ref DATE_PATTERNS: Vec<Regex> = [
        r"\b\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}",
        r"\d{4}[-/.]\d{1,2}[-/.]\d{1,2}",
        r"(?i)(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2}[,\s]+\d{2,4}",
        r"(?i)(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2}[,\s]+\d{2,4}",
        r"(?i)\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{2,4}",
        r"(?i)\d{1,2}\s+(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{2,4}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    /// Labeled invoice/reference number patterns, tried in order.
    /// Group 1 is the identifier.
    pub static ref INVOICE_NUMBER_PATTERNS: Vec<Regex> = [
        format!(r"(?i)invoice\s*(?:number|num|no|nr)\b\.?\s*[:#]?\s*{ID_TOKEN}"),
        format!(r"(?i)invoice\s*#\s*:?\s*{ID_TOKEN}"),
        format!(r"(?i)\binv\b\.?\s*(?:no\b\.?|#)\s*:?\s*{ID_TOKEN}"),
        format!(r"(?i)order\s*(?:number|no\b\.?|#)\s*:?\s*{ID_TOKEN}"),
        format!(r"(?i)ref(?:erence)?\s*(?:number|no\b\.?|#)\s*:?\s*{ID_TOKEN}"),
        format!(r"#\s*{ID_TOKEN}"),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    /// Alphanumeric run of at least three characters.
    pub static ref ALNUM_RUN: Regex = Regex::new(r"[A-Za-z0-9][A-Za-z0-9\-]{2,}").unwrap();

    /// Five or more consecutive digits.
    pub static ref DIGIT_RUN: Regex = Regex::new(r"\d{5,}").unwrap();

    // Domains
    pub static ref WEBSITE_DOMAIN: Regex = Regex::new(
        r"(?i)www\.((?:[a-z0-9][-a-z0-9]*\.)+[a-z0-9][-a-z0-9]*)"
    ).unwrap();

    pub static ref EMAIL_DOMAIN: Regex = Regex::new(
        r"(?i)@((?:[a-z0-9][-a-z0-9]*\.)+[a-z0-9][-a-z0-9]*)"
    ).unwrap();

    pub static ref URL_DOMAIN: Regex = Regex::new(
        r"(?i)https?://((?:[a-z0-9][-a-z0-9]*\.)+[a-z0-9][-a-z0-9]*)"
    ).unwrap();

    /// House number followed by a street-type word.
    pub static ref STREET_ADDRESS: Regex = Regex::new(
        r"(?i)\d+\s+[a-z0-9\s,]+(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|way|place|pl|court|ct)\b"
    ).unwrap();

    pub static ref NON_ALNUM: Regex = Regex::new(r"[^a-zA-Z0-9]").unwrap();

    /// Lowercase letter directly followed by an uppercase one.
    pub static ref CAMEL_BOUNDARY: Regex = Regex::new(r"([a-z])([A-Z])").unwrap();
}
