//! Invoice record produced by the field extraction engine.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Placeholder for a text field no strategy could resolve.
pub const UNKNOWN: &str = "UNKNOWN";

/// Currencies the engine recognizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US dollar.
    Usd,
    /// Euro, also the fallback when nothing in the document decides.
    #[default]
    Eur,
    /// Pound sterling.
    Gbp,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// Printed symbol.
    pub fn symbol(&self) -> char {
        match self {
            Currency::Usd => '$',
            Currency::Eur => '€',
            Currency::Gbp => '£',
        }
    }

    /// Map a captured symbol or code (`$`, `€`, `£`, `usd`, `EUR`, ...) to a currency.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim().to_lowercase().as_str() {
            "$" | "usd" => Some(Currency::Usd),
            "€" | "eur" => Some(Currency::Eur),
            "£" | "gbp" => Some(Currency::Gbp),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_marker(s).ok_or_else(|| ExtractionError::UnknownCurrency(s.to_string()))
    }
}

/// The structured result of field extraction for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Vendor (issuer) name, or [`UNKNOWN`].
    pub vendor_name: String,

    /// Invoice or reference number, or [`UNKNOWN`].
    pub invoice_number: String,

    /// Date exactly as printed on the document, or [`UNKNOWN`].
    pub date: String,

    /// Total amount; zero when no amount was found.
    pub total_amount: Decimal,

    /// Currency of the total amount.
    pub currency: Currency,
}

impl InvoiceRecord {
    /// A record with every field set to its sentinel.
    pub fn unknown(currency: Currency) -> Self {
        Self {
            vendor_name: UNKNOWN.to_string(),
            invoice_number: UNKNOWN.to_string(),
            date: UNKNOWN.to_string(),
            total_amount: Decimal::ZERO,
            currency,
        }
    }

    /// Names of the fields left at their sentinel value.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_unknown(&self.vendor_name) {
            missing.push("vendor_name");
        }
        if is_unknown(&self.invoice_number) {
            missing.push("invoice_number");
        }
        if is_unknown(&self.date) {
            missing.push("date");
        }
        if self.total_amount.is_zero() {
            missing.push("total_amount");
        }
        missing
    }

    /// Best-effort calendar interpretation of [`InvoiceRecord::date`].
    ///
    /// Numeric dates are read day-first, then month-first, unless they start
    /// with a four digit year. The `date` field itself is never rewritten.
    pub fn issue_date(&self) -> Option<NaiveDate> {
        if is_unknown(&self.date) {
            return None;
        }
        normalize_date(&self.date)
    }
}

/// Whether a text field holds the sentinel.
pub fn is_unknown(value: &str) -> bool {
    value == UNKNOWN
}

fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let mut month_name = None;
    let mut numbers: Vec<&str> = Vec::new();

    for token in raw.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
        if token.chars().all(|c| c.is_ascii_digit()) {
            numbers.push(token);
        } else if month_name.is_none() {
            month_name = month_from_name(token);
        }
    }

    match (month_name, numbers.as_slice()) {
        (Some(month), [day, year]) => {
            NaiveDate::from_ymd_opt(expand_year(year)?, month, day.parse().ok()?)
        }
        (None, [first, second, third]) if first.len() == 4 => NaiveDate::from_ymd_opt(
            first.parse().ok()?,
            second.parse().ok()?,
            third.parse().ok()?,
        ),
        (None, [first, second, third]) => {
            let year = expand_year(third)?;
            let a: u32 = first.parse().ok()?;
            let b: u32 = second.parse().ok()?;
            NaiveDate::from_ymd_opt(year, b, a).or_else(|| NaiveDate::from_ymd_opt(year, a, b))
        }
        _ => None,
    }
}

fn expand_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    Some(if s.len() <= 2 { 2000 + year } else { year })
}

fn month_from_name(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    let prefix = lower.get(..3)?;
    let month = match prefix {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_date(date: &str) -> InvoiceRecord {
        InvoiceRecord {
            date: date.to_string(),
            ..InvoiceRecord::unknown(Currency::Eur)
        }
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("usd".parse::<Currency>(), Ok(Currency::Usd));
        assert_eq!("€".parse::<Currency>(), Ok(Currency::Eur));
        assert_eq!(" GBP ".parse::<Currency>(), Ok(Currency::Gbp));
        assert_eq!(
            "JPY".parse::<Currency>(),
            Err(ExtractionError::UnknownCurrency("JPY".to_string()))
        );
    }

    #[test]
    fn test_currency_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::Gbp).unwrap(), "\"GBP\"");
        assert_eq!(Currency::default(), Currency::Eur);
        assert_eq!(Currency::Usd.to_string(), "USD");
    }

    #[test]
    fn test_unknown_record() {
        let record = InvoiceRecord::unknown(Currency::Eur);
        assert_eq!(record.vendor_name, UNKNOWN);
        assert_eq!(record.total_amount, Decimal::ZERO);
        assert_eq!(
            record.missing_fields(),
            vec!["vendor_name", "invoice_number", "date", "total_amount"]
        );
        assert_eq!(record.issue_date(), None);
    }

    #[test]
    fn test_issue_date_numeric() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(record_with_date("15/01/2024").issue_date(), expected);
        assert_eq!(record_with_date("01/15/2024").issue_date(), expected);
        assert_eq!(record_with_date("2024-01-15").issue_date(), expected);
        assert_eq!(record_with_date("15.01.24").issue_date(), expected);
    }

    #[test]
    fn test_issue_date_month_names() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(record_with_date("March 5, 2024").issue_date(), expected);
        assert_eq!(record_with_date("Mar. 5 2024").issue_date(), expected);
        assert_eq!(record_with_date("5 March 2024").issue_date(), expected);
    }

    #[test]
    fn test_issue_date_rejects_impossible_dates() {
        assert_eq!(record_with_date("45/45/2024").issue_date(), None);
    }
}
