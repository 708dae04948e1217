//! Locale-agnostic amount parsing.
//!
//! Decides between European (`1.234,56`) and US (`1,234.56`) grouping from
//! the separators alone. Every amount the engine reports goes through
//! [`parse_amount`].

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ExtractionError;

/// Parse an amount string with `.`/`,` separators into a decimal.
///
/// Rules, by separator count:
/// - one comma with no period after it: the comma is the decimal point and
///   any periods are grouping;
/// - one period (commas before it): commas are grouping;
/// - no separators: plain integer;
/// - several periods: the last one is the decimal point, other periods and
///   all commas are grouping;
/// - several commas: the last one is the decimal point, other commas are
///   grouping.
pub fn parse_amount(raw: &str) -> Result<Decimal, ExtractionError> {
    let s = raw.trim();
    let comma_count = s.matches(',').count();
    let period_count = s.matches('.').count();

    let normalized = match (comma_count, period_count) {
        (1, _) if s.rfind(',') > s.rfind('.') => {
            let (integer, fraction) = split_last(s, ',');
            format!("{}.{}", integer.replace('.', ""), fraction)
        }
        (_, 1) => s.replace(',', ""),
        (0, 0) => s.to_string(),
        (_, p) if p > 1 => {
            let (integer, fraction) = split_last(s, '.');
            format!("{}.{}", integer.replace(['.', ','], ""), fraction)
        }
        _ => {
            let (integer, fraction) = split_last(s, ',');
            format!("{}.{}", integer.replace(',', ""), fraction)
        }
    };

    Decimal::from_str(&normalized).map_err(|_| ExtractionError::Parse {
        field: "amount".to_string(),
        value: raw.to_string(),
    })
}

fn split_last(s: &str, separator: char) -> (&str, &str) {
    match s.rfind(separator) {
        Some(idx) => (&s[..idx], &s[idx + separator.len_utf8()..]),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_european_and_us_grouping() {
        assert_eq!(parse_amount("1.234,56"), Ok(dec("1234.56")));
        assert_eq!(parse_amount("1,234.56"), Ok(dec("1234.56")));
        assert_eq!(parse_amount("1234.56"), Ok(dec("1234.56")));
        assert_eq!(parse_amount("1234,56"), Ok(dec("1234.56")));
    }

    #[test]
    fn test_multiple_separators_use_last_as_decimal() {
        assert_eq!(parse_amount("12.34.56"), Ok(dec("1234.56")));
        assert_eq!(parse_amount("1.234.567,89"), Ok(dec("1234567.89")));
        assert_eq!(parse_amount("12,345,678.90"), Ok(dec("12345678.90")));
        assert_eq!(parse_amount("1,234,56"), Ok(dec("1234.56")));
    }

    #[test]
    fn test_plain_integer() {
        assert_eq!(parse_amount("1234"), Ok(dec("1234")));
        assert_eq!(parse_amount(" 42 "), Ok(dec("42")));
    }

    #[test]
    fn test_non_numeric_residue_is_an_error() {
        assert_eq!(
            parse_amount("12a.50"),
            Err(ExtractionError::Parse {
                field: "amount".to_string(),
                value: "12a.50".to_string(),
            })
        );
        assert!(parse_amount("").is_err());
    }
}
