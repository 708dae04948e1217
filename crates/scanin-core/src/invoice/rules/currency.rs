//! Currency detection.

use tracing::debug;

use crate::models::invoice::Currency;
use crate::ocr::TextLine;

/// Weighted currency signals found in a single line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    usd: u32,
    eur: u32,
    gbp: u32,
}

impl Tally {
    fn add_line(&mut self, text: &str) {
        let lower = text.to_lowercase();

        if text.contains('$') {
            self.usd += 1;
        }
        if text.contains('€') {
            self.eur += 2;
        }
        if text.contains('£') {
            self.gbp += 1;
        }
        if lower.contains("usd") || lower.contains("dollar") {
            self.usd += 1;
        }
        if lower.contains("eur") || lower.contains("euro") {
            self.eur += 2;
        }
        if lower.contains("gbp") || lower.contains("pound") {
            self.gbp += 1;
        }
    }

    /// The single highest count, or `None` on a tie or no signal at all.
    fn winner(&self) -> Option<Currency> {
        let counts = [
            (Currency::Usd, self.usd),
            (Currency::Eur, self.eur),
            (Currency::Gbp, self.gbp),
        ];
        let best = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
        if best == 0 {
            return None;
        }

        let mut leaders = counts.iter().filter(|(_, n)| *n == best);
        let leader = leaders.next().map(|(c, _)| *c);
        if leaders.next().is_some() {
            return None;
        }
        leader
    }
}

/// Detect the dominant currency of a document.
///
/// `€` and the words "eur"/"euro" count double. A tie, or no currency
/// signal at all, yields `default`.
pub fn detect_document_currency(lines: &[TextLine], default: Currency) -> Currency {
    let mut tally = Tally::default();
    for line in lines {
        tally.add_line(&line.text);
    }

    let currency = tally.winner().unwrap_or(default);
    debug!(
        "Document currency {} (usd={}, eur={}, gbp={})",
        currency, tally.usd, tally.eur, tally.gbp
    );
    currency
}

/// Currency implied by symbols literally present in a line.
///
/// Checked in the order `$`, `€`/"eur", `£`/"gbp"; the first hit wins.
pub fn currency_in_line(text: &str) -> Option<Currency> {
    let lower = text.to_lowercase();

    if text.contains('$') {
        Some(Currency::Usd)
    } else if text.contains('€') || lower.contains("eur") {
        Some(Currency::Eur)
    } else if text.contains('£') || lower.contains("gbp") {
        Some(Currency::Gbp)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<TextLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextLine::new(*t, 0, i as i32 * 10, 100, 10))
            .collect()
    }

    #[test]
    fn test_euro_outweighs_dollar_code() {
        let doc = lines(&["Total € 12.00 (usd 13.00)"]);
        assert_eq!(detect_document_currency(&doc, Currency::Eur), Currency::Eur);
        assert_eq!(detect_document_currency(&doc, Currency::Usd), Currency::Eur);
    }

    #[test]
    fn test_no_signal_uses_default() {
        let doc = lines(&["Total: 99.99"]);
        assert_eq!(detect_document_currency(&doc, Currency::Eur), Currency::Eur);
        assert_eq!(detect_document_currency(&[], Currency::Gbp), Currency::Gbp);
    }

    #[test]
    fn test_tie_uses_default() {
        let doc = lines(&["$ 10.00", "£ 10.00"]);
        assert_eq!(detect_document_currency(&doc, Currency::Eur), Currency::Eur);
    }

    #[test]
    fn test_clear_winner() {
        let doc = lines(&["Subtotal $ 10.00", "Total USD 12.00"]);
        assert_eq!(detect_document_currency(&doc, Currency::Eur), Currency::Usd);

        let doc = lines(&["Price in pounds", "£ 5.00"]);
        assert_eq!(detect_document_currency(&doc, Currency::Eur), Currency::Gbp);
    }

    #[test]
    fn test_line_symbol_precedence() {
        assert_eq!(currency_in_line("$5 or €5"), Some(Currency::Usd));
        assert_eq!(currency_in_line("£5 or €5"), Some(Currency::Eur));
        assert_eq!(currency_in_line("5 GBP"), Some(Currency::Gbp));
        assert_eq!(currency_in_line("Total 5.00"), None);
    }
}
