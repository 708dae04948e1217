//! Rule-based field resolvers.
//!
//! Each resolver is an ordered table of independent strategies. The first
//! strategy that produces a value wins; the rest are never consulted.

pub mod amounts;
pub mod currency;
pub mod dates;
pub mod domains;
pub mod invoice_number;
pub mod numbers;
pub mod patterns;
pub mod vendor;

pub use amounts::{resolve_total, AmountResolver, TotalAmount};
pub use currency::{detect_document_currency, currency_in_line};
pub use dates::{resolve_date, DateResolver};
pub use invoice_number::{resolve_invoice_number, InvoiceNumberResolver};
pub use numbers::parse_amount;
pub use vendor::{resolve_vendor, VendorResolver};

use tracing::{debug, trace};

use crate::ocr::{Page, TextLine};

/// Trait for field resolvers.
pub trait FieldResolver {
    /// The type of value this resolver produces.
    type Output;

    /// Resolve the field from a line list, or `None` if no strategy matched.
    fn resolve(&self, lines: &[TextLine]) -> Option<Self::Output>;
}

/// A named extraction strategy.
pub struct Strategy<T> {
    pub name: &'static str,
    pub run: fn(&Page<'_>) -> Option<T>,
}

impl<T> Strategy<T> {
    pub const fn new(name: &'static str, run: fn(&Page<'_>) -> Option<T>) -> Self {
        Self { name, run }
    }
}

/// Run `strategies` in order and return the first success.
pub fn run_cascade<T>(field: &str, page: &Page<'_>, strategies: &[Strategy<T>]) -> Option<T> {
    for strategy in strategies {
        if let Some(value) = (strategy.run)(page) {
            debug!("{} resolved by '{}'", field, strategy.name);
            return Some(value);
        }
        trace!("{}: strategy '{}' found nothing", field, strategy.name);
    }

    debug!("{} not found after {} strategies", field, strategies.len());
    None
}
