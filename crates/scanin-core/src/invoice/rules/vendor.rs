//! Vendor (issuer) name extraction.
//!
//! Company names usually sit in the top-left corner of an invoice, often
//! next to a logo and above the street address. Web and email domains
//! printed elsewhere on the page help confirm which line is the name.

use crate::models::invoice::UNKNOWN;
use crate::ocr::{Page, TextLine, Zone};

use super::domains::{clean_for_comparison, main_part, readable_name, Domains};
use super::patterns::STREET_ADDRESS;
use super::{run_cascade, FieldResolver, Strategy};

/// How many top-left lines are considered logo text.
const MAX_LOGO_CANDIDATES: usize = 3;

/// Words marking a document heading rather than a company name.
const HEADING_WORDS: &[&str] = &["invoice", "bill", "receipt", "statement"];

/// Words marking a label line rather than a company name.
const LABEL_WORDS: &[&str] = &[
    "invoice",
    "bill",
    "receipt",
    "statement",
    "account",
    "date",
    "number",
];

const STRATEGIES: &[Strategy<String>] = &[
    Strategy::new("logo matches domain", logo_matches_domain),
    Strategy::new("line above address", line_above_address),
    Strategy::new("logo text", logo_text),
    Strategy::new("name from domain", name_from_domain),
    Strategy::new("longest top-left line", longest_top_left_line),
    Strategy::new("first header line", first_header_line),
];

/// Vendor name resolver.
pub struct VendorResolver;

impl VendorResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VendorResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldResolver for VendorResolver {
    type Output = String;

    fn resolve(&self, lines: &[TextLine]) -> Option<String> {
        let page = Page::new(lines);
        if page.is_empty() {
            return None;
        }
        run_cascade("vendor_name", &page, STRATEGIES)
    }
}

/// Resolve the vendor name, or [`UNKNOWN`].
pub fn resolve_vendor(lines: &[TextLine]) -> String {
    VendorResolver::new()
        .resolve(lines)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The first few top-left lines, trimmed, longer than two characters.
fn logo_candidates<'a>(page: &Page<'a>) -> Vec<&'a str> {
    page.in_zone_sorted(Zone::Logo)
        .into_iter()
        .take(MAX_LOGO_CANDIDATES)
        .map(|line| line.text.trim())
        .filter(|text| char_len(text) > 2)
        .collect()
}

fn contains_word(text: &str, words: &[&str]) -> bool {
    let lower = text.to_lowercase();
    words.iter().any(|w| lower.contains(w))
}

fn logo_matches_domain(page: &Page<'_>) -> Option<String> {
    let domains = Domains::collect(page.lines);
    let candidates = logo_candidates(page);

    for part in &domains.main_parts {
        let part = clean_for_comparison(part);
        if part.is_empty() {
            continue;
        }

        for logo in &candidates {
            let cleaned = clean_for_comparison(logo);
            if cleaned.is_empty() {
                continue;
            }
            if cleaned.contains(&part) || (part.contains(&cleaned) && char_len(logo) > 3) {
                return Some(logo.to_string());
            }
        }
    }

    None
}

fn line_above_address(page: &Page<'_>) -> Option<String> {
    let logo_lines = page.in_zone_sorted(Zone::Logo);
    let address_idx = logo_lines
        .iter()
        .position(|line| STREET_ADDRESS.is_match(&line.text))?;
    if address_idx == 0 {
        return None;
    }

    let name = logo_lines[address_idx - 1].text.trim();
    if Domains::collect(page.lines).cross_references(name) {
        return Some(name.to_string());
    }

    let lower = name.to_lowercase();
    (char_len(name) > 3 && !lower.contains("invoice") && !lower.contains("bill"))
        .then(|| name.to_string())
}

fn logo_text(page: &Page<'_>) -> Option<String> {
    logo_candidates(page)
        .into_iter()
        .find(|text| !contains_word(text, HEADING_WORDS))
        .map(str::to_string)
}

fn name_from_domain(page: &Page<'_>) -> Option<String> {
    let domains = Domains::collect(page.lines);

    let mut best: Option<String> = None;
    for domain in domains.unique() {
        let name = readable_name(main_part(domain));
        let longer = best
            .as_ref()
            .is_none_or(|current| char_len(&name) > char_len(current));
        if longer {
            best = Some(name);
        }
    }

    best.filter(|name| !name.is_empty())
}

fn longest_top_left_line(page: &Page<'_>) -> Option<String> {
    let candidates: Vec<&str> = page
        .in_zone_sorted(Zone::Logo)
        .into_iter()
        .map(|line| line.text.trim())
        .filter(|text| char_len(text) > 3 && !contains_word(text, LABEL_WORDS))
        .collect();

    longest(candidates.iter().copied().filter(|text| text.split_whitespace().count() > 1))
        .or_else(|| longest(candidates.iter().copied()))
        .map(str::to_string)
}

/// Longest text by character count; the first wins a tie.
fn longest<'a>(texts: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    texts.fold(None, |best, text| match best {
        Some(current) if char_len(text) <= char_len(current) => Some(current),
        _ => Some(text),
    })
}

fn first_header_line(page: &Page<'_>) -> Option<String> {
    page.in_zone_sorted(Zone::Top)
        .into_iter()
        .map(|line| line.text.trim())
        .find(|text| char_len(text) > 3)
        .map(str::to_string)
}
