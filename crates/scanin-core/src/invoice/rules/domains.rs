//! Web and email domains found in a document, and the text normalization
//! used to compare them with company names.

use tracing::debug;

use crate::ocr::TextLine;

use super::patterns::{CAMEL_BOUNDARY, EMAIL_DOMAIN, NON_ALNUM, URL_DOMAIN, WEBSITE_DOMAIN};

/// Legal-form suffixes dropped before comparing names, in removal order.
const BUSINESS_SUFFIXES: &[&str] = &[
    " inc",
    " llc",
    " ltd",
    " limited",
    " corp",
    " corporation",
    " co",
    " company",
];

/// Mailbox/host prefixes dropped when turning a domain into a name.
const DOMAIN_PREFIXES: &[&str] = &["www", "mail", "info", "support", "contact", "sales"];

/// Domains collected from every line of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domains {
    /// Website and URL host domains, without a leading `www.`.
    pub websites: Vec<String>,
    /// Email domains.
    pub emails: Vec<String>,
    /// First label of every domain above, in discovery order.
    pub main_parts: Vec<String>,
}

impl Domains {
    /// Scan each line for `www.` hosts, email domains and `http(s)://` hosts.
    pub fn collect(lines: &[TextLine]) -> Self {
        let mut domains = Self::default();

        for line in lines {
            for caps in WEBSITE_DOMAIN.captures_iter(&line.text) {
                domains.add_website(&caps[1]);
            }
            for caps in EMAIL_DOMAIN.captures_iter(&line.text) {
                let domain = caps[1].to_string();
                domains.main_parts.push(main_part(&domain).to_string());
                domains.emails.push(domain);
            }
            for caps in URL_DOMAIN.captures_iter(&line.text) {
                let host = &caps[1];
                domains.add_website(host.strip_prefix("www.").unwrap_or(host));
            }
        }

        if !domains.is_empty() {
            debug!("Found domains: {:?}", domains.unique());
        }
        domains
    }

    fn add_website(&mut self, domain: &str) {
        self.main_parts.push(main_part(domain).to_string());
        self.websites.push(domain.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.websites.is_empty() && self.emails.is_empty()
    }

    /// Websites then emails, duplicates removed, first occurrence kept.
    pub fn unique(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for domain in self.websites.iter().chain(&self.emails) {
            if !seen.contains(&domain.as_str()) {
                seen.push(domain);
            }
        }
        seen
    }

    /// Whether `name` and some domain main part contain one another after
    /// cleaning. Empty cleaned values never match.
    pub fn cross_references(&self, name: &str) -> bool {
        let name = clean_for_comparison(name);
        if name.is_empty() {
            return false;
        }

        self.main_parts.iter().any(|part| {
            let part = clean_for_comparison(part);
            !part.is_empty() && (name.contains(&part) || part.contains(&name))
        })
    }
}

/// Label before the first `.` of a domain.
pub fn main_part(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}

/// Lowercase, drop legal-form suffixes, keep only ASCII letters and digits.
pub fn clean_for_comparison(text: &str) -> String {
    let mut text = text.to_lowercase();
    for suffix in BUSINESS_SUFFIXES {
        if let Some(stripped) = text.strip_suffix(suffix) {
            text = stripped.to_string();
        }
    }
    NON_ALNUM.replace_all(&text, "").into_owned()
}

/// Turn a domain label into a display name, e.g. `infoAcmeWidgets` into
/// `Acme Widgets` or `blue-sky` into `Blue Sky`.
pub fn readable_name(label: &str) -> String {
    let label = DOMAIN_PREFIXES
        .iter()
        .find_map(|prefix| label.strip_prefix(prefix))
        .unwrap_or(label);

    let spaced = NON_ALNUM.replace_all(label, " ");
    let split = CAMEL_BOUNDARY.replace_all(&spaced, "$1 $2");

    split
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut capitalized: String = first.to_uppercase().collect();
            capitalized.push_str(&chars.as_str().to_lowercase());
            capitalized
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(text: &str) -> TextLine {
        TextLine::new(text, 0, 0, 100, 20)
    }

    #[test]
    fn test_collect_domains() {
        let lines = vec![
            line("www.acmecorp.com"),
            line("billing@acme-mail.co.uk"),
            line("https://www.portal.example.org/pay"),
            line("see www.acmecorp.com"),
        ];
        let domains = Domains::collect(&lines);

        assert_eq!(
            domains.websites,
            vec![
                "acmecorp.com",
                "portal.example.org",
                "portal.example.org",
                "acmecorp.com"
            ]
        );
        assert_eq!(domains.emails, vec!["acme-mail.co.uk"]);
        assert_eq!(
            domains.main_parts,
            vec!["acmecorp", "acme-mail", "portal", "portal", "acmecorp"]
        );
        assert_eq!(
            domains.unique(),
            vec!["acmecorp.com", "portal.example.org", "acme-mail.co.uk"]
        );
    }

    #[test]
    fn test_clean_for_comparison() {
        assert_eq!(clean_for_comparison("Acme Corp"), "acme");
        assert_eq!(clean_for_comparison("Blue-Sky Ltd"), "bluesky");
        assert_eq!(clean_for_comparison("Widget Co"), "widget");
        assert_eq!(clean_for_comparison("!!!"), "");
    }

    #[test]
    fn test_cross_references() {
        let domains = Domains::collect(&[line("www.acmecorp.com")]);

        assert!(domains.cross_references("Acme Corp"));
        assert!(domains.cross_references("ACMECORP INC"));
        assert!(!domains.cross_references("Globex"));
        assert!(!domains.cross_references("..."));
    }

    #[test]
    fn test_readable_name() {
        assert_eq!(readable_name("acmecorp"), "Acmecorp");
        assert_eq!(readable_name("infoAcmeWidgets"), "Acme Widgets");
        assert_eq!(readable_name("blue-sky"), "Blue Sky");
        assert_eq!(readable_name("sales"), "");
    }
}
