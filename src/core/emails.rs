use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .unwrap_or_else(|e| panic!("invalid email pattern: {e}"))
});

static MAILTO_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href^="mailto:"]"#)
        .unwrap_or_else(|e| panic!("invalid mailto selector: {e}"))
});

/// Substrings that mark an address as junk: error-tracker DSNs, image
/// names like `logo@2x.png`, and placeholder domains.
pub const DEFAULT_DENYLIST: [&str; 5] = ["sentry", "example", "domain", ".png", ".jpg"];

#[derive(Debug, Clone)]
pub struct EmailExtractor {
    denylist: Vec<String>,
}

impl EmailExtractor {
    /// The built-in denylist plus `extra` entries.
    pub fn new(extra: &[String]) -> Self {
        let mut denylist: Vec<String> = DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect();
        denylist.extend(
            extra
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        );
        Self { denylist }
    }

    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        !self.denylist.iter().any(|junk| email.contains(junk.as_str()))
    }

    /// Collects addresses from the page text and its `mailto:` links.
    pub fn extract_from_html(&self, html: &str) -> BTreeSet<String> {
        let document = Html::parse_document(html);
        let text = document.root_element().text().collect::<Vec<_>>().join(" ");

        let from_text = EMAIL_PATTERN
            .find_iter(&text)
            .map(|m| m.as_str().to_string());

        let from_links = document
            .select(&MAILTO_LINK)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(mailto_address);

        from_text
            .chain(from_links)
            .filter(|email| self.is_allowed(email))
            .collect()
    }
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// `mailto:office%40church.org?subject=Hi` -> `office@church.org`
fn mailto_address(href: &str) -> Option<String> {
    let address = href.strip_prefix("mailto:")?;
    let address = address.split('?').next().unwrap_or_default();
    let address = urlencoding::decode(address).ok()?;
    let address = address.trim();
    address.contains('@').then(|| address.to_string())
}
