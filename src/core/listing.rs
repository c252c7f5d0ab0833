//! Job card parsing for the staffing site's search results page.

use crate::domain::model::JobListing;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css}: {e}"))
}

static CARD: LazyLock<Selector> = LazyLock::new(|| selector(".job-result-card"));
static CARD_FALLBACK: LazyLock<Selector> = LazyLock::new(|| selector("div.job-listing-item"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h3"));
static TITLE_FALLBACK: LazyLock<Selector> = LazyLock::new(|| selector("h2"));
static EMPLOYER: LazyLock<Selector> = LazyLock::new(|| selector("div.employer-name"));
static EMPLOYER_FALLBACK: LazyLock<Selector> = LazyLock::new(|| selector("div.company-name"));
static LOCATION: LazyLock<Selector> = LazyLock::new(|| selector("div.location"));

/// Parses listing cards into [`JobListing`]s.
///
/// Cards are `.job-result-card` elements, or `div.job-listing-item` when the
/// page has none of those. Employer and location fall back to the given
/// placeholders; a card without a title is skipped.
pub fn parse_listings(html: &str, fallback_employer: &str, fallback_location: &str) -> Vec<JobListing> {
    let document = Html::parse_document(html);

    let mut cards: Vec<ElementRef> = document.select(&CARD).collect();
    if cards.is_empty() {
        cards = document.select(&CARD_FALLBACK).collect();
    }

    tracing::debug!("Found {} candidate job cards", cards.len());

    cards
        .into_iter()
        .enumerate()
        .filter_map(|(index, card)| {
            let Some(role) = first_text(card, &TITLE).or_else(|| first_text(card, &TITLE_FALLBACK))
            else {
                tracing::debug!("Skipping card #{}: no title", index + 1);
                return None;
            };

            let employer = first_text(card, &EMPLOYER)
                .or_else(|| first_text(card, &EMPLOYER_FALLBACK))
                .unwrap_or_else(|| fallback_employer.to_string());
            let location =
                first_text(card, &LOCATION).unwrap_or_else(|| fallback_location.to_string());

            Some(JobListing {
                role,
                employer,
                location,
            })
        })
        .collect()
}

/// Trimmed text of the first match, `None` if absent or blank.
fn first_text(card: ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}
