use tracing::{debug, trace};

use crate::config::SiteConfig;
use crate::dom::{DomDocument, DomElement};
use crate::models::RawCandidate;
use crate::rules::{self, FieldRules};

/// Titles shorter than this are icons or empty spans, not product names.
pub const MIN_TITLE_CHARS: usize = 3;

/// Scan every product link in `document` and pull a candidate out of its card.
///
/// Never fails: missing fields stay `None` and links without a usable card
/// are skipped. Candidates come back in document order.
pub fn parse_candidates<D: DomDocument>(
    document: &D,
    site: &SiteConfig,
    rules: &FieldRules,
) -> Vec<RawCandidate> {
    let links: Vec<_> = document
        .elements()
        .into_iter()
        .filter(|e| is_product_link(e, &site.product_suffix))
        .collect();
    debug!("product links: {}", links.len());

    let candidates: Vec<RawCandidate> = links
        .iter()
        .filter_map(|link| parse_candidate(link, site, rules))
        .collect();
    debug!("kept {} of {} product links as candidates", candidates.len(), links.len());
    candidates
}

fn is_product_link<E: DomElement>(element: &E, suffix: &str) -> bool {
    element.tag_name() == "a"
        && element
            .attribute("href")
            .is_some_and(|href| href.ends_with(suffix))
}

/// Quick-view triggers and nofollow duplicates point at the same product
/// as the canonical link but are not it.
fn is_auxiliary_link<E: DomElement>(link: &E) -> bool {
    let text = link.text_content().trim().to_lowercase();
    let class = link.attribute("class").unwrap_or_default().to_lowercase();
    let rel = link.attribute("rel").unwrap_or_default().to_lowercase();

    text.contains("quick view") || class.contains("quick-view") || rel.contains("nofollow")
}

fn find_card<E: DomElement>(link: &E) -> Option<E> {
    rules::CARD_TAGS.iter().find_map(|tag| link.closest(tag))
}

fn parse_candidate<E: DomElement>(link: &E, site: &SiteConfig, rules: &FieldRules) -> Option<RawCandidate> {
    let href = link.attribute("href")?;

    if is_auxiliary_link(link) {
        trace!(href, "skipping auxiliary link");
        return None;
    }

    let Some(card) = find_card(link) else {
        trace!(href, "no card around link");
        return None;
    };

    let title = rules::first_value(&rules.title, &card, link).unwrap_or_default();
    if title.chars().count() < MIN_TITLE_CHARS {
        trace!(href, title = %title, "title too short");
        return None;
    }

    let price = rules::first_value(&rules.price, &card, link);
    let old_price = rules::first_value(&rules.old_price, &card, link);
    let image_url = rules::first_value(&rules.image, &card, link);

    let has_currency = price
        .as_deref()
        .is_some_and(|p| p.contains(site.currency_symbol.as_str()));
    if !has_currency && image_url.is_none() {
        trace!(href, title = %title, "no price or image in card");
        return None;
    }

    Some(RawCandidate {
        title,
        price,
        old_price,
        image_url,
        source_url: href.to_string(),
    })
}
