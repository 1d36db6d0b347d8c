use std::collections::HashSet;

use tracing::{debug, trace};

use crate::config::SiteConfig;
use crate::models::{Product, RawCandidate};

/// Products surviving normalization, plus how many there were before the cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub products: Vec<Product>,
    pub total_found: usize,
}

/// Resolve `url` against `origin`. Anything starting with `http` is taken as
/// already absolute; empty input yields `None`.
pub fn absolute_url(url: &str, origin: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http") {
        return Some(url.to_string());
    }
    let origin = origin.trim_end_matches('/');
    if url.starts_with('/') {
        Some(format!("{origin}{url}"))
    } else {
        Some(format!("{origin}/{url}"))
    }
}

/// Whether the path of `link` points into a non-product section.
pub fn is_excluded(link: &str, fragments: &[String]) -> bool {
    let parsed = url::Url::parse(link).ok();
    let path = parsed.as_ref().map_or(link, |u| u.path());
    fragments.iter().any(|fragment| path.contains(fragment.as_str()))
}

/// Resolve, filter and deduplicate candidates in order, keeping the first
/// occurrence of each URL, then cap the result at `site.max_results`.
pub fn normalize(candidates: &[RawCandidate], site: &SiteConfig) -> Normalized {
    let origin = site.origin();
    let mut seen = HashSet::new();
    let mut products = Vec::new();
    let mut excluded = 0usize;
    let mut duplicates = 0usize;

    for candidate in candidates {
        let Some(source_url) = absolute_url(&candidate.source_url, origin) else {
            continue;
        };
        if is_excluded(&source_url, &site.excluded_path_fragments) {
            trace!(url = %source_url, "excluded non-product url");
            excluded += 1;
            continue;
        }
        if !seen.insert(source_url.clone()) {
            trace!(url = %source_url, "duplicate product url");
            duplicates += 1;
            continue;
        }

        products.push(Product {
            title: candidate.title.clone(),
            price: candidate.price.clone(),
            old_price: candidate.old_price.clone(),
            stock: None,
            image_url: candidate
                .image_url
                .as_deref()
                .and_then(|img| absolute_url(img, origin)),
            source_url,
        });
    }

    let total_found = products.len();
    products.truncate(site.max_results);
    debug!(
        total_found,
        returned = products.len(),
        excluded,
        duplicates,
        "normalized candidates"
    );

    Normalized { products, total_found }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, source_url: &str) -> RawCandidate {
        RawCandidate {
            title: title.to_string(),
            price: Some("€19,90".to_string()),
            old_price: None,
            image_url: Some("img/p.jpg".to_string()),
            source_url: source_url.to_string(),
        }
    }

    #[test]
    fn resolves_relative_urls_against_origin() {
        let origin = "https://example.com";
        assert_eq!(
            absolute_url("/en/100390-painting.html", origin).as_deref(),
            Some("https://example.com/en/100390-painting.html")
        );
        assert_eq!(
            absolute_url("en/1-rope.html", origin).as_deref(),
            Some("https://example.com/en/1-rope.html")
        );
        assert_eq!(
            absolute_url("https://cdn.test/x.jpg", origin).as_deref(),
            Some("https://cdn.test/x.jpg")
        );
        assert_eq!(absolute_url("", origin), None);
    }

    #[test]
    fn excludes_informational_sections() {
        let site = SiteConfig::default();
        let f = &site.excluded_path_fragments;
        assert!(is_excluded("https://example.com/content/about-us.html", f));
        assert!(is_excluded("https://example.com/en/contact-us.html", f));
        assert!(is_excluded("https://example.com/en/terms-of-sale.html", f));
        assert!(!is_excluded("https://example.com/en/100390-painting.html", f));
        // host names are not inspected
        assert!(!is_excluded("https://contact.example.com/en/1-rope.html", f));
    }

    #[test]
    fn dedups_by_resolved_url_keeping_first() {
        let site = SiteConfig::default();
        let mut second = candidate("Second copy", "https://nautichandler.com/en/1-rope.html");
        second.price = None;
        let input = vec![
            candidate("Rope", "/en/1-rope.html"),
            second,
            candidate("Cleat", "en/2-cleat.html"),
            candidate("About", "/content/4-about-us.html"),
        ];

        let out = normalize(&input, &site);
        assert_eq!(out.total_found, 2);
        let titles: Vec<_> = out.products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Rope", "Cleat"]);
        assert_eq!(out.products[0].source_url, "https://nautichandler.com/en/1-rope.html");
        assert_eq!(out.products[0].price.as_deref(), Some("€19,90"));
        assert_eq!(out.products[0].image_url.as_deref(), Some("https://nautichandler.com/img/p.jpg"));
        assert_eq!(out.products[0].stock, None);
    }

    #[test]
    fn caps_after_dedup() {
        let site = SiteConfig::default();
        let mut input = Vec::new();
        for i in 0..60 {
            // every product appears twice in a row
            input.push(candidate("Item", &format!("/en/{i}-item.html")));
            input.push(candidate("Item", &format!("/en/{i}-item.html")));
        }

        let out = normalize(&input, &site);
        assert_eq!(out.total_found, 60);
        assert_eq!(out.products.len(), 40);
        assert_eq!(out.products[39].source_url, "https://nautichandler.com/en/39-item.html");

        let unique: HashSet<_> = out.products.iter().map(|p| &p.source_url).collect();
        assert_eq!(unique.len(), out.products.len());
    }

    #[test]
    fn is_idempotent() {
        let site = SiteConfig::default();
        let input = vec![
            candidate("Rope", "/en/1-rope.html"),
            candidate("Rope", "/en/1-rope.html"),
            candidate("Privacy", "/en/privacy.html"),
        ];
        assert_eq!(normalize(&input, &site), normalize(&input, &site));
    }

    #[test]
    fn missing_image_stays_missing() {
        let site = SiteConfig::default();
        let mut c = candidate("Rope", "/en/1-rope.html");
        c.image_url = None;
        let out = normalize(&[c], &site);
        assert_eq!(out.products[0].image_url, None);
    }
}
