//! Field extraction rules.
//!
//! Each field is read through an ordered chain of [`Pick`]s evaluated against
//! the product card. The first pick yielding a non-empty value wins, so more
//! specific selectors must come before the substring-based ones.

use crate::dom::DomElement;

/// Ancestors tried, in order, when looking for a link's product card.
pub const CARD_TAGS: &[&str] = &["article", "li", "div"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Tag(&'static str),
    Class(&'static str),
    /// Substring match on the raw class attribute.
    ClassContains(&'static str),
    TagWithinClass { tag: &'static str, class: &'static str },
}

impl Query {
    pub fn matches<E: DomElement>(&self, element: &E) -> bool {
        match *self {
            Query::Tag(tag) => element.tag_name() == tag,
            Query::Class(class) => element.has_class(class),
            Query::ClassContains(fragment) => element
                .attribute("class")
                .is_some_and(|classes| classes.contains(fragment)),
            Query::TagWithinClass { tag, class } => {
                element.tag_name() == tag && element.has_ancestor(|e| e.has_class(class))
            }
        }
    }

    pub fn first_in<E: DomElement>(&self, scope: &E) -> Option<E> {
        scope.find_descendant(&|e| self.matches(e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Text(Query),
    Attr(Query, &'static str),
    /// Read from the product link rather than the card.
    LinkAttr(&'static str),
}

impl Pick {
    /// Only the first matching element is consulted: an empty match yields
    /// `None` rather than moving on to later matches.
    pub fn apply<E: DomElement>(&self, card: &E, link: &E) -> Option<String> {
        let value = match *self {
            Pick::Text(query) => query.first_in(card)?.text_content(),
            Pick::Attr(query, name) => query.first_in(card)?.attribute(name)?.to_string(),
            Pick::LinkAttr(name) => link.attribute(name)?.to_string(),
        };
        non_empty(value)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn first_value<E: DomElement>(chain: &[Pick], card: &E, link: &E) -> Option<String> {
    chain.iter().find_map(|pick| pick.apply(card, link))
}

pub const TITLE: &[Pick] = &[
    Pick::Text(Query::Class("product-title")),
    Pick::Text(Query::TagWithinClass { tag: "a", class: "product-title" }),
    Pick::Text(Query::Tag("h2")),
    Pick::Text(Query::Tag("h3")),
    Pick::LinkAttr("title"),
];

pub const PRICE: &[Pick] = &[
    Pick::Text(Query::Class("price")),
    Pick::Text(Query::ClassContains("price")),
];

pub const OLD_PRICE: &[Pick] = &[
    Pick::Text(Query::Class("regular-price")),
    Pick::Text(Query::ClassContains("regular")),
];

/// Lazy-load attributes come first: `src` often holds a placeholder until scroll.
pub const IMAGE: &[Pick] = &[
    Pick::Attr(Query::Tag("img"), "data-src"),
    Pick::Attr(Query::Tag("img"), "data-original"),
    Pick::Attr(Query::Tag("img"), "src"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRules {
    pub title: Vec<Pick>,
    pub price: Vec<Pick>,
    pub old_price: Vec<Pick>,
    pub image: Vec<Pick>,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            title: TITLE.to_vec(),
            price: PRICE.to_vec(),
            old_price: OLD_PRICE.to_vec(),
            image: IMAGE.to_vec(),
        }
    }
}
