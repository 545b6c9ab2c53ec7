//! Locating a named page section and the data table that belongs to it.
//!
//! A section is found through an ordered list of [`Locate`] strategies; the
//! first one that yields a table wins.

use crate::extract::scanner::joined_text;
use scraper::{ElementRef, Html};

/// How a header cell's text is compared against a needle. Both sides are
/// compared lowercased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch<'q> {
    StartsWith(&'q str),
    Contains(&'q str),
}

impl HeaderMatch<'_> {
    fn accepts(&self, header_text: &str) -> bool {
        let text = header_text.to_lowercase();
        match self {
            HeaderMatch::StartsWith(prefix) => text.starts_with(&prefix.to_lowercase()),
            HeaderMatch::Contains(needle) => text.contains(&needle.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locate<'q> {
    /// Element id of the heading anchor; the first table after the heading is used.
    Anchor(&'q str),
    /// First `th` whose text matches; its enclosing table is used.
    HeaderCell(HeaderMatch<'q>),
}

impl Locate<'_> {
    fn find<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        match self {
            Locate::Anchor(id) => table_after_anchor(document, id),
            Locate::HeaderCell(matcher) => table_by_header_cell(document, matcher),
        }
    }
}

/// Returns the section's table, or `None` when no strategy locates one.
pub fn locate_table<'a>(document: &'a Html, strategies: &[Locate<'_>]) -> Option<ElementRef<'a>> {
    strategies.iter().find_map(|strategy| strategy.find(document))
}

fn is_tag(element: &ElementRef<'_>, names: &[&str]) -> bool {
    names.contains(&element.value().name())
}

fn table_after_anchor<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    let root = document.root_element();
    let anchor = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id() == Some(id))?;

    let heading = anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| is_tag(el, &["h2", "h3"]))
        .unwrap_or(anchor);

    // Document order: skip everything up to and including the heading itself.
    root.descendants()
        .skip_while(|node| node.id() != heading.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| is_tag(el, &["table"]))
}

fn table_by_header_cell<'a>(
    document: &'a Html,
    matcher: &HeaderMatch<'_>,
) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| is_tag(el, &["th"]))
        .filter(|th| matcher.accepts(&joined_text(*th)))
        .find_map(|th| {
            th.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| is_tag(el, &["table"]))
        })
}
