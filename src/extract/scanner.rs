//! Page-wide code discovery over visible text and attribute values.

use crate::domain::model::CodeSet;
use crate::extract::tokenizer::tokenize;
use scraper::{ElementRef, Html};

/// Elements whose text content is never rendered.
const HIDDEN_TEXT_PARENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Stripped, non-empty text fragments under `element` in document order.
pub(crate) fn text_fragments<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TEXT_PARENTS.contains(&el.name()))
        });
        if hidden {
            return None;
        }
        let trimmed = text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

/// Visible text of `element`, fragments joined by a single space.
pub(crate) fn joined_text(element: ElementRef<'_>) -> String {
    text_fragments(element).collect::<Vec<_>>().join(" ")
}

pub(crate) fn collect_text_codes(element: ElementRef<'_>, into: &mut CodeSet) {
    for fragment in text_fragments(element) {
        into.extend(tokenize(fragment));
    }
}

pub(crate) fn collect_attribute_codes(element: ElementRef<'_>, into: &mut CodeSet) {
    for node in element.descendants() {
        if let Some(el) = node.value().as_element() {
            for (_, value) in el.attrs() {
                into.extend(tokenize(value));
            }
        }
    }
}

/// Codes in the visible text and attributes of `element` and its descendants.
pub fn scan_element(element: ElementRef<'_>) -> CodeSet {
    let mut codes = CodeSet::new();
    collect_text_codes(element, &mut codes);
    collect_attribute_codes(element, &mut codes);
    codes
}

/// Every distinct code anywhere in the document, sorted.
pub fn scan_document(document: &Html) -> Vec<String> {
    scan_element(document.root_element()).into_iter().collect()
}
