use crate::domain::model::{ClassHint, CodeSet};
use crate::extract::scanner::collect_text_codes;
use scraper::{Html, Selector};

/// Result of scanning only the elements a [`ClassHint`] selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassScan {
    /// The selector matched no element (or could not be parsed).
    NoMatch,
    /// Elements matched but their text held no valid codes.
    MatchedEmpty,
    /// Sorted, distinct codes from the matched elements.
    Matched(Vec<String>),
}

impl ClassScan {
    /// `(codes, matched)` view of the outcome.
    pub fn into_parts(self) -> (Vec<String>, bool) {
        match self {
            ClassScan::NoMatch => (Vec::new(), false),
            ClassScan::MatchedEmpty => (Vec::new(), true),
            ClassScan::Matched(codes) => (codes, true),
        }
    }
}

/// Scans the text of every element matching `tag.token1.token2...`. An element
/// must carry all tokens.
pub fn scan_by_class(document: &Html, hint: &ClassHint) -> ClassScan {
    let selector_text = hint.selector();
    let selector = match Selector::parse(&selector_text) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::debug!("Invalid selector '{}': {:?}", selector_text, e);
            return ClassScan::NoMatch;
        }
    };

    let mut matched = false;
    let mut codes = CodeSet::new();
    for element in document.select(&selector) {
        matched = true;
        collect_text_codes(element, &mut codes);
    }

    match (matched, codes.is_empty()) {
        (false, _) => ClassScan::NoMatch,
        (true, true) => ClassScan::MatchedEmpty,
        (true, false) => ClassScan::Matched(codes.into_iter().collect()),
    }
}
