use crate::domain::model::CodeSet;
use crate::extract::scanner::scan_element;
use crate::extract::section::{locate_table, HeaderMatch, Locate};
use scraper::Html;

pub const EXPIRED_ANCHOR: &str = "All_Expired_SHiFT_Codes_in_Borderlands_4";
pub const EXPIRED_HEADER_PREFIX: &str = "all expired shift codes";

const EXPIRED_SECTION: &[Locate<'static>] = &[
    Locate::Anchor(EXPIRED_ANCHOR),
    Locate::HeaderCell(HeaderMatch::StartsWith(EXPIRED_HEADER_PREFIX)),
];

/// Codes listed in the expired section's table. Empty when the section is absent.
pub fn expired_codes(document: &Html) -> CodeSet {
    match locate_table(document, EXPIRED_SECTION) {
        Some(table) => scan_element(table),
        None => {
            tracing::debug!("No expired section found on page");
            CodeSet::new()
        }
    }
}
