// Extraction layer: pure functions over a parsed document. No I/O here.

pub mod active;
pub mod class_scope;
pub mod expired;
pub mod scanner;
pub mod section;
pub mod tokenizer;

use crate::domain::model::{ClassHint, CodeSet, PageScan, ScanStrategy};
use class_scope::{scan_by_class, ClassScan};
use scraper::Html;

pub use active::active_expirations;
pub use expired::expired_codes;
pub use scanner::scan_document;
pub use tokenizer::{is_code, normalize_code, tokenize};

/// Parses `html` once and runs every scan the pipeline needs.
///
/// The class-scoped scan runs first when a hint is given; the page-wide scan
/// is the fallback whenever it produced no codes. The parsed document never
/// leaves this function.
pub fn scan_page(html: &str, hint: Option<&ClassHint>, include_expired: bool) -> PageScan {
    let document = Html::parse_document(html);

    let scoped = match hint {
        Some(hint) => {
            let scan = scan_by_class(&document, hint);
            log_class_scan(&scan, hint);
            scan.into_parts().0
        }
        None => Vec::new(),
    };

    let (found, strategy) = if scoped.is_empty() {
        (scan_document(&document), ScanStrategy::PageWide)
    } else {
        (scoped, ScanStrategy::ClassScoped)
    };
    tracing::info!(
        "Found {} code(s) on page{}",
        found.len(),
        if strategy == ScanStrategy::PageWide {
            " (page-wide scan)"
        } else {
            ""
        }
    );

    let expired = if include_expired {
        CodeSet::new()
    } else {
        expired_codes(&document)
    };

    PageScan {
        found,
        strategy,
        expired,
        expirations: active_expirations(&document),
    }
}

fn log_class_scan(scan: &ClassScan, hint: &ClassHint) {
    match scan {
        ClassScan::Matched(codes) => {
            tracing::info!("Class-based scan found {} code(s)", codes.len());
        }
        ClassScan::MatchedEmpty => {
            tracing::warn!(
                "Matched elements but found no valid codes; falling back to page-wide scan"
            );
        }
        ClassScan::NoMatch => {
            tracing::warn!(
                "No elements matched selector: {}; falling back to page-wide scan",
                hint.selector()
            );
        }
    }
}
