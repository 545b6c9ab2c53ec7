use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Unique codes, kept sorted so every listing is deterministic.
pub type CodeSet = BTreeSet<String>;

/// Code -> human-readable expiration text. An empty string means unknown.
pub type ExpirationMap = BTreeMap<String, String>;

/// Tag plus the class tokens an element must carry for the scoped scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassHint {
    pub tag: String,
    pub tokens: Vec<String>,
}

impl ClassHint {
    pub fn new(tag: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            tag: tag.into(),
            tokens,
        }
    }

    /// Compound CSS selector, e.g. `span.task-name.bold.small`.
    pub fn selector(&self) -> String {
        let mut selector = self.tag.trim().to_string();
        for token in self.tokens.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            selector.push('.');
            selector.push_str(token);
        }
        selector
    }
}

/// Which scan produced the found codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    ClassScoped,
    PageWide,
}

/// Everything pulled out of a single parse of the page.
#[derive(Debug, Clone)]
pub struct PageScan {
    pub found: Vec<String>,
    pub strategy: ScanStrategy,
    pub expired: CodeSet,
    pub expirations: ExpirationMap,
}

/// Output of the extract phase.
#[derive(Debug, Clone)]
pub struct Harvest {
    pub known: CodeSet,
    pub scan: PageScan,
}

/// Output of the transform phase: codes not yet in the store.
#[derive(Debug, Clone, Default)]
pub struct NewCodes {
    pub codes: Vec<String>,
    pub expirations: ExpirationMap,
    pub found: usize,
    pub excluded_expired: usize,
}

/// One row of the CSV store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Date Added")]
    pub date_added: String,
    #[serde(rename = "Expiration")]
    pub expiration: String,
    #[serde(rename = "Redeemed")]
    pub redeemed: String,
}

impl CodeRecord {
    pub fn unredeemed(code: &str, date_added: &str, expiration: &str) -> Self {
        Self {
            code: code.to_string(),
            date_added: date_added.to_string(),
            expiration: expiration.to_string(),
            redeemed: "No".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub found: usize,
    pub excluded_expired: usize,
    pub new_codes: Vec<String>,
    pub written: usize,
    pub notified: bool,
    pub dry_run: bool,
}
