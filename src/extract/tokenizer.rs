use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9-]+").expect("separator pattern is valid"));

/// Five groups of five uppercase alphanumerics joined by hyphens.
static CODE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z0-9]{5}(?:-[A-Z0-9]{5}){4}$").expect("code pattern is valid")
});

/// Splits `text` on anything outside `[A-Za-z0-9-]` and returns the pieces that
/// are valid codes, upper-cased, in the order they appear. Duplicates are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    SEPARATOR
        .split(text)
        .filter(|piece| !piece.is_empty())
        .map(str::to_ascii_uppercase)
        .filter(|piece| is_code(piece))
        .collect()
}

/// True when `candidate` is already in canonical (uppercase) code form.
pub fn is_code(candidate: &str) -> bool {
    CODE_SHAPE.is_match(candidate)
}

/// Trims and upper-cases `raw`, returning it only if it is a valid code.
pub fn normalize_code(raw: &str) -> Option<String> {
    let token = raw.trim().to_ascii_uppercase();
    is_code(&token).then_some(token)
}
