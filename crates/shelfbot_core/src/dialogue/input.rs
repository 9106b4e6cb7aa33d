//! Free-text input normalization.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Collapses whitespace runs and trims; `None` when nothing is left.
///
/// Used for single-line fields (title, author, search query).
pub fn normalize_line(text: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(text.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Trims multi-line text, keeping inner line breaks.
pub fn normalize_block(text: &str) -> String {
    text.trim().to_string()
}
