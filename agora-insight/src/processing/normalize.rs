//! Text normalization shared by duplicate detection, scoring, and quote selection.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// Placeholders inserted by the upstream anonymizer.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(EMAIL|URL|PHONE|USER|SELF-ID)\]").unwrap());

/// Normalize text for duplicate comparison.
///
/// Case-folds, drops every character that is neither alphanumeric nor
/// whitespace, collapses whitespace runs and trims. `"Hello,  World!"` and
/// `"hello world"` normalize to the same key.
pub fn normalize_for_comparison(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    WHITESPACE_RE.replace_all(stripped.trim(), " ").into_owned()
}

/// Clean text before lexicon scoring: strip anonymizer placeholders,
/// fold typographic apostrophes to `'`, collapse whitespace, lowercase.
pub fn clean_text(text: &str) -> String {
    let without_placeholders = PLACEHOLDER_RE.replace_all(text, "");
    let folded = without_placeholders.replace(['\u{2019}', '\u{2018}'], "'");
    WHITESPACE_RE.replace_all(folded.trim(), " ").to_lowercase()
}

/// Split cleaned text into word tokens (alphanumerics and inner apostrophes).
pub fn tokenize(cleaned: &str) -> Vec<&str> {
    cleaned
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .collect()
}
