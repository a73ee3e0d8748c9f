// src/utils/text.rs

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static CITATION_MARKERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").unwrap());

/// Collapses whitespace runs to single spaces, strips bracketed citation
/// markers (`[1]`, `[citation needed]`, ...), and trims the ends.
pub fn clean_prose(raw: &str) -> String {
    let collapsed = WHITESPACE_RUNS.replace_all(raw, " ");
    let stripped = CITATION_MARKERS.replace_all(&collapsed, "");
    stripped.trim().to_string()
}

/// Keeps the first `max` whitespace-delimited words, rejoined with single
/// spaces. Also renormalizes any whitespace left behind by citation removal.
pub fn truncate_words(text: &str, max: usize) -> String {
    text.split_whitespace().take(max).collect::<Vec<_>>().join(" ")
}
