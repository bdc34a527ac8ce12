// ABOUTME: Derives normalized id/class token sets used for cluster affinity tests.
// ABOUTME: Comment-like regions yield no tokens so they can only join a cluster by score and proximity.

use std::collections::BTreeSet;

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use scraper::ElementRef;

/// Substrings that mark a region as discussion rather than article.
const HARD_NEGATIVE_MARKERS: &[&str] = &["comment", "disqus", "reply"];

/// Tokens too generic to signal affinity.
const STOP_WORDS: &[&str] = &["nav", "footer", "header"];

const MIN_TOKEN_LEN: usize = 3;

static HARD_NEGATIVES: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(HARD_NEGATIVE_MARKERS).unwrap());

/// Token set for an element's `id` and `class` attributes.
pub fn element_tokens(element: &ElementRef) -> BTreeSet<String> {
    let value = element.value();
    tokens_from_attrs(value.id(), value.attr("class"))
}

/// Token set for raw `id` / `class` attribute text.
pub fn tokens_from_attrs(id: Option<&str>, class: Option<&str>) -> BTreeSet<String> {
    let combined = format!("{} {}", id.unwrap_or(""), class.unwrap_or("")).to_lowercase();

    if HARD_NEGATIVES.is_match(&combined) {
        return BTreeSet::new();
    }

    combined
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}
