//! Near-duplicate collapse for raw multi-source snippet batches.

use std::collections::HashSet;

use crate::types::Snippet;

/// Snippets at or below this many characters carry too little signal to keep.
const MIN_TEXT_CHARS: usize = 20;
/// Normalization keys compare only this many leading characters.
const KEY_PREFIX_CHARS: usize = 100;

/// Collapse a raw batch into a clean candidate set.
///
/// Drops snippets whose text is `MIN_TEXT_CHARS` characters or shorter, then
/// keeps the first snippet seen for each distinct normalization key. Input
/// order is preserved, so for a fixed concatenation order of upstream sources
/// the earlier source wins deterministically. Equality on the truncated key is
/// the only matching performed; no fuzzy similarity.
#[must_use]
pub fn dedupe(snippets: Vec<Snippet>) -> Vec<Snippet> {
    let mut seen: HashSet<String> = HashSet::new();
    snippets
        .into_iter()
        .filter(|snippet| snippet.text.chars().count() > MIN_TEXT_CHARS)
        .filter(|snippet| seen.insert(normalization_key(&snippet.text)))
        .collect()
}

/// Lower-case, truncate to the first `KEY_PREFIX_CHARS` characters, and
/// collapse consecutive whitespace to a single space.
pub(crate) fn normalization_key(text: &str) -> String {
    let truncated: String = text.to_lowercase().chars().take(KEY_PREFIX_CHARS).collect();
    truncated.split_whitespace().collect::<Vec<_>>().join(" ")
}
