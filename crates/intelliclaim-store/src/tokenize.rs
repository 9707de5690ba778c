use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("valid word regex"));

/// Lowercased words longer than two characters, with a plural `s` dropped.
pub(crate) fn tokenize(text: &str) -> HashSet<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str())
        .filter(|w| w.len() > 2)
        .map(|w| match w.strip_suffix('s') {
            Some(stem) if stem.len() > 2 && !stem.ends_with('s') => stem.to_string(),
            _ => w.to_string(),
        })
        .collect()
}

/// Fraction of `query` words that also occur in `text`.
pub(crate) fn overlap_score(query: &HashSet<String>, text: &str) -> f32 {
    if query.is_empty() {
        return 0.0;
    }
    let words = tokenize(text);
    let common = query.iter().filter(|w| words.contains(*w)).count();
    common as f32 / query.len() as f32
}
