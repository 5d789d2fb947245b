use crate::classifier::classify;
use serde_json::{Map, Value};

pub const PRACTICE_PREFIX: &str = "Practice: ";

/// A card in a category list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub key: String,
    /// Set when a `"Practice: <key>"` sibling exists; opening the card offers a chooser.
    pub paired: bool,
}

pub fn practice_key(theory: &str) -> String {
    format!("{PRACTICE_PREFIX}{theory}")
}

/// The theory topic a practice key points at, if `key` uses the practice prefix.
pub fn theory_for(key: &str) -> Option<&str> {
    key.strip_prefix(PRACTICE_PREFIX)
}

/// Cards to show for a category: practice keys with a matching theory sibling are hidden
/// and their theory card is marked paired. Document order is kept.
pub fn list_entries(category: &Map<String, Value>) -> Vec<ListEntry> {
    let is_paired_practice =
        |key: &str| theory_for(key).is_some_and(|theory| category.contains_key(theory));

    category
        .keys()
        .filter(|key| !is_paired_practice(key))
        .map(|key| ListEntry {
            key: key.clone(),
            paired: category.contains_key(&practice_key(key)),
        })
        .collect()
}

/// Practice key to offer from a text leaf named `current` inside `parent`, when that
/// sibling exists and is itself a leaf.
pub fn practice_link(parent: &Map<String, Value>, current: &str) -> Option<String> {
    let key = practice_key(current);
    parent
        .get(&key)
        .filter(|node| classify(node).is_leaf())
        .map(|_| key)
}
