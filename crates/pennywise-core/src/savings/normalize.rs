//! Item name normalization
//!
//! Matching keys are lower-cased and trimmed, nothing more. There is no
//! stemming or plural handling, so "egg" and "eggs" are different exact keys
//! and only meet in the fuzzy pass.

/// Map a raw item name to its matching key
pub fn normalize_item_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whitespace-separated tokens of an already normalized name
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}

/// Token-overlap test used by the fuzzy pass
///
/// Two names overlap when any token of one contains, or is contained in, any
/// token of the other. Both inputs must already be normalized. This is a
/// crude heuristic: "ham" overlaps "hamburger buns".
pub fn names_overlap(a: &str, b: &str) -> bool {
    tokens(a).any(|ta| tokens(b).any(|tb| ta.contains(tb) || tb.contains(ta)))
}
