//! Generic text canonicalization primitives.
//!
//! These are the building blocks the domain normalizers compose: NFKC
//! folding, whitespace collapsing, case folding, and character-class
//! filters. All of them are pure, O(n), and idempotent.

use unicode_normalization::UnicodeNormalization;

/// NFKC-normalize so visually equivalent sequences compare equal.
pub fn fold_unicode(s: &str) -> String {
    s.nfkc().collect()
}

/// Collapse runs of whitespace to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim leading and trailing whitespace.
pub fn trim(s: &str) -> String {
    s.trim().to_string()
}

/// Locale-free lowercasing.
pub fn lowercase(s: &str) -> String {
    s.to_lowercase()
}

/// Locale-free uppercasing.
pub fn uppercase(s: &str) -> String {
    s.to_uppercase()
}

/// Keep only alphanumeric characters.
pub fn alphanumeric_only(s: &str) -> String {
    s.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Keep only ASCII digits.
pub fn numeric_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
