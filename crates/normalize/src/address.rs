//! Postal address canonicalization.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::text::collapse_whitespace;

/// Options for the `address` normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressOptions {
    /// Abbreviate street types (Street -> St). On by default.
    #[serde(default = "default_true")]
    pub abbreviate_street_types: bool,
    /// Replace US state names with their two-letter codes. On by default.
    #[serde(default = "default_true")]
    pub abbreviate_states: bool,
}

impl Default for AddressOptions {
    fn default() -> Self {
        Self {
            abbreviate_street_types: true,
            abbreviate_states: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// USPS-style street type abbreviations. Abbreviations map to themselves
/// so normalization is idempotent.
static STREET_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("street", "st"),
        ("st", "st"),
        ("avenue", "ave"),
        ("ave", "ave"),
        ("boulevard", "blvd"),
        ("blvd", "blvd"),
        ("drive", "dr"),
        ("dr", "dr"),
        ("lane", "ln"),
        ("ln", "ln"),
        ("road", "rd"),
        ("rd", "rd"),
        ("court", "ct"),
        ("ct", "ct"),
        ("circle", "cir"),
        ("cir", "cir"),
        ("place", "pl"),
        ("pl", "pl"),
        ("terrace", "ter"),
        ("ter", "ter"),
        ("parkway", "pkwy"),
        ("pkwy", "pkwy"),
        ("highway", "hwy"),
        ("hwy", "hwy"),
        ("apartment", "apt"),
        ("apt", "apt"),
        ("suite", "ste"),
        ("ste", "ste"),
        ("north", "n"),
        ("south", "s"),
        ("east", "e"),
        ("west", "w"),
    ])
});

/// US state and territory names to postal codes.
static STATE_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("alabama", "al"),
        ("alaska", "ak"),
        ("arizona", "az"),
        ("arkansas", "ar"),
        ("california", "ca"),
        ("colorado", "co"),
        ("connecticut", "ct"),
        ("delaware", "de"),
        ("florida", "fl"),
        ("georgia", "ga"),
        ("hawaii", "hi"),
        ("idaho", "id"),
        ("illinois", "il"),
        ("indiana", "in"),
        ("iowa", "ia"),
        ("kansas", "ks"),
        ("kentucky", "ky"),
        ("louisiana", "la"),
        ("maine", "me"),
        ("maryland", "md"),
        ("massachusetts", "ma"),
        ("michigan", "mi"),
        ("minnesota", "mn"),
        ("mississippi", "ms"),
        ("missouri", "mo"),
        ("montana", "mt"),
        ("nebraska", "ne"),
        ("nevada", "nv"),
        ("ohio", "oh"),
        ("oklahoma", "ok"),
        ("oregon", "or"),
        ("pennsylvania", "pa"),
        ("tennessee", "tn"),
        ("texas", "tx"),
        ("utah", "ut"),
        ("vermont", "vt"),
        ("virginia", "va"),
        ("washington", "wa"),
        ("wisconsin", "wi"),
        ("wyoming", "wy"),
    ])
});

/// Canonicalize an address: lowercase, collapse whitespace, abbreviate
/// street types and US state names.
///
/// Two-word state names ("new york", "north carolina", ...) are not
/// abbreviated by the token pass; the single-word table covers the common
/// conflict-free cases and the directional prefixes are handled by the
/// street-type table.
pub fn normalize_address(input: &str, options: &AddressOptions) -> Option<String> {
    let cleaned = collapse_whitespace(&input.to_lowercase());
    if cleaned.is_empty() {
        return None;
    }

    let tokens: Vec<String> = cleaned
        .split(' ')
        .map(|token| {
            let (word, punct) = split_trailing_punct(token);
            let replaced = if options.abbreviate_street_types {
                STREET_TYPES.get(word).copied()
            } else {
                None
            }
            .or_else(|| {
                if options.abbreviate_states {
                    STATE_CODES.get(word).copied()
                } else {
                    None
                }
            })
            .unwrap_or(word);
            format!("{replaced}{punct}")
        })
        .collect();

    Some(tokens.join(" "))
}

/// Split `"street,"` into `("street", ",")` so punctuation survives
/// abbreviation.
fn split_trailing_punct(token: &str) -> (&str, &str) {
    let end = token
        .char_indices()
        .rev()
        .take_while(|(_, c)| matches!(c, ',' | '.' | ';'))
        .map(|(i, _)| i)
        .last();
    match end {
        Some(i) => token.split_at(i),
        None => (token, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviates_street_types_and_states() {
        let opts = AddressOptions::default();
        assert_eq!(
            normalize_address("123 Main Street, Springfield, Illinois", &opts).as_deref(),
            Some("123 main st, springfield, il")
        );
    }

    #[test]
    fn collapses_whitespace() {
        let opts = AddressOptions::default();
        assert_eq!(
            normalize_address("  44   Elm   Avenue ", &opts).as_deref(),
            Some("44 elm ave")
        );
    }

    #[test]
    fn options_disable_abbreviation() {
        let opts = AddressOptions {
            abbreviate_street_types: false,
            abbreviate_states: false,
        };
        assert_eq!(
            normalize_address("123 Main Street", &opts).as_deref(),
            Some("123 main street")
        );
    }

    #[test]
    fn empty_normalizes_to_none() {
        assert_eq!(normalize_address("   ", &AddressOptions::default()), None);
    }

    #[test]
    fn normalization_is_idempotent() {
        let opts = AddressOptions::default();
        let once =
            normalize_address("987 North Oak Boulevard Apt 4, Portland, Oregon", &opts).unwrap();
        assert_eq!(
            normalize_address(&once, &opts).as_deref(),
            Some(once.as_str())
        );
    }
}
