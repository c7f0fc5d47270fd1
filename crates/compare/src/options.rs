//! Shared comparator options and per-strategy parameters.

use serde::{Deserialize, Serialize};

/// Options applied before any comparator runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareOptions {
    /// Compare case-sensitively. Ignored by the phonetic comparators,
    /// which fold case internally.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Collapse runs of whitespace to a single space and trim before
    /// comparing.
    #[serde(default = "default_true")]
    pub normalize_whitespace: bool,
    /// Two nulls compare as 1.0. A null against a non-null is always 0.
    #[serde(default = "default_true")]
    pub null_matches_null: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            normalize_whitespace: true,
            null_matches_null: true,
        }
    }
}

/// Jaro–Winkler prefix bonus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JaroWinklerParams {
    /// Scale applied per common-prefix character.
    #[serde(default = "JaroWinklerParams::default_prefix_scale")]
    pub prefix_scale: f64,
    /// Longest prefix eligible for the bonus.
    #[serde(default = "JaroWinklerParams::default_max_prefix_length")]
    pub max_prefix_length: usize,
    /// Jaro score a pair must exceed before the bonus applies.
    #[serde(default = "JaroWinklerParams::default_boost_threshold")]
    pub boost_threshold: f64,
}

impl JaroWinklerParams {
    fn default_prefix_scale() -> f64 {
        0.1
    }

    fn default_max_prefix_length() -> usize {
        4
    }

    fn default_boost_threshold() -> f64 {
        0.7
    }
}

impl Default for JaroWinklerParams {
    fn default() -> Self {
        Self {
            prefix_scale: Self::default_prefix_scale(),
            max_prefix_length: Self::default_max_prefix_length(),
            boost_threshold: Self::default_boost_threshold(),
        }
    }
}

/// Metaphone encoding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaphoneParams {
    /// Maximum length of the emitted code.
    #[serde(default = "MetaphoneParams::default_max_code_length")]
    pub max_code_length: usize,
}

impl MetaphoneParams {
    fn default_max_code_length() -> usize {
        6
    }
}

impl Default for MetaphoneParams {
    fn default() -> Self {
        Self {
            max_code_length: Self::default_max_code_length(),
        }
    }
}

fn default_true() -> bool {
    true
}
