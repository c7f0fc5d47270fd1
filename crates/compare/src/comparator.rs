//! Comparator dispatch: tagged strategy variants plus a name registry.

use std::borrow::Cow;

use record::FieldValue;
use serde::{Deserialize, Serialize};

use crate::error::CompareError;
use crate::jaro::jaro_winkler;
use crate::levenshtein::levenshtein_similarity;
use crate::metaphone::metaphone_code;
use crate::options::{CompareOptions, JaroWinklerParams, MetaphoneParams};
use crate::soundex::soundex_code;

/// A field comparison strategy.
///
/// Serialization is tagged so strategies embed naturally in matching
/// configuration files:
///
/// ```yaml
/// strategy: { type: jaro-winkler, prefix_scale: 0.1 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Comparator {
    /// 1 iff equal under the case/whitespace options, else 0.
    Exact,
    /// `1 - edit_distance / max_len`.
    Levenshtein,
    /// Jaro base score with common-prefix bonus.
    JaroWinkler {
        #[serde(flatten)]
        params: JaroWinklerParams,
    },
    /// Phonetic equality on Soundex codes.
    Soundex,
    /// Phonetic equality on Metaphone codes.
    Metaphone {
        #[serde(flatten)]
        params: MetaphoneParams,
    },
}

impl Comparator {
    /// Jaro–Winkler with default parameters.
    pub fn jaro_winkler() -> Self {
        Comparator::JaroWinkler {
            params: JaroWinklerParams::default(),
        }
    }

    /// Metaphone with default parameters.
    pub fn metaphone() -> Self {
        Comparator::Metaphone {
            params: MetaphoneParams::default(),
        }
    }

    /// Resolve an external strategy name to a comparator with default
    /// parameters. Unknown names are a configuration error.
    pub fn from_name(name: &str) -> Result<Self, CompareError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Comparator::Exact),
            "levenshtein" => Ok(Comparator::Levenshtein),
            "jaro-winkler" | "jaro_winkler" | "jarowinkler" => Ok(Comparator::jaro_winkler()),
            "soundex" => Ok(Comparator::Soundex),
            "metaphone" => Ok(Comparator::metaphone()),
            other => Err(CompareError::UnknownStrategy(other.to_string())),
        }
    }

    /// Stable external name, used in explanations and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Comparator::Exact => "exact",
            Comparator::Levenshtein => "levenshtein",
            Comparator::JaroWinkler { .. } => "jaro-winkler",
            Comparator::Soundex => "soundex",
            Comparator::Metaphone { .. } => "metaphone",
        }
    }

    /// Compare two field values, returning a similarity in `[0, 1]`.
    ///
    /// Null handling happens here so individual algorithms only ever see
    /// strings: two nulls score 1 under `null_matches_null`, a null
    /// against a non-null scores 0. Non-text values compare through their
    /// canonical display form.
    pub fn compare(&self, left: &FieldValue, right: &FieldValue, opts: &CompareOptions) -> f64 {
        match (left.is_null(), right.is_null()) {
            (true, true) => return if opts.null_matches_null { 1.0 } else { 0.0 },
            (true, false) | (false, true) => return 0.0,
            _ => {}
        }

        let left = prepare(left, opts, self);
        let right = prepare(right, opts, self);

        match (left.is_empty(), right.is_empty()) {
            (true, true) => return 1.0,
            (true, false) | (false, true) => return 0.0,
            _ => {}
        }

        match self {
            Comparator::Exact => {
                if left == right {
                    1.0
                } else {
                    0.0
                }
            }
            Comparator::Levenshtein => levenshtein_similarity(&left, &right),
            Comparator::JaroWinkler { params } => jaro_winkler(&left, &right, params),
            Comparator::Soundex => {
                if soundex_code(&left) == soundex_code(&right) {
                    1.0
                } else {
                    0.0
                }
            }
            Comparator::Metaphone { params } => {
                if metaphone_code(&left, params) == metaphone_code(&right, params) {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    fn is_phonetic(&self) -> bool {
        matches!(self, Comparator::Soundex | Comparator::Metaphone { .. })
    }
}

/// Apply case and whitespace options ahead of the algorithm proper.
fn prepare<'a>(value: &'a FieldValue, opts: &CompareOptions, comparator: &Comparator) -> Cow<'a, str> {
    let mut text: Cow<'a, str> = match value {
        FieldValue::Text(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.display_string()),
    };

    if opts.normalize_whitespace {
        let collapsed = collapse_whitespace(&text);
        if collapsed != *text {
            text = Cow::Owned(collapsed);
        }
    }

    // Phonetic encoders fold case themselves.
    if !opts.case_sensitive && !comparator.is_phonetic() {
        let lowered = text.to_lowercase();
        if lowered != *text {
            text = Cow::Owned(lowered);
        }
    }

    text
}

/// Collapse runs of whitespace to a single space and trim the ends.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
