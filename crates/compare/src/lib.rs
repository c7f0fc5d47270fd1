//! String similarity and phonetic comparators.
//!
//! A comparator maps a pair of field values to a similarity in `[0, 1]`.
//! All comparators in this crate are pure and deterministic: same inputs
//! and options, same score, on every platform.
//!
//! # Comparators
//!
//! - [`Comparator::Exact`]: 1 iff the values are equal under the
//!   case/whitespace options, else 0.
//! - [`Comparator::Levenshtein`]: `1 - edit_distance / max_len`, computed
//!   with two rolling rows.
//! - [`Comparator::JaroWinkler`]: Jaro base score with a common-prefix
//!   bonus above a boost threshold.
//! - [`Comparator::Soundex`] / [`Comparator::Metaphone`]: 1 iff the
//!   phonetic codes are equal, else 0. Both fold case internally, so the
//!   `case_sensitive` option has no effect on them.
//!
//! # Null convention
//!
//! With `null_matches_null` set (the default), two nulls compare as 1.
//! A null against any non-null value compares as 0. Empty strings compare
//! as 1 against each other and as 0 against non-empty strings.
//!
//! ```rust
//! use compare::{Comparator, CompareOptions};
//! use record::FieldValue;
//!
//! let opts = CompareOptions::default();
//! let a = FieldValue::Text("MARTHA".into());
//! let b = FieldValue::Text("MARHTA".into());
//! let score = Comparator::jaro_winkler().compare(&a, &b, &opts);
//! assert!(score > 0.96);
//! ```

mod comparator;
mod error;
mod jaro;
mod levenshtein;
mod metaphone;
mod options;
mod soundex;

pub use crate::comparator::Comparator;
pub use crate::error::CompareError;
pub use crate::jaro::{jaro, jaro_winkler};
pub use crate::levenshtein::{levenshtein_distance, levenshtein_similarity};
pub use crate::metaphone::metaphone_code;
pub use crate::options::{CompareOptions, JaroWinklerParams, MetaphoneParams};
pub use crate::soundex::soundex_code;
