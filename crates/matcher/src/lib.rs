//! Weighted scoring, decision thresholds, and explanations for the
//! reclink entity resolution engine.
//!
//! The matcher sits at the center of the pipeline: blocking hands it
//! candidate pairs, it asks the normalize layer for canonical values and
//! the compare layer for similarities, aggregates weighted field scores,
//! classifies each pair against the configured thresholds, and renders a
//! human-readable explanation.
//!
//! # Scoring model
//!
//! For every configured field:
//!
//! ```text
//! similarity   = comparator(normalize(left), normalize(right))   in [0, 1]
//! contribution = similarity * weight       (zero below the field threshold)
//! total        = sum of contributions
//! normalized   = total / sum of weights
//! ```
//!
//! The raw `total` is classified against [`ThresholdConfig`]:
//! `definite-match` at or above `definite_match`, `no-match` below
//! `no_match`, `potential-match` between, and `new` when there were no
//! candidates at all.
//!
//! # Entry points
//!
//! - [`MatchEngine::resolve`] scores one input against a candidate set
//!   and returns ranked [`MatchResult`]s.
//! - [`MatchEngine::deduplicate`] runs blocking over a batch, scores the
//!   emitted pairs, and groups records by the definite-match relation.
//!   Long runs can report progress and honor a deadline, returning a
//!   partial report marked `incomplete`.
//!
//! All scoring is synchronous, deterministic, and free of shared mutable
//! state; a `MatchEngine` can be shared across threads.

mod config;
mod engine;
mod error;
mod explain;
mod score;
mod types;

pub use crate::config::{FieldMatchConfig, MatchingConfig, ThresholdConfig};
pub use crate::engine::{DedupeOptions, MatchEngine, ProgressFn};
pub use crate::error::MatchError;
pub use crate::explain::explain;
pub use crate::score::score_pair;
pub use crate::types::{
    DedupeReport, FieldComparison, MatchOutcome, MatchResult, MatchScore, PairMatch, Resolution,
};
