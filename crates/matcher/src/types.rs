//! Result types produced by scoring and deduplication.

use blocking::BlockingStats;
use chrono::{DateTime, Utc};
use record::{FieldValue, Record, RecordId};
use serde::{Deserialize, Serialize};

use crate::config::ThresholdConfig;

/// Outcome tier for a scored pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchOutcome {
    /// Total at or above the definite-match threshold.
    DefiniteMatch,
    /// Total between the two thresholds.
    PotentialMatch,
    /// Total below the no-match threshold.
    NoMatch,
    /// No candidates were available to score against.
    New,
}

impl MatchOutcome {
    /// Classify a raw weighted total against the thresholds.
    pub fn classify(total: f64, thresholds: &ThresholdConfig) -> Self {
        if total >= thresholds.definite_match {
            MatchOutcome::DefiniteMatch
        } else if total >= thresholds.no_match {
            MatchOutcome::PotentialMatch
        } else {
            MatchOutcome::NoMatch
        }
    }

    /// Human-facing label used in explanation summaries.
    pub fn label(&self) -> &'static str {
        match self {
            MatchOutcome::DefiniteMatch => "Definite Match",
            MatchOutcome::PotentialMatch => "Potential Match",
            MatchOutcome::NoMatch => "No Match",
            MatchOutcome::New => "New",
        }
    }
}

/// One field's contribution to a pair score.
///
/// `similarity` is the raw comparator output; `contribution` is the
/// value that entered the total, i.e. zero when the similarity fell
/// below the field's threshold. Normalized values are present only when
/// normalization changed them, which keeps explanations concise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldComparison {
    pub field: String,
    /// Comparator strategy name.
    pub strategy: String,
    pub left_value: FieldValue,
    pub right_value: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_left_value: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_right_value: Option<FieldValue>,
    /// Raw similarity in `[0, 1]`.
    pub similarity: f64,
    pub weight: f64,
    /// `gated_similarity * weight`.
    pub contribution: f64,
}

/// Aggregated score for one record pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    /// Sum of field contributions.
    pub total: f64,
    /// Sum of configured weights.
    pub max_possible_total: f64,
    /// `total / max_possible_total`, in `[0, 1]`.
    pub normalized: f64,
    pub field_scores: Vec<FieldComparison>,
}

/// One scored candidate from a resolve call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The candidate record this result describes.
    pub candidate: Record,
    pub outcome: MatchOutcome,
    pub score: MatchScore,
    /// Human-readable explanation of the decision.
    pub explanation: String,
    /// Wall-clock time spent scoring this candidate, in milliseconds.
    pub processing_time_ms: f64,
    pub calculated_at: DateTime<Utc>,
}

/// The outcome of resolving one input against a candidate set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Id of the input record.
    pub input_id: RecordId,
    /// Per-candidate results, ordered by descending total with a stable
    /// id tiebreak, truncated to `max_results`.
    pub results: Vec<MatchResult>,
    /// Overall outcome: the best candidate's outcome, or `New` when no
    /// candidates were scored.
    pub outcome: MatchOutcome,
}

impl Resolution {
    /// The best-scoring result, if any candidate was scored.
    pub fn best(&self) -> Option<&MatchResult> {
        self.results.first()
    }
}

/// A scored pair from batch deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairMatch {
    pub left_id: RecordId,
    pub right_id: RecordId,
    pub outcome: MatchOutcome,
    pub score: MatchScore,
}

/// Aggregate report for a batch deduplication run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupeReport {
    pub records_processed: usize,
    pub comparisons_made: usize,
    pub definite_matches_found: usize,
    pub potential_matches_found: usize,
    /// Records that participate in at least one definite or potential
    /// match.
    pub records_with_matches: usize,
    /// Connected components of the definite-match relation, for groups
    /// of two or more records. Each group is sorted by record id; groups
    /// are sorted by their first member.
    pub groups: Vec<Vec<RecordId>>,
    /// Scored pairs at or above the no-match threshold.
    pub matches: Vec<PairMatch>,
    pub blocking_stats: BlockingStats,
    /// True when a deadline expired before every pair was scored.
    pub incomplete: bool,
}
