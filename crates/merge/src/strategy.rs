//! Field merge strategies.

use std::fmt;
use std::sync::Arc;

use record::{FieldValue, SourceRecord};
use serde::{Deserialize, Serialize};

/// A caller-supplied merge function: `(values, sources) -> resolved`.
#[derive(Clone)]
pub struct MergeFn(pub Arc<dyn Fn(&[FieldValue], &[SourceRecord]) -> FieldValue + Send + Sync>);

impl MergeFn {
    pub fn new(f: impl Fn(&[FieldValue], &[SourceRecord]) -> FieldValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for MergeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MergeFn(..)")
    }
}

/// How one field of the golden record is reconciled from its sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeStrategy {
    /// First non-null value in source order.
    PreferNonNull,
    /// Value from the source with the newest timestamp.
    PreferNewer,
    /// Value from the source with the oldest timestamp.
    PreferOlder,
    /// Longest value by text length.
    PreferLonger,
    /// Shortest value by text length.
    PreferShorter,
    /// Value from the first source, positionally.
    FirstWins,
    /// Value from the last source, positionally.
    LastWins,
    /// Set union of sequence values, preserving first-seen order.
    Union,
    /// Elements present in every source's sequence.
    Intersection,
    /// Arithmetic mean of the numeric values.
    Average,
    /// Value from the highest-priority source.
    SourcePriority,
    /// Caller-supplied resolution function. Not expressible in config
    /// files.
    #[serde(skip)]
    Custom(MergeFn),
}

impl MergeStrategy {
    /// Stable external name, recorded into provenance.
    pub fn name(&self) -> &'static str {
        match self {
            MergeStrategy::PreferNonNull => "preferNonNull",
            MergeStrategy::PreferNewer => "preferNewer",
            MergeStrategy::PreferOlder => "preferOlder",
            MergeStrategy::PreferLonger => "preferLonger",
            MergeStrategy::PreferShorter => "preferShorter",
            MergeStrategy::FirstWins => "firstWins",
            MergeStrategy::LastWins => "lastWins",
            MergeStrategy::Union => "union",
            MergeStrategy::Intersection => "intersection",
            MergeStrategy::Average => "average",
            MergeStrategy::SourcePriority => "sourcePriority",
            MergeStrategy::Custom(_) => "custom",
        }
    }

    /// Whether the strategy computes a value from all candidates rather
    /// than picking one source's value.
    pub fn is_computed(&self) -> bool {
        matches!(
            self,
            MergeStrategy::Union
                | MergeStrategy::Intersection
                | MergeStrategy::Average
                | MergeStrategy::Custom(_)
        )
    }
}

impl Default for MergeStrategy {
    fn default() -> Self {
        MergeStrategy::PreferNonNull
    }
}
