//! Field-level provenance for golden records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use record::RecordId;
use serde::{Deserialize, Serialize};

/// Which source supplied one golden-record field, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProvenance {
    /// Source record whose value won (first contributor for computed
    /// strategies like union or average).
    pub source_record_id: RecordId,
    /// Name of the strategy that resolved the field.
    pub strategy_applied: String,
    /// True when the sources disagreed (more than one distinct non-null
    /// value).
    pub had_conflict: bool,
}

/// The full audit trail of one merge.
///
/// Provenance is append-only: unmerging sets the `unmerged` flags, it
/// never deletes the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub golden_record_id: RecordId,
    /// Source records, in merge order.
    pub source_record_ids: Vec<RecordId>,
    pub merged_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_by: Option<String>,
    /// Per-field attribution.
    pub field_sources: BTreeMap<String, FieldProvenance>,
    /// Set once by unmerge; a second unmerge of the same golden record
    /// fails.
    #[serde(default)]
    pub unmerged: bool,
    #[serde(default)]
    pub unmerged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unmerged_by: Option<String>,
    #[serde(default)]
    pub unmerge_reason: Option<String>,
    /// Review-queue item that approved this merge, when one did.
    #[serde(default)]
    pub queue_item_id: Option<String>,
}
