//! Source records as consumed by the merge layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::Record;

/// A record paired with the source bookkeeping merge strategies consult.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Identifier of the source record (usually mirrors `record.id`).
    pub id: RecordId,
    /// The record itself.
    pub record: Record,
    /// When the record was created in its source.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last updated in its source.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Source priority for `source_priority` merges; larger wins.
    #[serde(default)]
    pub priority: Option<i32>,
}

impl SourceRecord {
    /// Wrap a record, deriving the source id and timestamps from it.
    pub fn from_record(record: Record) -> Self {
        Self {
            id: record.id.clone(),
            created_at: record.meta.created_at,
            updated_at: record.meta.updated_at,
            priority: None,
            record,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }
}
