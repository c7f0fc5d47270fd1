//! The consolidation engine: fetch from heterogeneous sources, map into
//! the unified schema, and match across the result.

use std::collections::BTreeMap;
use std::sync::Arc;

use matcher::{DedupeReport, MatchEngine, Resolution};
use record::{Record, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::adapter::DatabaseAdapter;
use crate::error::{ConsolidateError, MappingFailure};
use crate::mapping::{FieldMapping, MappedRecord};

/// One configured source system.
#[derive(Clone)]
pub struct SourceConfig {
    /// Stable identifier, used to namespace record ids and attribute
    /// provenance.
    pub source_id: String,
    /// Human-facing name.
    pub name: String,
    pub adapter: Arc<dyn DatabaseAdapter<JsonValue>>,
    pub mapping: FieldMapping,
    /// Priority for `sourcePriority` merges downstream.
    pub priority: Option<i32>,
}

impl SourceConfig {
    pub fn new(
        source_id: impl Into<String>,
        name: impl Into<String>,
        adapter: Arc<dyn DatabaseAdapter<JsonValue>>,
        mapping: FieldMapping,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            name: name.into(),
            adapter,
            mapping,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// How records from multiple sources meet each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MatchingScope {
    /// Deduplicate each source on its own, then match the surviving
    /// representatives across sources.
    WithinSourceFirst,
    /// Pour every mapped record into one pool and match there.
    #[default]
    UnifiedPool,
}

/// Per-source mapping statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceStats {
    pub fetched: usize,
    pub mapped: usize,
    pub skipped: usize,
}

/// Everything one consolidation run produced.
#[derive(Debug)]
pub struct ConsolidationReport {
    pub records_mapped: usize,
    pub per_source: BTreeMap<String, SourceStats>,
    /// Records that failed mapping; they are skipped, never fatal.
    pub errors: Vec<MappingFailure>,
    /// Dedupe reports per source (within-source-first scope only).
    pub within_source: BTreeMap<String, DedupeReport>,
    /// The cross-source (or unified-pool) match report.
    pub cross_source: DedupeReport,
    /// All mapped records, in source order.
    pub records: Vec<MappedRecord>,
}

/// Drives multi-source consolidation end to end.
pub struct ConsolidationEngine {
    sources: Vec<SourceConfig>,
    match_engine: Arc<MatchEngine>,
    scope: MatchingScope,
}

impl ConsolidationEngine {
    pub fn new(
        sources: Vec<SourceConfig>,
        match_engine: Arc<MatchEngine>,
        scope: MatchingScope,
    ) -> Result<Self, ConsolidateError> {
        if sources.is_empty() {
            return Err(ConsolidateError::NoSources);
        }
        Ok(Self {
            sources,
            match_engine,
            scope,
        })
    }

    /// Fetch, map, and match.
    ///
    /// Mapping failures skip the offending record, log a warning, and
    /// land in the report's `errors`; a bad record never aborts the
    /// batch. Mapped record ids are namespaced `source_id:original_id`
    /// so records from different sources can never collide.
    pub async fn run(&self) -> Result<ConsolidationReport, ConsolidateError> {
        let mut records: Vec<MappedRecord> = Vec::new();
        let mut per_source = BTreeMap::new();
        let mut errors = Vec::new();

        for source in &self.sources {
            let documents = source.adapter.find_all().await.map_err(|error| {
                ConsolidateError::Adapter {
                    source_id: source.source_id.clone(),
                    error,
                }
            })?;

            let mut stats = SourceStats {
                fetched: documents.len(),
                ..SourceStats::default()
            };

            for (record_index, document) in documents.iter().enumerate() {
                match source.mapping.map_document(document) {
                    Ok(mut record) => {
                        let source_record_id = record.id.clone();
                        record.id =
                            RecordId::Text(format!("{}:{}", source.source_id, source_record_id));
                        record.meta.source_id = Some(source.source_id.clone());
                        records.push(MappedRecord {
                            record,
                            source_id: source.source_id.clone(),
                            original: document.clone(),
                            source_record_id,
                        });
                        stats.mapped += 1;
                    }
                    Err(message) => {
                        warn!(
                            source_id = source.source_id.as_str(),
                            record_index, message, "skipping unmappable record"
                        );
                        errors.push(MappingFailure {
                            source_id: source.source_id.clone(),
                            record_index,
                            message,
                        });
                        stats.skipped += 1;
                    }
                }
            }
            per_source.insert(source.source_id.clone(), stats);
        }

        let mut within_source = BTreeMap::new();
        let pool: Vec<Record> = match self.scope {
            MatchingScope::UnifiedPool => records.iter().map(|m| m.record.clone()).collect(),
            MatchingScope::WithinSourceFirst => {
                let mut representatives = Vec::new();
                for source in &self.sources {
                    let own: Vec<Record> = records
                        .iter()
                        .filter(|m| m.source_id == source.source_id)
                        .map(|m| m.record.clone())
                        .collect();
                    let report = self.match_engine.deduplicate(&own)?;
                    representatives.extend(survivors(&own, &report));
                    within_source.insert(source.source_id.clone(), report);
                }
                representatives
            }
        };

        let cross_source = self.match_engine.deduplicate(&pool)?;

        Ok(ConsolidationReport {
            records_mapped: records.len(),
            per_source,
            errors,
            within_source,
            cross_source,
            records,
        })
    }
}

/// One representative per duplicate group (its first member, which is
/// the smallest id) plus every unduplicated record.
fn survivors(records: &[Record], report: &DedupeReport) -> Vec<Record> {
    let mut suppressed: Vec<&RecordId> = Vec::new();
    for group in &report.groups {
        // Group members are sorted; everyone after the first is folded
        // into the representative.
        suppressed.extend(group.iter().skip(1));
    }
    records
        .iter()
        .filter(|r| !suppressed.contains(&&r.id))
        .cloned()
        .collect()
}

/// Resolve an input record against an adapter-backed store of unified
/// records, narrowing the candidate fetch with the engine's blocking
/// keys when any are configured.
pub async fn resolve_against_adapter(
    engine: &MatchEngine,
    adapter: &dyn DatabaseAdapter<JsonValue>,
    input: &Record,
) -> Result<Resolution, ConsolidateError> {
    // Stored documents are serialized records, so field paths live under
    // the `fields` member.
    let keys: BTreeMap<String, String> = engine
        .blocking_keys(input)
        .into_iter()
        .map(|(field, key)| (format!("fields.{field}"), key))
        .collect();
    let documents = if keys.is_empty() {
        adapter.find_all().await
    } else {
        adapter.find_by_blocking_keys(&keys).await
    }
    .map_err(|error| ConsolidateError::Adapter {
        source_id: "candidate-store".into(),
        error,
    })?;

    let candidates: Vec<Record> = documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value::<Record>(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "skipping undecodable candidate document");
                None
            }
        })
        .collect();

    Ok(engine.resolve(input, &candidates))
}
