//! The async merge executor: drives the synchronous merge core against
//! the provenance store and source-record archive collaborators.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use record::{Record, RecordId, SourceRecord};
use tracing::info;

use crate::config::MergeConfig;
use crate::error::{AdapterError, MergeError, UnmergeError};
use crate::merge::{merge_records, MergeOutcome};
use crate::provenance::Provenance;

/// Persistent store for merge provenance.
///
/// Concurrent `save` calls with distinct golden record ids are
/// independent; `get`/`get_by_source_id` are snapshot reads.
#[async_trait]
pub trait ProvenanceStore: Send + Sync {
    async fn save(&self, provenance: Provenance) -> Result<(), AdapterError>;
    async fn get(&self, golden_record_id: &RecordId) -> Result<Option<Provenance>, AdapterError>;
    async fn get_by_source_id(
        &self,
        source_record_id: &RecordId,
    ) -> Result<Vec<Provenance>, AdapterError>;
    async fn find_golden_records_by_source(
        &self,
        source_record_id: &RecordId,
    ) -> Result<Vec<RecordId>, AdapterError>;
}

/// Archive of the source records a merge consumed, keyed by golden
/// record id, so unmerge can restore them exactly.
#[async_trait]
pub trait SourceRecordArchive: Send + Sync {
    async fn archive(
        &self,
        records: &[SourceRecord],
        golden_record_id: &RecordId,
    ) -> Result<(), AdapterError>;
    async fn retrieve(
        &self,
        golden_record_id: &RecordId,
    ) -> Result<Vec<SourceRecord>, AdapterError>;
}

/// Id source for golden records. All randomness flows through here so
/// tests can pin ids and runs stay reproducible.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> RecordId;
}

/// Default generator: `golden-1`, `golden-2`, ...
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("golden")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> RecordId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        RecordId::Text(format!("{}-{}", self.prefix, n))
    }
}

/// Callback invoked per restored source record during unmerge.
#[derive(Clone)]
pub struct RestoreHook(pub Arc<dyn Fn(&SourceRecord) + Send + Sync>);

impl fmt::Debug for RestoreHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RestoreHook(..)")
    }
}

/// Callback invoked for the golden record being retired during unmerge.
#[derive(Clone)]
pub struct DeleteHook(pub Arc<dyn Fn(&RecordId) + Send + Sync>);

impl fmt::Debug for DeleteHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeleteHook(..)")
    }
}

/// What an unmerge restored.
#[derive(Debug, Clone)]
pub struct UnmergeOutcome {
    pub golden_record_id: RecordId,
    pub restored_records: Vec<SourceRecord>,
    pub provenance: Provenance,
}

/// Drives merges end to end: id generation, the synchronous core,
/// archiving, and provenance persistence; and reverses them via
/// [`unmerge`](MergeExecutor::unmerge).
pub struct MergeExecutor {
    config: MergeConfig,
    provenance_store: Arc<dyn ProvenanceStore>,
    archive: Arc<dyn SourceRecordArchive>,
    id_generator: Arc<dyn IdGenerator>,
    merged_by: Option<String>,
    on_record_restore: Option<RestoreHook>,
    on_golden_record_delete: Option<DeleteHook>,
}

impl MergeExecutor {
    pub fn new(
        config: MergeConfig,
        provenance_store: Arc<dyn ProvenanceStore>,
        archive: Arc<dyn SourceRecordArchive>,
    ) -> Self {
        Self {
            config,
            provenance_store,
            archive,
            id_generator: Arc::new(SequentialIdGenerator::default()),
            merged_by: None,
            on_record_restore: None,
            on_golden_record_delete: None,
        }
    }

    /// Replace the id generator (tests pin ids this way).
    pub fn with_id_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = generator;
        self
    }

    /// Actor recorded into provenance as `merged_by`.
    pub fn with_merged_by(mut self, actor: impl Into<String>) -> Self {
        self.merged_by = Some(actor.into());
        self
    }

    pub fn on_record_restore(
        mut self,
        f: impl Fn(&SourceRecord) + Send + Sync + 'static,
    ) -> Self {
        self.on_record_restore = Some(RestoreHook(Arc::new(f)));
        self
    }

    pub fn on_golden_record_delete(
        mut self,
        f: impl Fn(&RecordId) + Send + Sync + 'static,
    ) -> Self {
        self.on_golden_record_delete = Some(DeleteHook(Arc::new(f)));
        self
    }

    /// Merge source records into a golden record, archive the sources,
    /// and persist provenance.
    pub async fn merge(&self, sources: Vec<SourceRecord>) -> Result<MergeOutcome, MergeError> {
        let golden_record_id = self.id_generator.next_id();
        let outcome = merge_records(
            &sources,
            &self.config,
            golden_record_id.clone(),
            Utc::now(),
            self.merged_by.clone(),
        )?;

        self.archive.archive(&sources, &golden_record_id).await?;
        if self.config.track_provenance {
            self.provenance_store.save(outcome.provenance.clone()).await?;
        }

        info!(
            golden_record_id = %golden_record_id,
            sources = sources.len(),
            conflicts = outcome.conflicts.len(),
            "merged source records"
        );
        Ok(outcome)
    }

    /// Convenience wrapper for merging plain records.
    pub async fn merge_plain(&self, records: Vec<Record>) -> Result<MergeOutcome, MergeError> {
        self.merge(records.into_iter().map(SourceRecord::from_record).collect())
            .await
    }

    /// Reverse a merge: restore every archived source record, retire the
    /// golden record, and flag the provenance as unmerged.
    ///
    /// Unmerge is one-shot: a second call for the same golden record
    /// fails with [`UnmergeError::AlreadyUnmerged`]. The provenance entry
    /// is never deleted.
    pub async fn unmerge(
        &self,
        golden_record_id: &RecordId,
        unmerged_by: Option<String>,
        reason: Option<String>,
    ) -> Result<UnmergeOutcome, UnmergeError> {
        let mut provenance = self
            .provenance_store
            .get(golden_record_id)
            .await?
            .ok_or_else(|| UnmergeError::NotFound(golden_record_id.clone()))?;

        if provenance.unmerged {
            return Err(UnmergeError::AlreadyUnmerged(golden_record_id.clone()));
        }

        let restored = self.archive.retrieve(golden_record_id).await?;
        if restored.is_empty() {
            return Err(UnmergeError::MissingArchive(golden_record_id.clone()));
        }

        // Restore sources in archive (merge) order before retiring the
        // golden record, so a crash mid-unmerge leaves no data orphaned.
        if let Some(hook) = &self.on_record_restore {
            for record in &restored {
                (hook.0)(record);
            }
        }
        if let Some(hook) = &self.on_golden_record_delete {
            (hook.0)(golden_record_id);
        }

        provenance.unmerged = true;
        provenance.unmerged_at = Some(Utc::now());
        provenance.unmerged_by = unmerged_by;
        provenance.unmerge_reason = reason;
        self.provenance_store.save(provenance.clone()).await?;

        info!(
            golden_record_id = %golden_record_id,
            restored = restored.len(),
            "unmerged golden record"
        );
        Ok(UnmergeOutcome {
            golden_record_id: golden_record_id.clone(),
            restored_records: restored,
            provenance,
        })
    }
}
