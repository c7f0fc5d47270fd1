//! Golden-record merge, provenance, and reversible unmerge.
//!
//! Once matching has decided that a set of records describes one entity,
//! this crate reconciles them into a single golden record. Every field
//! is resolved by a [`MergeStrategy`] (field-specific or default), ties
//! are broken by the configured [`ConflictResolution`], and the winning
//! source of every field is recorded into [`Provenance`].
//!
//! The merge core ([`merge_records`]) is synchronous and pure. The async
//! [`MergeExecutor`] wraps it with the collaborator boundary: golden ids
//! come from an injected [`IdGenerator`], consumed sources go to a
//! [`SourceRecordArchive`], and provenance lands in a
//! [`ProvenanceStore`]. [`MergeExecutor::unmerge`] reverses the whole
//! operation, restoring the archived sources exactly and flagging (not
//! deleting) the provenance, and fails on a second attempt.
//!
//! ```rust
//! use merge::{merge_records, MergeConfig, MergeStrategy};
//! use record::{Record, RecordId, SourceRecord};
//!
//! let sources = vec![
//!     SourceRecord::from_record(Record::new("a").with_field("name", "Jon")),
//!     SourceRecord::from_record(Record::new("b").with_field("name", "Jonathan")),
//! ];
//! let config = MergeConfig::default()
//!     .with_field_strategy("name", MergeStrategy::PreferLonger);
//! let outcome = merge_records(
//!     &sources,
//!     &config,
//!     RecordId::from("golden-1"),
//!     chrono::Utc::now(),
//!     None,
//! )
//! .unwrap();
//! assert_eq!(outcome.golden_record.field("name").as_text(), Some("Jonathan"));
//! ```

mod config;
mod error;
mod executor;
mod memory;
mod merge;
mod provenance;
mod strategy;

pub use crate::config::{ConflictResolution, MergeConfig};
pub use crate::error::{AdapterError, MergeError, UnmergeError};
pub use crate::executor::{
    DeleteHook, IdGenerator, MergeExecutor, ProvenanceStore, RestoreHook, SequentialIdGenerator,
    SourceRecordArchive, UnmergeOutcome,
};
pub use crate::memory::{InMemoryArchive, InMemoryProvenanceStore};
pub use crate::merge::{merge_records, MergeConflict, MergeOutcome, MergeStats};
pub use crate::provenance::{FieldProvenance, Provenance};
pub use crate::strategy::{MergeFn, MergeStrategy};

#[cfg(test)]
mod tests {
    use super::*;
    use record::{FieldValue, Record, RecordId, SourceRecord};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn executor() -> (
        MergeExecutor,
        Arc<InMemoryProvenanceStore>,
        Arc<InMemoryArchive>,
    ) {
        let store = Arc::new(InMemoryProvenanceStore::new());
        let archive = Arc::new(InMemoryArchive::new());
        let executor = MergeExecutor::new(
            MergeConfig::default(),
            Arc::clone(&store) as Arc<dyn ProvenanceStore>,
            Arc::clone(&archive) as Arc<dyn SourceRecordArchive>,
        )
        .with_merged_by("steward");
        (executor, store, archive)
    }

    fn sources() -> Vec<SourceRecord> {
        vec![
            SourceRecord::from_record(
                Record::new("s1")
                    .with_field("firstName", "Jane")
                    .with_field("email", "jane@example.com"),
            ),
            SourceRecord::from_record(
                Record::new("s2")
                    .with_field("firstName", "Jane")
                    .with_field("phone", "5550104477"),
            ),
        ]
    }

    #[tokio::test]
    async fn merge_persists_provenance_and_archive() {
        let (executor, store, archive) = executor();
        let outcome = executor.merge(sources()).await.expect("merge");

        assert_eq!(outcome.golden_record_id, RecordId::from("golden-1"));
        assert_eq!(
            outcome.golden_record.field("email"),
            &FieldValue::Text("jane@example.com".into())
        );

        let saved = store
            .get(&outcome.golden_record_id)
            .await
            .unwrap()
            .expect("provenance saved");
        assert_eq!(saved.merged_by.as_deref(), Some("steward"));
        assert_eq!(
            saved.source_record_ids,
            vec![RecordId::from("s1"), RecordId::from("s2")]
        );

        let archived = archive.retrieve(&outcome.golden_record_id).await.unwrap();
        assert_eq!(archived.len(), 2);
    }

    #[tokio::test]
    async fn unmerge_restores_sources_exactly_and_only_once() {
        let (executor, store, _archive) = executor();
        let restored_count = Arc::new(AtomicUsize::new(0));
        let deleted = Arc::new(AtomicUsize::new(0));
        let executor = {
            let restored_count = Arc::clone(&restored_count);
            let deleted = Arc::clone(&deleted);
            executor
                .on_record_restore(move |_| {
                    restored_count.fetch_add(1, Ordering::SeqCst);
                })
                .on_golden_record_delete(move |_| {
                    deleted.fetch_add(1, Ordering::SeqCst);
                })
        };

        let originals = sources();
        let outcome = executor.merge(originals.clone()).await.expect("merge");
        let golden_id = outcome.golden_record_id.clone();

        let unmerged = executor
            .unmerge(&golden_id, Some("steward".into()), Some("bad merge".into()))
            .await
            .expect("unmerge");

        // Every source field value comes back exactly.
        assert_eq!(unmerged.restored_records, originals);
        assert_eq!(restored_count.load(Ordering::SeqCst), 2);
        assert_eq!(deleted.load(Ordering::SeqCst), 1);

        let provenance = store.get(&golden_id).await.unwrap().expect("kept");
        assert!(provenance.unmerged);
        assert_eq!(provenance.unmerge_reason.as_deref(), Some("bad merge"));

        // Second unmerge must fail.
        let err = executor
            .unmerge(&golden_id, None, None)
            .await
            .expect_err("double unmerge");
        assert!(matches!(err, UnmergeError::AlreadyUnmerged(_)));
    }

    #[tokio::test]
    async fn unmerge_of_unknown_golden_fails() {
        let (executor, _store, _archive) = executor();
        let err = executor
            .unmerge(&RecordId::from("ghost"), None, None)
            .await
            .expect_err("missing");
        assert!(matches!(err, UnmergeError::NotFound(_)));
    }

    #[tokio::test]
    async fn injected_id_generator_controls_golden_ids() {
        let (executor, _store, _archive) = executor();
        let executor =
            executor.with_id_generator(Arc::new(SequentialIdGenerator::new("entity")));
        let outcome = executor.merge(sources()).await.expect("merge");
        assert_eq!(outcome.golden_record_id, RecordId::from("entity-1"));
    }
}
