//! In-memory collaborator implementations, used by tests and small
//! single-process deployments.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use record::{RecordId, SourceRecord};

use crate::error::AdapterError;
use crate::executor::{ProvenanceStore, SourceRecordArchive};
use crate::provenance::Provenance;

fn poisoned(operation: &str) -> AdapterError {
    AdapterError::new(operation, "store lock poisoned")
}

/// HashMap-backed provenance store. Source-id lookups scan the map,
/// which is fine at in-memory scale; persistent stores keep a secondary
/// index instead.
#[derive(Default)]
pub struct InMemoryProvenanceStore {
    by_golden: RwLock<HashMap<RecordId, Provenance>>,
}

impl InMemoryProvenanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProvenanceStore for InMemoryProvenanceStore {
    async fn save(&self, provenance: Provenance) -> Result<(), AdapterError> {
        let mut map = self.by_golden.write().map_err(|_| poisoned("save"))?;
        map.insert(provenance.golden_record_id.clone(), provenance);
        Ok(())
    }

    async fn get(&self, golden_record_id: &RecordId) -> Result<Option<Provenance>, AdapterError> {
        let map = self.by_golden.read().map_err(|_| poisoned("get"))?;
        Ok(map.get(golden_record_id).cloned())
    }

    async fn get_by_source_id(
        &self,
        source_record_id: &RecordId,
    ) -> Result<Vec<Provenance>, AdapterError> {
        let map = self
            .by_golden
            .read()
            .map_err(|_| poisoned("get_by_source_id"))?;
        let mut hits: Vec<Provenance> = map
            .values()
            .filter(|p| p.source_record_ids.contains(source_record_id))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.golden_record_id.cmp(&b.golden_record_id));
        Ok(hits)
    }

    async fn find_golden_records_by_source(
        &self,
        source_record_id: &RecordId,
    ) -> Result<Vec<RecordId>, AdapterError> {
        Ok(self
            .get_by_source_id(source_record_id)
            .await?
            .into_iter()
            .map(|p| p.golden_record_id)
            .collect())
    }
}

/// HashMap-backed source-record archive.
#[derive(Default)]
pub struct InMemoryArchive {
    by_golden: RwLock<HashMap<RecordId, Vec<SourceRecord>>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SourceRecordArchive for InMemoryArchive {
    async fn archive(
        &self,
        records: &[SourceRecord],
        golden_record_id: &RecordId,
    ) -> Result<(), AdapterError> {
        let mut map = self.by_golden.write().map_err(|_| poisoned("archive"))?;
        map.insert(golden_record_id.clone(), records.to_vec());
        Ok(())
    }

    async fn retrieve(
        &self,
        golden_record_id: &RecordId,
    ) -> Result<Vec<SourceRecord>, AdapterError> {
        let map = self.by_golden.read().map_err(|_| poisoned("retrieve"))?;
        Ok(map.get(golden_record_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use record::Record;
    use std::collections::BTreeMap;

    fn provenance(golden: &str, sources: &[&str]) -> Provenance {
        Provenance {
            golden_record_id: RecordId::from(golden),
            source_record_ids: sources.iter().map(|s| RecordId::from(*s)).collect(),
            merged_at: Utc.timestamp_opt(0, 0).single().expect("timestamp"),
            merged_by: None,
            field_sources: BTreeMap::new(),
            unmerged: false,
            unmerged_at: None,
            unmerged_by: None,
            unmerge_reason: None,
            queue_item_id: None,
        }
    }

    #[tokio::test]
    async fn secondary_index_finds_goldens_by_source() {
        let store = InMemoryProvenanceStore::new();
        store.save(provenance("g1", &["s1", "s2"])).await.unwrap();
        store.save(provenance("g2", &["s2", "s3"])).await.unwrap();

        let goldens = store
            .find_golden_records_by_source(&RecordId::from("s2"))
            .await
            .unwrap();
        assert_eq!(goldens, vec![RecordId::from("g1"), RecordId::from("g2")]);

        let none = store
            .find_golden_records_by_source(&RecordId::from("s9"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn archive_round_trip() {
        let archive = InMemoryArchive::new();
        let golden = RecordId::from("g1");
        let records = vec![SourceRecord::from_record(
            Record::new("s1").with_field("name", "Jane"),
        )];
        archive.archive(&records, &golden).await.unwrap();
        assert_eq!(archive.retrieve(&golden).await.unwrap(), records);
        assert!(archive
            .retrieve(&RecordId::from("missing"))
            .await
            .unwrap()
            .is_empty());
    }
}
