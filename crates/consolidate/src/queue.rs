//! Review-queue collaborator boundary.
//!
//! Potential matches can be parked for human review. Nothing in the
//! engine enqueues automatically; callers opt in by wiring a
//! [`QueueAdapter`] and inserting items from their own service layer.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use record::{Record, RecordId};
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// Review state of a queued potential match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Approved,
    Rejected,
}

/// A potential match awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    /// The input record that triggered the potential match.
    pub input_record: Record,
    /// Candidate records it may match.
    pub candidate_ids: Vec<RecordId>,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Abstract storage for review-queue items.
#[async_trait]
pub trait QueueAdapter: Send + Sync {
    async fn insert_queue_item(&self, item: QueueItem) -> Result<QueueItem, AdapterError>;
    async fn update_queue_item(&self, item: QueueItem) -> Result<QueueItem, AdapterError>;
    async fn find_queue_items(
        &self,
        status: Option<QueueStatus>,
    ) -> Result<Vec<QueueItem>, AdapterError>;
    async fn find_queue_item_by_id(&self, id: &str) -> Result<Option<QueueItem>, AdapterError>;
    async fn delete_queue_item(&self, id: &str) -> Result<(), AdapterError>;
    async fn count_queue_items(&self, status: Option<QueueStatus>)
        -> Result<usize, AdapterError>;
    async fn batch_insert_queue_items(
        &self,
        items: Vec<QueueItem>,
    ) -> Result<Vec<QueueItem>, AdapterError>;
}

/// In-memory queue adapter for tests and demos.
#[derive(Default)]
pub struct InMemoryQueue {
    items: RwLock<BTreeMap<String, QueueItem>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(operation: &str) -> AdapterError {
    AdapterError::new(operation, "queue lock poisoned")
}

#[async_trait]
impl QueueAdapter for InMemoryQueue {
    async fn insert_queue_item(&self, item: QueueItem) -> Result<QueueItem, AdapterError> {
        let mut map = self.items.write().map_err(|_| poisoned("insert"))?;
        map.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn update_queue_item(&self, item: QueueItem) -> Result<QueueItem, AdapterError> {
        let mut map = self.items.write().map_err(|_| poisoned("update"))?;
        if !map.contains_key(&item.id) {
            return Err(AdapterError::new("update", format!("no queue item {}", item.id)));
        }
        map.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn find_queue_items(
        &self,
        status: Option<QueueStatus>,
    ) -> Result<Vec<QueueItem>, AdapterError> {
        let map = self.items.read().map_err(|_| poisoned("find"))?;
        Ok(map
            .values()
            .filter(|item| status.map(|s| item.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn find_queue_item_by_id(&self, id: &str) -> Result<Option<QueueItem>, AdapterError> {
        let map = self.items.read().map_err(|_| poisoned("find_by_id"))?;
        Ok(map.get(id).cloned())
    }

    async fn delete_queue_item(&self, id: &str) -> Result<(), AdapterError> {
        let mut map = self.items.write().map_err(|_| poisoned("delete"))?;
        map.remove(id)
            .map(|_| ())
            .ok_or_else(|| AdapterError::new("delete", format!("no queue item {id}")))
    }

    async fn count_queue_items(
        &self,
        status: Option<QueueStatus>,
    ) -> Result<usize, AdapterError> {
        Ok(self.find_queue_items(status).await?.len())
    }

    async fn batch_insert_queue_items(
        &self,
        items: Vec<QueueItem>,
    ) -> Result<Vec<QueueItem>, AdapterError> {
        let mut map = self.items.write().map_err(|_| poisoned("batch_insert"))?;
        for item in &items {
            map.insert(item.id.clone(), item.clone());
        }
        Ok(items)
    }
}
