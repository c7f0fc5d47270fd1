//! The database adapter collaborator boundary.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use record::{FieldValue, RecordId};
use serde_json::Value as JsonValue;

use crate::error::AdapterError;

/// One operation inside an atomic batch.
#[derive(Debug, Clone)]
pub enum TxOp<T> {
    Create(T),
    Update(RecordId, T),
    Delete(RecordId),
}

/// Abstract storage for one source's records.
///
/// The engine consumes sources as `DatabaseAdapter<serde_json::Value>`;
/// concrete backends (SQL, document stores, flat files) are plugged in
/// by the caller. `transaction` applies a batch of operations
/// atomically (all or none), which is what merge and unmerge use to
/// serialize work on one golden record.
#[async_trait]
pub trait DatabaseAdapter<T: Send + Sync + 'static>: Send + Sync {
    async fn count(&self) -> Result<usize, AdapterError>;
    async fn find_all(&self) -> Result<Vec<T>, AdapterError>;
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<T>, AdapterError>;
    async fn find_by_field(&self, field: &str, value: &FieldValue)
        -> Result<Vec<T>, AdapterError>;
    /// Fetch records matching any of the given blocking keys
    /// (`field -> key`), used to narrow candidates before scoring.
    async fn find_by_blocking_keys(
        &self,
        keys: &BTreeMap<String, String>,
    ) -> Result<Vec<T>, AdapterError>;
    async fn create(&self, item: T) -> Result<T, AdapterError>;
    async fn update(&self, id: &RecordId, item: T) -> Result<T, AdapterError>;
    async fn delete(&self, id: &RecordId) -> Result<(), AdapterError>;
    async fn transaction(&self, ops: Vec<TxOp<T>>) -> Result<(), AdapterError>;
}

/// In-memory JSON-document adapter, used by tests and demos.
///
/// Documents are keyed by their `"id"` member. Field lookups treat the
/// field name as a dot-notation path.
#[derive(Default)]
pub struct InMemoryAdapter {
    documents: RwLock<BTreeMap<RecordId, JsonValue>>,
}

impl InMemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the adapter with documents.
    pub fn with_documents(documents: Vec<JsonValue>) -> Result<Self, AdapterError> {
        let adapter = Self::new();
        {
            let mut map = adapter
                .documents
                .write()
                .map_err(|_| poisoned("with_documents"))?;
            for doc in documents {
                let id = doc_id(&doc)?;
                map.insert(id, doc);
            }
        }
        Ok(adapter)
    }
}

fn poisoned(operation: &str) -> AdapterError {
    AdapterError::new(operation, "adapter lock poisoned")
}

fn doc_id(doc: &JsonValue) -> Result<RecordId, AdapterError> {
    match doc.get("id") {
        Some(JsonValue::String(s)) => Ok(RecordId::Text(s.clone())),
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .map(RecordId::Int)
            .ok_or_else(|| AdapterError::new("doc_id", "id is not an integer")),
        _ => Err(AdapterError::new("doc_id", "document has no id")),
    }
}

fn path_value<'a>(doc: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn matches_field(doc: &JsonValue, field: &str, value: &FieldValue) -> bool {
    match path_value(doc, field) {
        Some(JsonValue::String(s)) => value.as_text() == Some(s.as_str()),
        Some(JsonValue::Number(n)) => value.as_number() == n.as_f64(),
        Some(JsonValue::Bool(b)) => matches!(value, FieldValue::Boolean(v) if v == b),
        Some(JsonValue::Null) | None => value.is_null(),
        _ => false,
    }
}

#[async_trait]
impl DatabaseAdapter<JsonValue> for InMemoryAdapter {
    async fn count(&self) -> Result<usize, AdapterError> {
        Ok(self.documents.read().map_err(|_| poisoned("count"))?.len())
    }

    async fn find_all(&self) -> Result<Vec<JsonValue>, AdapterError> {
        let map = self.documents.read().map_err(|_| poisoned("find_all"))?;
        Ok(map.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &RecordId) -> Result<Option<JsonValue>, AdapterError> {
        let map = self.documents.read().map_err(|_| poisoned("find_by_id"))?;
        Ok(map.get(id).cloned())
    }

    async fn find_by_field(
        &self,
        field: &str,
        value: &FieldValue,
    ) -> Result<Vec<JsonValue>, AdapterError> {
        let map = self.documents.read().map_err(|_| poisoned("find_by_field"))?;
        Ok(map
            .values()
            .filter(|doc| matches_field(doc, field, value))
            .cloned()
            .collect())
    }

    async fn find_by_blocking_keys(
        &self,
        keys: &BTreeMap<String, String>,
    ) -> Result<Vec<JsonValue>, AdapterError> {
        let map = self
            .documents
            .read()
            .map_err(|_| poisoned("find_by_blocking_keys"))?;
        Ok(map
            .values()
            .filter(|doc| {
                keys.iter().any(|(field, key)| {
                    path_value(doc, field)
                        .map(|v| match v {
                            JsonValue::String(s) => s == key,
                            other => other.to_string() == *key,
                        })
                        .unwrap_or(false)
                })
            })
            .cloned()
            .collect())
    }

    async fn create(&self, item: JsonValue) -> Result<JsonValue, AdapterError> {
        let id = doc_id(&item)?;
        let mut map = self.documents.write().map_err(|_| poisoned("create"))?;
        map.insert(id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: &RecordId, item: JsonValue) -> Result<JsonValue, AdapterError> {
        let mut map = self.documents.write().map_err(|_| poisoned("update"))?;
        if !map.contains_key(id) {
            return Err(AdapterError::new("update", format!("no document {id}")));
        }
        map.insert(id.clone(), item.clone());
        Ok(item)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), AdapterError> {
        let mut map = self.documents.write().map_err(|_| poisoned("delete"))?;
        map.remove(id)
            .map(|_| ())
            .ok_or_else(|| AdapterError::new("delete", format!("no document {id}")))
    }

    async fn transaction(&self, ops: Vec<TxOp<JsonValue>>) -> Result<(), AdapterError> {
        let mut map = self.documents.write().map_err(|_| poisoned("transaction"))?;
        // Validate against a scratch copy first so the batch is atomic.
        let mut scratch = map.clone();
        for op in &ops {
            match op {
                TxOp::Create(item) => {
                    scratch.insert(doc_id(item)?, item.clone());
                }
                TxOp::Update(id, item) => {
                    if !scratch.contains_key(id) {
                        return Err(AdapterError::new(
                            "transaction",
                            format!("no document {id}"),
                        ));
                    }
                    scratch.insert(id.clone(), item.clone());
                }
                TxOp::Delete(id) => {
                    if scratch.remove(id).is_none() {
                        return Err(AdapterError::new(
                            "transaction",
                            format!("no document {id}"),
                        ));
                    }
                }
            }
        }
        *map = scratch;
        Ok(())
    }
}
