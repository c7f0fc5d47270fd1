//! Field mappings: project heterogeneous source shapes into the unified
//! record schema.

use std::fmt;
use std::sync::Arc;

use record::{FieldValue, Record, RecordId, TargetType};
use serde_json::Value as JsonValue;

use crate::error::ConsolidateError;

/// A pure mapping transform: `input record -> value`.
#[derive(Clone)]
pub struct TransformFn(pub Arc<dyn Fn(&JsonValue) -> FieldValue + Send + Sync>);

impl TransformFn {
    pub fn new(f: impl Fn(&JsonValue) -> FieldValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for TransformFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransformFn(..)")
    }
}

/// Where one target field's value comes from.
#[derive(Debug, Clone)]
pub enum MappingSource {
    /// Dot-notation path into the source document (`"contact.email"`).
    Path(String),
    /// Caller-supplied transform over the whole source document.
    Transform(TransformFn),
}

/// One target-field mapping rule.
#[derive(Debug, Clone)]
pub struct MappingEntry {
    pub target: String,
    pub source: MappingSource,
    /// Coerce the mapped value into a target type; a coercion failure
    /// skips the record.
    pub coerce: Option<TargetType>,
}

/// A validated set of mapping rules for one source.
///
/// Built through [`FieldMappingBuilder`], which rejects duplicate target
/// fields at build time.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    entries: Vec<MappingEntry>,
    /// Dot-path of the source document's identifier.
    id_path: String,
}

impl FieldMapping {
    pub fn builder() -> FieldMappingBuilder {
        FieldMappingBuilder::default()
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Map one source document into a unified [`Record`].
    ///
    /// The record id is read from the configured id path (`"id"` by
    /// default); documents without one fail the mapping. Errors describe
    /// the offending target field so skipped records are diagnosable.
    pub fn map_document(&self, document: &JsonValue) -> Result<Record, String> {
        let id = match lookup_path(document, &self.id_path) {
            Some(JsonValue::String(s)) => RecordId::Text(s.clone()),
            Some(JsonValue::Number(n)) => match n.as_i64() {
                Some(i) => RecordId::Int(i),
                None => return Err(format!("id at {:?} is not an integer", self.id_path)),
            },
            _ => return Err(format!("missing id at path {:?}", self.id_path)),
        };

        let mut rec = Record::new(id);
        for entry in &self.entries {
            let raw = match &entry.source {
                MappingSource::Path(path) => lookup_path(document, path)
                    .map(json_to_field)
                    .transpose()
                    .map_err(|e| format!("target {:?}: {e}", entry.target))?
                    .unwrap_or(FieldValue::Null),
                MappingSource::Transform(f) => (f.0)(document),
            };
            let value = match entry.coerce {
                Some(target) => raw
                    .coerce_to(target)
                    .map_err(|e| format!("target {:?}: {e}", entry.target))?,
                None => raw,
            };
            rec.fields.insert(entry.target.clone(), value);
        }
        Ok(rec)
    }
}

/// Builder enforcing the duplicate-target rule.
#[derive(Debug, Default)]
pub struct FieldMappingBuilder {
    entries: Vec<MappingEntry>,
    id_path: Option<String>,
}

impl FieldMappingBuilder {
    /// Map a target field from a dot-notation source path.
    pub fn path(mut self, target: impl Into<String>, source_path: impl Into<String>) -> Self {
        self.entries.push(MappingEntry {
            target: target.into(),
            source: MappingSource::Path(source_path.into()),
            coerce: None,
        });
        self
    }

    /// Map a target field from a dot-notation source path, coercing the
    /// value.
    pub fn path_as(
        mut self,
        target: impl Into<String>,
        source_path: impl Into<String>,
        coerce: TargetType,
    ) -> Self {
        self.entries.push(MappingEntry {
            target: target.into(),
            source: MappingSource::Path(source_path.into()),
            coerce: Some(coerce),
        });
        self
    }

    /// Map a target field through a transform function.
    pub fn transform(
        mut self,
        target: impl Into<String>,
        f: impl Fn(&JsonValue) -> FieldValue + Send + Sync + 'static,
    ) -> Self {
        self.entries.push(MappingEntry {
            target: target.into(),
            source: MappingSource::Transform(TransformFn::new(f)),
            coerce: None,
        });
        self
    }

    /// Override the id path (default `"id"`).
    pub fn id_path(mut self, path: impl Into<String>) -> Self {
        self.id_path = Some(path.into());
        self
    }

    /// Validate and freeze the mapping.
    pub fn build(self) -> Result<FieldMapping, ConsolidateError> {
        let mut seen = std::collections::BTreeSet::new();
        for entry in &self.entries {
            if entry.target.trim().is_empty() {
                return Err(ConsolidateError::InvalidMapping(
                    "mapping target fields must not be empty".into(),
                ));
            }
            if !seen.insert(entry.target.clone()) {
                return Err(ConsolidateError::DuplicateTarget(entry.target.clone()));
            }
        }
        if self.entries.is_empty() {
            return Err(ConsolidateError::InvalidMapping(
                "mapping must define at least one target field".into(),
            ));
        }
        Ok(FieldMapping {
            entries: self.entries,
            id_path: self.id_path.unwrap_or_else(|| "id".to_string()),
        })
    }
}

/// Resolve a dot-notation path inside a JSON document.
fn lookup_path<'a>(document: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Convert a JSON leaf into a field value. Objects are not mappable;
/// point the path at a leaf or use a transform.
fn json_to_field(value: &JsonValue) -> Result<FieldValue, String> {
    match value {
        JsonValue::Null => Ok(FieldValue::Null),
        JsonValue::Bool(b) => Ok(FieldValue::Boolean(*b)),
        JsonValue::Number(n) => n
            .as_f64()
            .map(FieldValue::Number)
            .ok_or_else(|| "number out of range".to_string()),
        JsonValue::String(s) => Ok(FieldValue::Text(s.clone())),
        JsonValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    JsonValue::String(s) => out.push(s.clone()),
                    JsonValue::Number(n) => out.push(n.to_string()),
                    other => return Err(format!("unsupported list element: {other}")),
                }
            }
            Ok(FieldValue::TextList(out))
        }
        JsonValue::Object(_) => Err("cannot map an object; use a transform".to_string()),
    }
}

/// A unified record with its source attribution.
#[derive(Debug, Clone)]
pub struct MappedRecord {
    /// The mapped record. Its id is namespaced as `source_id:original`.
    pub record: Record,
    pub source_id: String,
    /// The source document as fetched.
    pub original: JsonValue,
    /// The document's own id, before namespacing.
    pub source_record_id: RecordId,
}
