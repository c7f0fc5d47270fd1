//! Record and schema data model for the reclink entity resolution engine.
//!
//! This crate is the leaf of the reclink workspace: every other stage
//! (normalization, comparison, blocking, scoring, merge, consolidation)
//! operates on the types defined here.
//!
//! # Core Types
//!
//! - [`FieldValue`]: tagged union over the supported scalar kinds (text,
//!   number, boolean, timestamp, ordered text list, null).
//! - [`Record`]: an immutable mapping from field name to [`FieldValue`],
//!   carrying an opaque [`RecordId`] and optional provenance metadata.
//! - [`SourceRecord`]: a record paired with its source timestamps and
//!   priority, as consumed by the merge layer.
//! - [`SchemaDefinition`] / [`FieldDefinition`]: the per-field semantic
//!   type tags and normalizer bindings consulted before comparison.
//!
//! # Guarantees
//!
//! Records are immutable from the engine's perspective: every
//! transformation produces a new record, and normalized values are derived
//! during scoring rather than written back. Field iteration order is the
//! lexicographic order of field names, so identical inputs always walk
//! fields identically.

mod error;
mod id;
mod schema;
mod source;
mod value;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::error::RecordError;
pub use crate::id::RecordId;
pub use crate::schema::{
    CustomNormalizer, FieldDefinition, NameComponent, SchemaDefinition, SemanticType,
};
pub use crate::source::SourceRecord;
pub use crate::value::{FieldValue, TargetType};

/// Provenance metadata carried alongside a record.
///
/// All members are optional; records arriving without metadata behave
/// identically in the matching core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Identifier of the source system the record came from.
    #[serde(default)]
    pub source_id: Option<String>,
    /// Timestamp the record was created in its source system.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Timestamp the record was last updated in its source system.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Source-defined version counter.
    #[serde(default)]
    pub version: Option<u32>,
}

/// A single record: an identified mapping from field name to value.
///
/// Fields live in a `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque identifier, unique within the caller's universe.
    pub id: RecordId,
    /// Field name to value mapping.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    /// Optional provenance metadata.
    #[serde(default)]
    pub meta: RecordMeta,
}

static NULL: FieldValue = FieldValue::Null;

impl Record {
    /// Create an empty record with the given id.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
            meta: RecordMeta::default(),
        }
    }

    /// Consume the record, adding one field. Convenient for building
    /// fixtures and mapped records.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Consume the record, replacing its metadata.
    pub fn with_meta(mut self, meta: RecordMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Look up a field, treating absence as [`FieldValue::Null`].
    ///
    /// An optional field missing from both sides of a comparison therefore
    /// follows the same null-matching convention as an explicit null.
    pub fn field(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&NULL)
    }

    /// Names of all populated (non-null) fields.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, _)| k.as_str())
    }
}
