//! Schema definitions: per-field semantic types and normalizer bindings.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::value::FieldValue;

/// Semantic type tag attached to a schema field.
///
/// The tag selects the default normalization domain; it does not restrict
/// which [`FieldValue`] variants may appear in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    #[default]
    Text,
    Name,
    Email,
    Phone,
    Date,
    Address,
    Number,
    Custom,
}

/// Component selector for multi-part fields such as personal names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameComponent {
    First,
    Middle,
    Last,
    Suffix,
}

/// An inline custom normalizer: `value -> value | null`.
///
/// Custom normalizers must be pure; they may be invoked many times for the
/// same value during a batch. When both a named normalizer and a custom
/// one are configured on a field, the custom one wins.
#[derive(Clone)]
pub struct CustomNormalizer(pub Arc<dyn Fn(&FieldValue) -> Option<FieldValue> + Send + Sync>);

impl CustomNormalizer {
    pub fn new(f: impl Fn(&FieldValue) -> Option<FieldValue> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Apply the normalizer. `None` means the value normalized to null.
    pub fn apply(&self, value: &FieldValue) -> Option<FieldValue> {
        (self.0)(value)
    }
}

impl fmt::Debug for CustomNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomNormalizer(..)")
    }
}

/// Definition of a single schema field.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FieldDefinition {
    /// Semantic type tag.
    #[serde(rename = "type", default)]
    pub semantic_type: SemanticType,
    /// Optional component selector (e.g. the "last" part of a name field).
    #[serde(default)]
    pub component: Option<NameComponent>,
    /// Whether the field must be present on well-formed records.
    #[serde(default)]
    pub required: bool,
    /// Name of a registered normalizer to apply before comparison.
    #[serde(default)]
    pub normalizer: Option<String>,
    /// Options passed through to the named normalizer.
    #[serde(default)]
    pub normalizer_options: Option<serde_json::Value>,
    /// Inline custom normalizer; overrides `normalizer` when present.
    #[serde(skip)]
    pub custom_normalizer: Option<CustomNormalizer>,
}

impl FieldDefinition {
    /// A plain text field with no normalizer.
    pub fn text() -> Self {
        Self::default()
    }

    /// Shorthand constructor for a typed field.
    pub fn of_type(semantic_type: SemanticType) -> Self {
        Self {
            semantic_type,
            ..Self::default()
        }
    }

    pub fn with_component(mut self, component: NameComponent) -> Self {
        self.component = Some(component);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_normalizer(mut self, name: impl Into<String>) -> Self {
        self.normalizer = Some(name.into());
        self
    }

    pub fn with_normalizer_options(mut self, options: serde_json::Value) -> Self {
        self.normalizer_options = Some(options);
        self
    }

    pub fn with_custom_normalizer(
        mut self,
        f: impl Fn(&FieldValue) -> Option<FieldValue> + Send + Sync + 'static,
    ) -> Self {
        self.custom_normalizer = Some(CustomNormalizer::new(f));
        self
    }
}

/// A full schema: mapping from field name to definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDefinition>,
}

impl SchemaDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the schema, adding one field definition.
    pub fn with_field(mut self, name: impl Into<String>, def: FieldDefinition) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    /// Whether the schema defines the named field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Definition for the named field.
    pub fn definition(&self, field: &str) -> Option<&FieldDefinition> {
        self.fields.get(field)
    }

    /// Validate the schema in isolation.
    pub fn validate(&self) -> Result<(), RecordError> {
        for name in self.fields.keys() {
            if name.trim().is_empty() {
                return Err(RecordError::InvalidSchema(
                    "field names must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}
