//! The normalizer registry and the scorer-boundary fallback policy.

use std::collections::HashMap;

use record::{CustomNormalizer, FieldDefinition, FieldValue, SemanticType};
use tracing::warn;

use crate::error::NormalizeError;
use crate::normalizer::Normalizer;

/// Name-indexed normalizer registry.
///
/// Built-in normalizers resolve by their well-known names; callers may
/// register additional named normalizers before the engine is built.
/// The registry is immutable once the engine holds it; registration is
/// a construction-time operation only.
#[derive(Debug, Default)]
pub struct NormalizerRegistry {
    custom: HashMap<String, CustomNormalizer>,
}

impl NormalizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom normalizer under a name. Later registrations
    /// shadow earlier ones and built-ins of the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&FieldValue) -> Option<FieldValue> + Send + Sync + 'static,
    ) {
        self.custom.insert(name.into(), CustomNormalizer::new(f));
    }

    /// Resolve a name at build time. Unknown names are fatal here; the
    /// run-time path in [`apply_named`](Self::apply_named) is lenient.
    pub fn resolve(
        &self,
        name: &str,
        options: Option<&serde_json::Value>,
    ) -> Result<(), NormalizeError> {
        if self.custom.contains_key(name) {
            return Ok(());
        }
        Normalizer::from_name(name, options).map(|_| ())
    }

    /// Apply a named normalizer with the lenient run-time policy: an
    /// unknown name or a normalizer failure logs a warning and falls back
    /// to the raw value. Data faults never abort resolution.
    pub fn apply_named(
        &self,
        name: &str,
        options: Option<&serde_json::Value>,
        value: &FieldValue,
    ) -> FieldValue {
        if let Some(custom) = self.custom.get(name) {
            return custom.apply(value).unwrap_or(FieldValue::Null);
        }
        match Normalizer::from_name(name, options).and_then(|n| n.apply(value)) {
            Ok(normalized) => normalized,
            Err(err) => {
                warn!(normalizer = name, error = %err, "normalizer fell back to raw value");
                value.clone()
            }
        }
    }

    /// Apply the normalization a schema field definition calls for.
    ///
    /// Precedence: an inline custom normalizer wins over a named one,
    /// which wins over the semantic-type default. Fields without any of
    /// the three pass the value through untouched.
    pub fn apply_definition(&self, def: &FieldDefinition, value: &FieldValue) -> FieldValue {
        if value.is_null() {
            return FieldValue::Null;
        }

        if let Some(custom) = &def.custom_normalizer {
            return custom.apply(value).unwrap_or(FieldValue::Null);
        }

        if let Some(name) = &def.normalizer {
            return self.apply_named(name, def.normalizer_options.as_ref(), value);
        }

        match default_for(def.semantic_type, def.normalizer_options.as_ref()) {
            Some(Ok(normalizer)) => match normalizer.apply(value) {
                Ok(normalized) => normalized,
                Err(err) => {
                    warn!(
                        normalizer = normalizer.name(),
                        error = %err,
                        "default normalizer fell back to raw value"
                    );
                    value.clone()
                }
            },
            Some(Err(err)) => {
                warn!(error = %err, "default normalizer options invalid, using raw value");
                value.clone()
            }
            None => value.clone(),
        }
    }
}

/// The built-in normalizer a semantic type implies when the schema names
/// none explicitly.
fn default_for(
    semantic_type: SemanticType,
    options: Option<&serde_json::Value>,
) -> Option<Result<Normalizer, NormalizeError>> {
    let name = match semantic_type {
        SemanticType::Name => "name",
        SemanticType::Email => "email",
        SemanticType::Phone => "phone",
        SemanticType::Date => "date",
        SemanticType::Address => "address",
        SemanticType::Text | SemanticType::Number | SemanticType::Custom => return None,
    };
    Some(Normalizer::from_name(name, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use record::SchemaDefinition;

    #[test]
    fn unknown_name_falls_back_to_raw() {
        let registry = NormalizerRegistry::new();
        let value = FieldValue::Text("As Is".into());
        assert_eq!(registry.apply_named("mystery", None, &value), value);
    }

    #[test]
    fn custom_shadows_built_in() {
        let mut registry = NormalizerRegistry::new();
        registry.register("email", |v| {
            v.as_text().map(|s| FieldValue::Text(s.to_uppercase()))
        });
        let out = registry.apply_named("email", None, &FieldValue::Text("a@b.com".into()));
        assert_eq!(out, FieldValue::Text("A@B.COM".into()));
    }

    #[test]
    fn definition_precedence_custom_over_named() {
        let registry = NormalizerRegistry::new();
        let def = record::FieldDefinition::of_type(SemanticType::Email)
            .with_normalizer("email")
            .with_custom_normalizer(|_| Some(FieldValue::Text("custom".into())));
        let out = registry.apply_definition(&def, &FieldValue::Text("A@B.com".into()));
        assert_eq!(out, FieldValue::Text("custom".into()));
    }

    #[test]
    fn semantic_type_implies_default_normalizer() {
        let registry = NormalizerRegistry::new();
        let schema = SchemaDefinition::new()
            .with_field("email", record::FieldDefinition::of_type(SemanticType::Email));
        let def = schema.definition("email").unwrap();
        let out = registry.apply_definition(def, &FieldValue::Text(" Jane@Example.COM ".into()));
        assert_eq!(out, FieldValue::Text("jane@example.com".into()));
    }

    #[test]
    fn build_time_resolution_rejects_unknown() {
        let registry = NormalizerRegistry::new();
        assert!(registry.resolve("nope", None).is_err());
        assert!(registry.resolve("email", None).is_ok());
    }
}
