//! Fluent assembly of a complete resolution engine.

use std::sync::Arc;

use blocking::BlockingStrategy;
use compare::Comparator;
use matcher::{FieldMatchConfig, MatchEngine, MatchingConfig, ThresholdConfig};
use merge::{MergeConfig, MergeExecutor, ProvenanceStore, SourceRecordArchive};
use normalize::NormalizerRegistry;
use record::{FieldDefinition, FieldValue, SchemaDefinition};

use crate::error::ReclinkError;

/// Builder for a [`ReclinkEngine`].
///
/// Accumulates schema fields, matching fields, thresholds, blocking
/// strategies, merge configuration, and custom normalizers, then
/// validates everything at [`build`](EngineBuilder::build). The built
/// engine is immutable: registries cannot be mutated after build.
///
/// ```rust
/// use reclink::{Comparator, EngineBuilder, FieldDefinition, FieldMatchConfig, SemanticType};
///
/// let engine = EngineBuilder::new()
///     .schema_field("email", FieldDefinition::of_type(SemanticType::Email))
///     .schema_field("lastName", FieldDefinition::of_type(SemanticType::Name))
///     .match_field("email", FieldMatchConfig::new(Comparator::Exact, 60.0))
///     .match_field("lastName", FieldMatchConfig::new(Comparator::jaro_winkler(), 40.0))
///     .thresholds(20.0, 75.0)
///     .build()
///     .unwrap();
/// # let _ = engine;
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    schema: SchemaDefinition,
    matching: MatchingConfig,
    /// Fields added by external strategy name, resolved at build.
    named_fields: Vec<(String, String, f64)>,
    blocking: Vec<BlockingStrategy>,
    merge: MergeConfig,
    registry: NormalizerRegistry,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            matching: MatchingConfig::new(ThresholdConfig::default()),
            ..Self::default()
        }
    }

    /// Define a schema field.
    pub fn schema_field(mut self, name: impl Into<String>, def: FieldDefinition) -> Self {
        self.schema.fields.insert(name.into(), def);
        self
    }

    /// Configure a field for matching.
    pub fn match_field(mut self, name: impl Into<String>, config: FieldMatchConfig) -> Self {
        self.matching.fields.insert(name.into(), config);
        self
    }

    /// Configure a field for matching by external strategy name
    /// (`"exact"`, `"levenshtein"`, `"jaro-winkler"`, `"soundex"`,
    /// `"metaphone"`). Unknown names fail at build.
    pub fn match_field_named(
        mut self,
        name: impl Into<String>,
        strategy: impl Into<String>,
        weight: f64,
    ) -> Self {
        // Resolution is deferred to build so the fluent chain stays
        // infallible.
        self.named_fields
            .push((name.into(), strategy.into(), weight));
        self
    }

    /// Set the decision thresholds.
    pub fn thresholds(mut self, no_match: f64, definite_match: f64) -> Self {
        self.matching.thresholds = ThresholdConfig::new(no_match, definite_match);
        self
    }

    /// Cap the number of candidates a resolve call returns.
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.matching.max_results = max_results;
        self
    }

    /// Add a blocking strategy. Multiple strategies union their pairs.
    pub fn blocking(mut self, strategy: BlockingStrategy) -> Self {
        self.blocking.push(strategy);
        self
    }

    /// Set the merge configuration used by merge executors built from
    /// this engine.
    pub fn merge(mut self, config: MergeConfig) -> Self {
        self.merge = config;
        self
    }

    /// Register a named custom normalizer, available to schema fields by
    /// name.
    pub fn register_normalizer(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&FieldValue) -> Option<FieldValue> + Send + Sync + 'static,
    ) -> Self {
        self.registry.register(name, f);
        self
    }

    /// Validate everything and freeze the engine.
    pub fn build(mut self) -> Result<ReclinkEngine, ReclinkError> {
        for (field, strategy, weight) in std::mem::take(&mut self.named_fields) {
            let comparator = Comparator::from_name(&strategy)
                .map_err(|e| ReclinkError::Config(format!("match field {field:?}: {e}")))?;
            self.matching
                .fields
                .insert(field, FieldMatchConfig::new(comparator, weight));
        }

        // Named normalizers in the schema must resolve now, not at
        // scoring time.
        for (field, def) in &self.schema.fields {
            if let Some(name) = &def.normalizer {
                self.registry
                    .resolve(name, def.normalizer_options.as_ref())
                    .map_err(|e| {
                        ReclinkError::Config(format!("schema field {field:?}: {e}"))
                    })?;
            }
        }

        let matcher = MatchEngine::new(self.schema, self.matching, self.blocking, self.registry)?;
        Ok(ReclinkEngine {
            matcher: Arc::new(matcher),
            merge: self.merge,
        })
    }
}

/// A fully assembled resolution engine.
///
/// Wraps the synchronous [`MatchEngine`] and the merge configuration;
/// merge executors are built per collaborator pair via
/// [`merge_executor`](ReclinkEngine::merge_executor).
#[derive(Debug)]
pub struct ReclinkEngine {
    matcher: Arc<MatchEngine>,
    merge: MergeConfig,
}

impl ReclinkEngine {
    /// The matching engine: `resolve`, `deduplicate`, `score_pair`.
    pub fn matcher(&self) -> &Arc<MatchEngine> {
        &self.matcher
    }

    /// The configured merge behavior.
    pub fn merge_config(&self) -> &MergeConfig {
        &self.merge
    }

    /// Build a merge executor over the given collaborators, carrying
    /// this engine's merge configuration.
    pub fn merge_executor(
        &self,
        provenance_store: Arc<dyn ProvenanceStore>,
        archive: Arc<dyn SourceRecordArchive>,
    ) -> MergeExecutor {
        MergeExecutor::new(self.merge.clone(), provenance_store, archive)
    }
}
