//! # reclink: entity resolution engine
//!
//! reclink decides which records drawn from one or more heterogeneous
//! sources refer to the same real-world entity, produces ranked match
//! candidates with calibrated scores and human-readable explanations,
//! and merges matching records into golden records with field-level
//! provenance and reversible unmerge.
//!
//! The umbrella crate re-exports the stage crates so applications can
//! drive the whole pipeline through a single dependency:
//!
//! ```text
//! sources ──▶ consolidate ──▶ normalize ─┐
//!                                        ├─▶ match ──▶ merge ──▶ golden record
//!             blocking ─────────────────┘                └──▶ unmerge (restores)
//! ```
//!
//! - `record`: the record/field-value data model and schema
//!   ([`Record`], [`FieldValue`], [`SchemaDefinition`]).
//! - `compare`: similarity comparators ([`Comparator`]: exact,
//!   Levenshtein, Jaro–Winkler, Soundex, Metaphone).
//! - `normalize`: value canonicalization ([`Normalizer`],
//!   [`NormalizerRegistry`]).
//! - `blocking`: candidate reduction ([`BlockingStrategy`],
//!   [`generate_pairs`]).
//! - `matcher`: weighted scoring and decisions ([`MatchEngine`],
//!   [`MatchOutcome`], [`DedupeReport`]).
//! - `merge`: golden records, provenance, unmerge ([`MergeExecutor`],
//!   [`Provenance`]).
//! - `consolidate`: multi-source schema mapping
//!   ([`ConsolidationEngine`], [`FieldMapping`], [`DatabaseAdapter`]).
//!
//! ## Quick start
//!
//! ```rust
//! use reclink::{
//!     Comparator, EngineBuilder, FieldDefinition, FieldMatchConfig, Record, SemanticType,
//! };
//!
//! let engine = EngineBuilder::new()
//!     .schema_field("email", FieldDefinition::of_type(SemanticType::Email))
//!     .schema_field("firstName", FieldDefinition::of_type(SemanticType::Name))
//!     .match_field("email", FieldMatchConfig::new(Comparator::Exact, 60.0))
//!     .match_field("firstName", FieldMatchConfig::new(Comparator::jaro_winkler(), 40.0))
//!     .thresholds(20.0, 75.0)
//!     .build()
//!     .unwrap();
//!
//! let input = Record::new("new")
//!     .with_field("email", "Jane@Example.com")
//!     .with_field("firstName", "Jane");
//! let existing = Record::new("cust-1")
//!     .with_field("email", "jane@example.com")
//!     .with_field("firstName", "Jane");
//!
//! let resolution = engine.matcher().resolve(&input, &[existing]);
//! assert_eq!(resolution.outcome, reclink::MatchOutcome::DefiniteMatch);
//! println!("{}", resolution.best().unwrap().explanation);
//! ```
//!
//! Pipelines can equally be described in YAML and loaded with
//! [`ReclinkConfig`]; see the `config` module docs for the format.
//!
//! ## Errors
//!
//! Failures converge on [`ReclinkError`]. Configuration problems surface
//! at build time; per-record data faults (normalizer failures, mapping
//! failures) are logged and collected into result error lists without
//! aborting batches; collaborator failures wrap into
//! [`AdapterError`].

mod builder;
pub mod config;
mod error;

pub use builder::{EngineBuilder, ReclinkEngine};
pub use config::{ConfigLoadError, ReclinkConfig};
pub use error::ReclinkError;

pub use record::{
    CustomNormalizer, FieldDefinition, FieldValue, NameComponent, Record, RecordError, RecordId,
    RecordMeta, SchemaDefinition, SemanticType, SourceRecord, TargetType,
};

pub use compare::{
    jaro, jaro_winkler, levenshtein_distance, levenshtein_similarity, metaphone_code,
    soundex_code, CompareError, CompareOptions, Comparator, JaroWinklerParams, MetaphoneParams,
};

pub use normalize::{
    AddressOptions, DateOptions, DateOutput, EmailOptions, NameOptions, NameOutput, NormalizeError,
    Normalizer, NormalizerRegistry, PhoneOptions,
};

pub use blocking::{
    generate_pairs, BlockingError, BlockingStats, BlockingStrategy, CandidatePairs, CompositeMode,
    KeyFn, KeyTransform,
};

pub use matcher::{
    DedupeOptions, DedupeReport, FieldComparison, FieldMatchConfig, MatchEngine, MatchError,
    MatchOutcome, MatchResult, MatchScore, MatchingConfig, PairMatch, ProgressFn, Resolution,
    ThresholdConfig,
};

pub use merge::{
    merge_records, AdapterError, ConflictResolution, DeleteHook, FieldProvenance, IdGenerator,
    InMemoryArchive, InMemoryProvenanceStore, MergeConfig, MergeConflict, MergeError,
    MergeExecutor, MergeFn, MergeOutcome, MergeStats, MergeStrategy, Provenance, ProvenanceStore,
    RestoreHook, SequentialIdGenerator, SourceRecordArchive, UnmergeError, UnmergeOutcome,
};

pub use consolidate::{
    resolve_against_adapter, ConsolidateError, ConsolidationEngine, ConsolidationReport,
    DatabaseAdapter, FieldMapping, FieldMappingBuilder, InMemoryAdapter, InMemoryQueue,
    MappedRecord, MappingFailure, MatchingScope, QueueAdapter, QueueItem, QueueStatus,
    SourceConfig, SourceStats, TransformFn, TxOp,
};
