//! Multi-source consolidation for the reclink entity resolution engine.
//!
//! Real deployments rarely have one clean table: customer records live
//! in a CRM, an order system, and a support tool, each with its own
//! shape. This crate projects those heterogeneous shapes into the
//! unified record schema through declarative [`FieldMapping`]s
//! (dot-notation paths or transform functions, with optional type
//! coercion), then matches the mapped records either per source first
//! or in one unified pool.
//!
//! The collaborator boundary lives here too: [`DatabaseAdapter`] is the
//! abstract store the engine fetches from, and [`QueueAdapter`] backs
//! caller-opt-in review queues for potential matches. In-memory
//! implementations of both ship for tests and small deployments.
//!
//! Mapping is forgiving with bad data: a record that fails a path
//! lookup, transform, or coercion is skipped and logged, and the
//! failure is reported in the run's `errors` list, so one bad record
//! never aborts a batch. Duplicate target fields, by contrast, are a
//! configuration bug and fail at build time.

mod adapter;
mod engine;
mod error;
mod mapping;
mod queue;

pub use crate::adapter::{DatabaseAdapter, InMemoryAdapter, TxOp};
pub use crate::engine::{
    resolve_against_adapter, ConsolidationEngine, ConsolidationReport, MatchingScope,
    SourceConfig, SourceStats,
};
pub use crate::error::{AdapterError, ConsolidateError, MappingFailure};
pub use crate::mapping::{
    FieldMapping, FieldMappingBuilder, MappedRecord, MappingEntry, MappingSource, TransformFn,
};
pub use crate::queue::{InMemoryQueue, QueueAdapter, QueueItem, QueueStatus};
