//! Candidate-pair blocking for the reclink entity resolution engine.
//!
//! Scoring every pair of records is quadratic; blocking keeps resolution
//! tractable by only emitting pairs that share a cheap signal. Three
//! strategies are provided:
//!
//! - **Standard**: group records by a (transformed) key and compare
//!   within groups. Transforms include first letter, year, Soundex,
//!   Metaphone, and caller-supplied functions.
//! - **Sorted-neighbourhood**: sort by a field and compare records whose
//!   sorted positions are within half an odd window of each other.
//! - **Composite**: union or intersection of child strategies.
//!
//! Blocking never affects the *correctness* of scoring, only which
//! pairs get scored. With no strategies configured the generator falls
//! back to full pairwise comparison. Every run reports
//! [`BlockingStats`] so operators can see the reduction they are paying
//! for.
//!
//! ```rust
//! use blocking::{generate_pairs, BlockingStrategy, KeyTransform};
//! use record::Record;
//!
//! let records = vec![
//!     Record::new(1).with_field("lastName", "Smith"),
//!     Record::new(2).with_field("lastName", "Smyth"),
//!     Record::new(3).with_field("lastName", "Jones"),
//! ];
//! let strategy = BlockingStrategy::standard_with("lastName", KeyTransform::Soundex);
//! let out = generate_pairs(&records, &[strategy]).unwrap();
//! assert_eq!(out.pairs, vec![(0, 1)]);
//! ```

mod error;
mod generator;
mod strategy;

pub use crate::error::BlockingError;
pub use crate::generator::{generate_pairs, BlockingStats, CandidatePairs};
pub use crate::strategy::{BlockingStrategy, CompositeMode, KeyFn, KeyTransform};
