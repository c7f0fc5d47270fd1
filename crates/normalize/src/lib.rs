//! Value canonicalization for the reclink entity resolution engine.
//!
//! Normalizers transform raw field values into canonical forms before
//! comparison: names are cleaned and parsed, emails lowercased, phone
//! numbers reduced to digits or E.164, addresses abbreviated, dates
//! folded to ISO. Comparators then operate on the canonical forms, so
//! `"JANE  SMITH "` and `"jane smith"` score as the same person.
//!
//! # Core guarantee
//!
//! Every built-in normalizer is **pure** and **idempotent**:
//! `normalize(normalize(v)) == normalize(v)` for all values, and no
//! normalizer performs I/O or consults ambient state.
//!
//! # Fault policy
//!
//! Normalization faults are data errors, not pipeline errors. A lookup of
//! an unknown normalizer name, or a normalizer failure on a specific
//! value, logs a warning and falls back to the raw value; resolution of
//! the surrounding record batch continues. Build-time resolution through
//! [`NormalizerRegistry::resolve`] is strict instead, so configuration
//! typos surface before any data flows.
//!
//! ```rust
//! use normalize::{Normalizer, NormalizerRegistry};
//! use record::FieldValue;
//!
//! let n = Normalizer::from_name("email", None).unwrap();
//! let v = n.apply(&FieldValue::Text(" Jane@Example.COM ".into())).unwrap();
//! assert_eq!(v, FieldValue::Text("jane@example.com".into()));
//! ```

mod address;
mod date;
mod email;
mod error;
mod name;
mod normalizer;
mod phone;
mod registry;
mod text;

pub use crate::address::{normalize_address, AddressOptions};
pub use crate::date::{normalize_date, parse_date, DateOptions, DateOutput, DateValue};
pub use crate::email::{normalize_email, EmailOptions};
pub use crate::error::NormalizeError;
pub use crate::name::{normalize_name, parse_name, NameOptions, NameOutput, NameParts};
pub use crate::normalizer::Normalizer;
pub use crate::phone::{normalize_phone, PhoneOptions};
pub use crate::registry::NormalizerRegistry;
pub use crate::text::{
    alphanumeric_only, collapse_whitespace, fold_unicode, lowercase, numeric_only, trim, uppercase,
};
