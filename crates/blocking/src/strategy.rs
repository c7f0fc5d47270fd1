//! Blocking strategy configuration and per-record key derivation.

use std::fmt;
use std::sync::Arc;

use compare::{metaphone_code, soundex_code, MetaphoneParams};
use normalize::parse_date;
use record::{FieldValue, Record};
use serde::{Deserialize, Serialize};

use crate::error::BlockingError;

/// A user-supplied key transform: `value -> key | null`.
#[derive(Clone)]
pub struct KeyFn(pub Arc<dyn Fn(&FieldValue) -> Option<String> + Send + Sync>);

impl KeyFn {
    pub fn new(f: impl Fn(&FieldValue) -> Option<String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for KeyFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyFn(..)")
    }
}

/// Transform applied to a field value before it becomes a blocking key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyTransform {
    /// First character, lowercased.
    FirstLetter,
    /// Four-digit year extracted from a date-like value.
    Year,
    /// Soundex code of the value.
    Soundex,
    /// Metaphone code of the value.
    Metaphone,
    /// Caller-supplied transform. Not expressible in config files.
    #[serde(skip)]
    Custom(KeyFn),
}

impl KeyTransform {
    /// Derive a key from a field value. `None` excludes the record from
    /// the block index.
    pub fn key(&self, value: &FieldValue) -> Option<String> {
        if value.is_null() {
            return None;
        }
        match self {
            KeyTransform::Custom(f) => (f.0)(value),
            KeyTransform::FirstLetter => {
                let text = value.display_string();
                text.trim()
                    .chars()
                    .next()
                    .map(|c| c.to_lowercase().to_string())
            }
            KeyTransform::Year => year_of(value),
            KeyTransform::Soundex => {
                let code = soundex_code(&value.display_string());
                (!code.is_empty()).then_some(code)
            }
            KeyTransform::Metaphone => {
                let code = metaphone_code(&value.display_string(), &MetaphoneParams::default());
                (!code.is_empty()).then_some(code)
            }
        }
    }
}

/// Year from a timestamp, a parseable date string, or the first
/// four-digit run in the text.
fn year_of(value: &FieldValue) -> Option<String> {
    if let FieldValue::Timestamp(ts) = value {
        return Some(ts.format("%Y").to_string());
    }
    if let FieldValue::Number(n) = value {
        let n = *n as i64;
        if (1000..=9999).contains(&n) {
            return Some(n.to_string());
        }
        return None;
    }
    let text = value.display_string();
    if let Some(date) = parse_date(&text) {
        return Some(date.format("%Y").to_string());
    }
    let digits: Vec<char> = text.chars().collect();
    digits
        .windows(4)
        .position(|w| w.iter().all(|c| c.is_ascii_digit()))
        .map(|i| digits[i..i + 4].iter().collect())
}

/// Combination mode for composite strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeMode {
    /// A pair is emitted if any child emits it.
    Union,
    /// A pair is emitted only if every child emits it.
    Intersection,
}

/// A candidate-reduction strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockingStrategy {
    /// Group records by a (transformed) key; compare within groups.
    Standard {
        field: String,
        #[serde(default)]
        transform: Option<KeyTransform>,
        /// Blocks larger than this are dropped with a warning.
        #[serde(default)]
        max_block_size: Option<usize>,
    },
    /// Sort by a field and compare records within a sliding window.
    SortedNeighbourhood {
        field: String,
        /// Window size; odd and at least 3.
        window: usize,
    },
    /// Combine child strategies by union or intersection.
    Composite {
        children: Vec<BlockingStrategy>,
        mode: CompositeMode,
    },
}

impl BlockingStrategy {
    /// Standard blocking on a raw field value.
    pub fn standard(field: impl Into<String>) -> Self {
        BlockingStrategy::Standard {
            field: field.into(),
            transform: None,
            max_block_size: None,
        }
    }

    /// Standard blocking with a key transform.
    pub fn standard_with(field: impl Into<String>, transform: KeyTransform) -> Self {
        BlockingStrategy::Standard {
            field: field.into(),
            transform: Some(transform),
            max_block_size: None,
        }
    }

    /// Sorted-neighbourhood blocking.
    pub fn sorted_neighbourhood(field: impl Into<String>, window: usize) -> Self {
        BlockingStrategy::SortedNeighbourhood {
            field: field.into(),
            window,
        }
    }

    /// Union of child strategies.
    pub fn union(children: Vec<BlockingStrategy>) -> Self {
        BlockingStrategy::Composite {
            children,
            mode: CompositeMode::Union,
        }
    }

    /// Intersection of child strategies.
    pub fn intersection(children: Vec<BlockingStrategy>) -> Self {
        BlockingStrategy::Composite {
            children,
            mode: CompositeMode::Intersection,
        }
    }

    /// Validate the strategy tree.
    pub fn validate(&self) -> Result<(), BlockingError> {
        match self {
            BlockingStrategy::Standard { field, .. } => {
                if field.trim().is_empty() {
                    return Err(BlockingError::InvalidConfig(
                        "standard blocking requires a field".into(),
                    ));
                }
                Ok(())
            }
            BlockingStrategy::SortedNeighbourhood { field, window } => {
                if field.trim().is_empty() {
                    return Err(BlockingError::InvalidConfig(
                        "sorted-neighbourhood blocking requires a field".into(),
                    ));
                }
                if *window < 3 || *window % 2 == 0 {
                    return Err(BlockingError::InvalidConfig(format!(
                        "sorted-neighbourhood window must be odd and >= 3, got {window}"
                    )));
                }
                Ok(())
            }
            BlockingStrategy::Composite { children, .. } => {
                if children.is_empty() {
                    return Err(BlockingError::InvalidConfig(
                        "composite blocking requires at least one child".into(),
                    ));
                }
                children.iter().try_for_each(BlockingStrategy::validate)
            }
        }
    }

    /// Blocking key for a record under a standard strategy; `None` for
    /// other strategies or null keys.
    pub fn key_for(&self, record: &Record) -> Option<String> {
        match self {
            BlockingStrategy::Standard { field, transform, .. } => {
                let value = record.field(field);
                match transform {
                    Some(t) => t.key(value),
                    None => {
                        if value.is_null() {
                            None
                        } else {
                            let text = value.display_string();
                            (!text.is_empty()).then_some(text)
                        }
                    }
                }
            }
            _ => None,
        }
    }
}
