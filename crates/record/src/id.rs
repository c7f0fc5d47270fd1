//! Opaque record identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque record identifier: either caller-supplied text or an integer.
///
/// The derived ordering (integers before text, then value order) gives the
/// engine a total order for stable tiebreaks when candidate scores are
/// equal; it carries no semantic meaning.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        RecordId::Int(n as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_total_and_stable() {
        let mut ids = vec![
            RecordId::from("b"),
            RecordId::from(2),
            RecordId::from("a"),
            RecordId::from(1),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                RecordId::Int(1),
                RecordId::Int(2),
                RecordId::Text("a".into()),
                RecordId::Text("b".into()),
            ]
        );
    }

    #[test]
    fn untagged_serde() {
        let id: RecordId = serde_json::from_str("42").unwrap();
        assert_eq!(id, RecordId::Int(42));
        let id: RecordId = serde_json::from_str("\"cust-42\"").unwrap();
        assert_eq!(id, RecordId::Text("cust-42".into()));
    }
}
