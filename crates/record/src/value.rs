//! The tagged union of field value kinds supported by the engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// A single field value.
///
/// The engine treats records as `field -> value` maps with this union as
/// the value type; a separate [`crate::SchemaDefinition`] carries semantic
/// type information for normalizers and comparators to consult. There is
/// no runtime reflection beyond matching on these variants.
///
/// Serialization is untagged so records read naturally from JSON/YAML:
/// strings that parse as RFC 3339 instants become timestamps, everything
/// else stays text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean flag.
    Boolean(bool),
    /// Floating point number. Integers are carried as `f64` too.
    Number(f64),
    /// Instant in time.
    Timestamp(DateTime<Utc>),
    /// UTF-8 text.
    Text(String),
    /// Ordered sequence of text values (emails, address lines, tags).
    TextList(Vec<String>),
    /// Explicit absence. Missing record fields read as this variant.
    Null,
}

/// Target types for lossy coercion during consolidation mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Text,
    Number,
    Boolean,
    Date,
}

impl FieldValue {
    /// True when the value is [`FieldValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Borrow the text payload when the value is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric payload when the value is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow the list payload when the value is a text list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::TextList(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Timestamp payload when the value is a timestamp.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Human-facing name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Text(_) => "text",
            FieldValue::TextList(_) => "list",
            FieldValue::Null => "null",
        }
    }

    /// Canonical display form used when a comparator receives a non-text
    /// value. Numbers drop a trailing `.0` so `42.0` and `"42"` compare
    /// equal under the exact strategy.
    pub fn display_string(&self) -> String {
        match self {
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Timestamp(ts) => ts.to_rfc3339(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::TextList(items) => items.join(", "),
            FieldValue::Null => String::new(),
        }
    }

    /// Coerce into the requested target type.
    ///
    /// Nulls stay null under every target. Failures surface as
    /// [`RecordError::Coercion`]; the consolidation mapper turns those into
    /// skipped records rather than aborting a batch.
    pub fn coerce_to(&self, target: TargetType) -> Result<FieldValue, RecordError> {
        if self.is_null() {
            return Ok(FieldValue::Null);
        }
        match target {
            TargetType::Text => Ok(FieldValue::Text(self.display_string())),
            TargetType::Number => match self {
                FieldValue::Number(n) => Ok(FieldValue::Number(*n)),
                FieldValue::Boolean(b) => Ok(FieldValue::Number(if *b { 1.0 } else { 0.0 })),
                FieldValue::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(FieldValue::Number)
                    .map_err(|_| self.coercion_error(target)),
                _ => Err(self.coercion_error(target)),
            },
            TargetType::Boolean => match self {
                FieldValue::Boolean(b) => Ok(FieldValue::Boolean(*b)),
                FieldValue::Number(n) => Ok(FieldValue::Boolean(*n != 0.0)),
                FieldValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" => Ok(FieldValue::Boolean(true)),
                    "false" | "no" | "0" => Ok(FieldValue::Boolean(false)),
                    _ => Err(self.coercion_error(target)),
                },
                _ => Err(self.coercion_error(target)),
            },
            TargetType::Date => match self {
                FieldValue::Timestamp(ts) => Ok(FieldValue::Timestamp(*ts)),
                FieldValue::Text(s) => parse_instant(s.trim())
                    .map(FieldValue::Timestamp)
                    .ok_or_else(|| self.coercion_error(target)),
                _ => Err(self.coercion_error(target)),
            },
        }
    }

    fn coercion_error(&self, target: TargetType) -> RecordError {
        RecordError::Coercion {
            value: self.display_string(),
            from: self.type_name(),
            target: match target {
                TargetType::Text => "text",
                TargetType::Number => "number",
                TargetType::Boolean => "boolean",
                TargetType::Date => "date",
            },
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Parse an RFC 3339 instant or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::TextList(items)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(FieldValue::Null)
    }
}
