//! Date canonicalization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which shape the `date` normalizer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateOutput {
    /// A single `YYYY-MM-DD` string.
    #[default]
    Iso,
    /// `[year, month, day]` components, zero-padded.
    Components,
}

/// Options for the `date` normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOptions {
    #[serde(default)]
    pub output: DateOutput,
}

/// Text formats tried in order, after RFC 3339. Month-first is tried
/// before day-first, so ambiguous slash dates resolve US-style.
const FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a date from text.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Canonicalize a date per the options. Unparseable text yields `None`.
pub fn normalize_date(input: &str, options: &DateOptions) -> Option<DateValue> {
    let date = parse_date(input)?;
    Some(render(date, options))
}

/// Render an already-parsed date per the options.
pub fn render(date: NaiveDate, options: &DateOptions) -> DateValue {
    match options.output {
        DateOutput::Iso => DateValue::Iso(date.format("%Y-%m-%d").to_string()),
        DateOutput::Components => DateValue::Components(vec![
            date.format("%Y").to_string(),
            date.format("%m").to_string(),
            date.format("%d").to_string(),
        ]),
    }
}

/// Output of the date normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    Iso(String),
    Components(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(input: &str) -> Option<String> {
        match normalize_date(input, &DateOptions::default()) {
            Some(DateValue::Iso(s)) => Some(s),
            _ => None,
        }
    }

    #[test]
    fn parses_common_formats() {
        for input in [
            "1990-06-15",
            "1990/06/15",
            "06/15/1990",
            "June 15, 1990",
            "Jun 15, 1990",
            "15 June 1990",
            "1990-06-15T10:30:00Z",
        ] {
            assert_eq!(iso(input).as_deref(), Some("1990-06-15"), "input {input:?}");
        }
    }

    #[test]
    fn day_first_resolves_when_unambiguous() {
        // 25 cannot be a month, so the day-first format matches.
        assert_eq!(iso("25/06/1990").as_deref(), Some("1990-06-25"));
    }

    #[test]
    fn components_output() {
        let value = normalize_date("1990-06-05", &DateOptions {
            output: DateOutput::Components,
        });
        assert_eq!(
            value,
            Some(DateValue::Components(vec![
                "1990".into(),
                "06".into(),
                "05".into()
            ]))
        );
    }

    #[test]
    fn unparseable_yields_none() {
        assert_eq!(iso("not a date"), None);
        assert_eq!(iso(""), None);
        assert_eq!(iso("13/13/1990"), None);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = iso("06/15/1990").unwrap();
        assert_eq!(iso(&once).as_deref(), Some(once.as_str()));
    }
}
