//! The built-in normalizer variants and their dispatch.

use record::FieldValue;
use serde::{Deserialize, Serialize};

use crate::address::{normalize_address, AddressOptions};
use crate::date::{normalize_date, render, DateOptions, DateValue};
use crate::email::{normalize_email, EmailOptions};
use crate::error::NormalizeError;
use crate::name::{normalize_name, NameOptions};
use crate::phone::{normalize_phone, PhoneOptions};
use crate::text;

/// A built-in value normalizer.
///
/// Normalizers map `value -> value | null` and are pure: applying one
/// twice yields the same result as applying it once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum Normalizer {
    /// Trim surrounding whitespace.
    Trim,
    /// Locale-free lowercasing.
    Lowercase,
    /// Locale-free uppercasing.
    Uppercase,
    /// Collapse whitespace runs and trim.
    NormalizeWhitespace,
    /// Keep only alphanumeric characters.
    AlphanumericOnly,
    /// Keep only ASCII digits.
    NumericOnly,
    /// Personal names: clean, optionally parse into components.
    Name(NameOptions),
    /// Email addresses: lowercase, optional plus-address stripping.
    Email(EmailOptions),
    /// Phone numbers: digit stripping, optional E.164 canonicalization.
    Phone(PhoneOptions),
    /// Postal addresses: abbreviations and whitespace collapse.
    Address(AddressOptions),
    /// Dates: parse common formats, emit ISO or components.
    Date(DateOptions),
}

impl Normalizer {
    /// Resolve an external name plus raw options into a normalizer.
    ///
    /// Unknown names are reported as an error; the registry decides
    /// whether that is fatal (build time) or a raw-value fallback
    /// (resolution time).
    pub fn from_name(
        name: &str,
        options: Option<&serde_json::Value>,
    ) -> Result<Self, NormalizeError> {
        fn opts<T: Default + serde::de::DeserializeOwned>(
            name: &str,
            options: Option<&serde_json::Value>,
        ) -> Result<T, NormalizeError> {
            match options {
                None => Ok(T::default()),
                Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                    NormalizeError::InvalidOptions {
                        name: name.to_string(),
                        message: e.to_string(),
                    }
                }),
            }
        }

        match name.trim() {
            "trim" => Ok(Normalizer::Trim),
            "lowercase" => Ok(Normalizer::Lowercase),
            "uppercase" => Ok(Normalizer::Uppercase),
            "normalizeWhitespace" | "whitespace" => Ok(Normalizer::NormalizeWhitespace),
            "alphanumericOnly" => Ok(Normalizer::AlphanumericOnly),
            "numericOnly" => Ok(Normalizer::NumericOnly),
            "name" => Ok(Normalizer::Name(opts(name, options)?)),
            "email" => Ok(Normalizer::Email(opts(name, options)?)),
            "phone" => Ok(Normalizer::Phone(opts(name, options)?)),
            "address" => Ok(Normalizer::Address(opts(name, options)?)),
            "date" => Ok(Normalizer::Date(opts(name, options)?)),
            other => Err(NormalizeError::UnknownNormalizer(other.to_string())),
        }
    }

    /// External name, for logs and explanations.
    pub fn name(&self) -> &'static str {
        match self {
            Normalizer::Trim => "trim",
            Normalizer::Lowercase => "lowercase",
            Normalizer::Uppercase => "uppercase",
            Normalizer::NormalizeWhitespace => "normalizeWhitespace",
            Normalizer::AlphanumericOnly => "alphanumericOnly",
            Normalizer::NumericOnly => "numericOnly",
            Normalizer::Name(_) => "name",
            Normalizer::Email(_) => "email",
            Normalizer::Phone(_) => "phone",
            Normalizer::Address(_) => "address",
            Normalizer::Date(_) => "date",
        }
    }

    /// Apply the normalizer to a value.
    ///
    /// Null stays null. Text inputs are NFKC-folded before the
    /// normalizer proper runs, so visually equivalent Unicode sequences
    /// canonicalize identically under every normalizer. Text lists are
    /// normalized element-wise by the generic text normalizers and
    /// passed through by the domain ones. A value a domain normalizer
    /// rejects (malformed email, out-of-range phone, unparseable date)
    /// becomes null.
    pub fn apply(&self, value: &FieldValue) -> Result<FieldValue, NormalizeError> {
        match value {
            FieldValue::Null => Ok(FieldValue::Null),
            FieldValue::Text(s) => self.apply_text(s),
            FieldValue::TextList(items) => self.apply_list(items),
            FieldValue::Timestamp(ts) => match self {
                Normalizer::Date(options) => Ok(date_value(render(ts.date_naive(), options))),
                _ => Ok(value.clone()),
            },
            FieldValue::Number(_) => match self {
                Normalizer::Phone(options) => Ok(option_text(normalize_phone(
                    &value.display_string(),
                    options,
                ))),
                _ => Ok(value.clone()),
            },
            FieldValue::Boolean(_) => Ok(value.clone()),
        }
    }

    fn apply_text(&self, s: &str) -> Result<FieldValue, NormalizeError> {
        // NFKC first: it can change character boundaries, so everything
        // downstream sees one canonical spelling.
        let folded = text::fold_unicode(s);
        let s = folded.as_str();
        Ok(match self {
            Normalizer::Trim => FieldValue::Text(text::trim(s)),
            Normalizer::Lowercase => FieldValue::Text(text::lowercase(s)),
            Normalizer::Uppercase => FieldValue::Text(text::uppercase(s)),
            Normalizer::NormalizeWhitespace => FieldValue::Text(text::collapse_whitespace(s)),
            Normalizer::AlphanumericOnly => FieldValue::Text(text::alphanumeric_only(s)),
            Normalizer::NumericOnly => FieldValue::Text(text::numeric_only(s)),
            Normalizer::Name(options) => option_text(normalize_name(s, options)),
            Normalizer::Email(options) => option_text(normalize_email(s, options)),
            Normalizer::Phone(options) => option_text(normalize_phone(s, options)),
            Normalizer::Address(options) => option_text(normalize_address(s, options)),
            Normalizer::Date(options) => match normalize_date(s, options) {
                Some(v) => date_value(v),
                None => FieldValue::Null,
            },
        })
    }

    fn apply_list(&self, items: &[String]) -> Result<FieldValue, NormalizeError> {
        match self {
            Normalizer::Trim
            | Normalizer::Lowercase
            | Normalizer::Uppercase
            | Normalizer::NormalizeWhitespace
            | Normalizer::AlphanumericOnly
            | Normalizer::NumericOnly => {
                let mapped = items
                    .iter()
                    .map(|item| match self.apply_text(item)? {
                        FieldValue::Text(s) => Ok(s),
                        other => Ok(other.display_string()),
                    })
                    .collect::<Result<Vec<_>, NormalizeError>>()?;
                Ok(FieldValue::TextList(mapped))
            }
            _ => Ok(FieldValue::TextList(items.to_vec())),
        }
    }
}

fn option_text(value: Option<String>) -> FieldValue {
    match value {
        Some(s) => FieldValue::Text(s),
        None => FieldValue::Null,
    }
}

fn date_value(value: DateValue) -> FieldValue {
    match value {
        DateValue::Iso(s) => FieldValue::Text(s),
        DateValue::Components(parts) => FieldValue::TextList(parts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_ins_are_idempotent_on_values() {
        let normalizers = [
            Normalizer::Trim,
            Normalizer::Lowercase,
            Normalizer::Uppercase,
            Normalizer::NormalizeWhitespace,
            Normalizer::AlphanumericOnly,
            Normalizer::NumericOnly,
            Normalizer::Name(NameOptions::default()),
            Normalizer::Email(EmailOptions::default()),
            Normalizer::Phone(PhoneOptions::default()),
            Normalizer::Address(AddressOptions::default()),
            Normalizer::Date(DateOptions::default()),
        ];
        let values = [
            FieldValue::Text("  Jane   SMITH  ".into()),
            FieldValue::Text("John+work@Example.com".into()),
            FieldValue::Text("(555) 010-4477".into()),
            FieldValue::Text("123 Main Street, Springfield, Illinois".into()),
            FieldValue::Text("06/15/1990".into()),
            FieldValue::Null,
            FieldValue::TextList(vec!["  A ".into(), "b".into()]),
        ];
        for normalizer in &normalizers {
            for value in &values {
                let once = normalizer.apply(value).expect("first application");
                let twice = normalizer.apply(&once).expect("second application");
                assert_eq!(twice, once, "{} on {value:?}", normalizer.name());
            }
        }
    }

    #[test]
    fn unicode_equivalence_nfkc() {
        // Composed and decomposed spellings canonicalize identically.
        let composed = FieldValue::Text("Caf\u{00E9} Street".into());
        let decomposed = FieldValue::Text("Cafe\u{0301} Street".into());
        for normalizer in [
            Normalizer::Lowercase,
            Normalizer::NormalizeWhitespace,
            Normalizer::Address(AddressOptions::default()),
            Normalizer::Name(NameOptions::default()),
        ] {
            let a = normalizer.apply(&composed).expect("composed");
            let b = normalizer.apply(&decomposed).expect("decomposed");
            assert_eq!(a, b, "{}", normalizer.name());
        }
        // Compatibility forms fold too: fullwidth digits become ASCII.
        let wide = Normalizer::NumericOnly
            .apply(&FieldValue::Text("\u{FF15}\u{FF15}\u{FF15}".into()))
            .unwrap();
        assert_eq!(wide, FieldValue::Text("555".into()));
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!(matches!(
            Normalizer::from_name("sparkle", None),
            Err(NormalizeError::UnknownNormalizer(_))
        ));
    }

    #[test]
    fn options_parse_from_json() {
        let options = serde_json::json!({ "remove_plus_addressing": true });
        let normalizer = Normalizer::from_name("email", Some(&options)).unwrap();
        let out = normalizer
            .apply(&FieldValue::Text("a+b@x.com".into()))
            .unwrap();
        assert_eq!(out, FieldValue::Text("a@x.com".into()));
    }

    #[test]
    fn malformed_options_are_an_error() {
        let options = serde_json::json!({ "remove_plus_addressing": "maybe" });
        assert!(matches!(
            Normalizer::from_name("email", Some(&options)),
            Err(NormalizeError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn date_timestamp_input() {
        let ts: chrono::DateTime<chrono::Utc> =
            "1990-06-15T08:00:00Z".parse().expect("timestamp");
        let out = Normalizer::Date(DateOptions::default())
            .apply(&FieldValue::Timestamp(ts))
            .unwrap();
        assert_eq!(out, FieldValue::Text("1990-06-15".into()));
    }
}
