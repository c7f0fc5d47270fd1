//! Phone number canonicalization.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::text::numeric_only;

/// Options for the `phone` normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneOptions {
    /// ISO 3166-1 alpha-2 region used to attach a country calling code
    /// when the input carries none. Without a region the normalizer emits
    /// bare digits.
    #[serde(default)]
    pub default_region: Option<String>,
}

/// Country calling codes for the regions the engine canonicalizes.
static DIALING_PREFIXES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("US", "1"),
        ("CA", "1"),
        ("GB", "44"),
        ("IE", "353"),
        ("FR", "33"),
        ("DE", "49"),
        ("ES", "34"),
        ("IT", "39"),
        ("NL", "31"),
        ("AU", "61"),
        ("NZ", "64"),
        ("IN", "91"),
        ("JP", "81"),
        ("BR", "55"),
        ("MX", "52"),
    ])
});

/// Canonicalize a phone number.
///
/// Strips everything but digits, then attempts E.164 form when a default
/// region is configured: a leading `+` or an existing region prefix is
/// honored, otherwise the region's calling code is prepended. Numbers
/// with fewer than 7 or more than 15 digits normalize to `None`.
pub fn normalize_phone(input: &str, options: &PhoneOptions) -> Option<String> {
    let trimmed = input.trim();
    let explicit_plus = trimmed.starts_with('+');
    let digits = numeric_only(trimmed);

    if digits.len() < 7 || digits.len() > 15 {
        return None;
    }

    let region_prefix = options
        .default_region
        .as_deref()
        .map(|r| r.trim().to_ascii_uppercase())
        .and_then(|r| DIALING_PREFIXES.get(r.as_str()).copied());

    match region_prefix {
        None => Some(digits),
        Some(prefix) => {
            if explicit_plus {
                return Some(format!("+{digits}"));
            }
            // US convention: a leading 1 on an 11-digit number is the
            // country code itself.
            if digits.starts_with(prefix) && digits.len() > 10 {
                return Some(format!("+{digits}"));
            }
            let candidate = format!("+{prefix}{digits}");
            // E.164 allows at most 15 digits after the plus.
            if candidate.len() - 1 > 15 {
                return None;
            }
            Some(candidate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_region(region: &str) -> PhoneOptions {
        PhoneOptions {
            default_region: Some(region.to_string()),
        }
    }

    #[test]
    fn strips_punctuation_without_region() {
        let opts = PhoneOptions::default();
        assert_eq!(
            normalize_phone("(555) 010-4477", &opts).as_deref(),
            Some("5550104477")
        );
    }

    #[test]
    fn attaches_us_prefix() {
        let opts = with_region("us");
        assert_eq!(
            normalize_phone("555-010-4477", &opts).as_deref(),
            Some("+15550104477")
        );
        // Already carries the country code.
        assert_eq!(
            normalize_phone("1 555 010 4477", &opts).as_deref(),
            Some("+15550104477")
        );
        // Explicit plus is trusted as-is.
        assert_eq!(
            normalize_phone("+44 20 7946 0958", &opts).as_deref(),
            Some("+442079460958")
        );
    }

    #[test]
    fn rejects_out_of_range_lengths() {
        let opts = PhoneOptions::default();
        assert_eq!(normalize_phone("123456", &opts), None);
        assert_eq!(normalize_phone("1234567890123456", &opts), None);
        assert_eq!(normalize_phone("", &opts), None);
    }

    #[test]
    fn unknown_region_falls_back_to_digits() {
        let opts = with_region("ZZ");
        assert_eq!(
            normalize_phone("555-010-4477", &opts).as_deref(),
            Some("5550104477")
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let opts = with_region("US");
        let once = normalize_phone("(555) 010-4477", &opts).unwrap();
        assert_eq!(
            normalize_phone(&once, &opts).as_deref(),
            Some(once.as_str())
        );
    }
}
