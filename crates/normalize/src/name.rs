//! Personal name canonicalization and component parsing.

use serde::{Deserialize, Serialize};

use crate::text::{collapse_whitespace, lowercase};

/// Which shape the name normalizer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NameOutput {
    /// First (given) name only.
    First,
    /// Last (family) name only.
    Last,
    /// The full name, canonicalized.
    #[default]
    Full,
    /// All parsed components, joined as `first middle last suffix`.
    Components,
}

/// Options for the `name` normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameOptions {
    /// Output shape; defaults to the canonicalized full name.
    #[serde(default)]
    pub output_format: NameOutput,
    /// Lowercase the output. On by default.
    #[serde(default = "default_true")]
    pub lowercase: bool,
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            output_format: NameOutput::Full,
            lowercase: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Parsed components of a personal name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameParts {
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub suffix: Option<String>,
}

/// Generational and professional suffixes recognized during parsing.
const SUFFIXES: &[&str] = &[
    "jr", "sr", "ii", "iii", "iv", "v", "phd", "md", "esq", "dds", "jd",
];

fn is_suffix(token: &str) -> bool {
    let token = token.trim_end_matches('.').to_ascii_lowercase();
    SUFFIXES.contains(&token.as_str())
}

/// Parse a name into components.
///
/// Accepts both natural order (`"John Q. Public Jr."`) and comma form
/// (`"Public, John Q."`). Middle tokens between the first and last are
/// joined into one middle component.
pub fn parse_name(input: &str) -> NameParts {
    let cleaned = collapse_whitespace(input);
    if cleaned.is_empty() {
        return NameParts::default();
    }

    // "Last, First Middle" form: rotate into natural order.
    let natural = match cleaned.split_once(',') {
        Some((last, rest)) => collapse_whitespace(&format!("{} {}", rest, last)),
        None => cleaned,
    };

    let mut tokens: Vec<String> = natural.split_whitespace().map(str::to_string).collect();

    let mut parts = NameParts::default();
    let has_suffix = tokens.len() > 1 && tokens.last().is_some_and(|t| is_suffix(t));
    if has_suffix {
        parts.suffix = tokens.pop().map(|t| t.trim_end_matches('.').to_string());
    }

    match tokens.len() {
        0 => {}
        1 => parts.first = Some(tokens.remove(0)),
        _ => {
            parts.last = tokens.pop();
            parts.first = Some(tokens.remove(0));
            if !tokens.is_empty() {
                parts.middle = Some(tokens.join(" "));
            }
        }
    }
    parts
}

/// Canonicalize a name per the options: trim, collapse whitespace,
/// optionally lowercase, optionally reduce to a single component.
pub fn normalize_name(input: &str, options: &NameOptions) -> Option<String> {
    let parts = parse_name(input);
    let selected = match options.output_format {
        NameOutput::Full => {
            let cleaned = collapse_whitespace(input);
            if cleaned.is_empty() {
                return None;
            }
            cleaned
        }
        NameOutput::First => parts.first?,
        NameOutput::Last => parts.last.or(parts.first)?,
        NameOutput::Components => {
            let joined = [parts.first, parts.middle, parts.last, parts.suffix]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            if joined.is_empty() {
                return None;
            }
            joined
        }
    };
    Some(if options.lowercase {
        lowercase(&selected)
    } else {
        selected
    })
}
