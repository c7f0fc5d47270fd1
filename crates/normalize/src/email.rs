//! Email address canonicalization.

use serde::{Deserialize, Serialize};

/// Options for the `email` normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailOptions {
    /// Strip `+tag` plus-addressing from the local part. Off by default:
    /// some providers treat tagged addresses as distinct inboxes.
    #[serde(default)]
    pub remove_plus_addressing: bool,
}

/// Canonicalize an email address: trim, lowercase local part and domain,
/// optionally strip plus-addressing.
///
/// Returns `None` for values without exactly one `@` or with an empty
/// side; those are not addresses and must not fuzzily match anything.
pub fn normalize_email(input: &str, options: &EmailOptions) -> Option<String> {
    let trimmed = input.trim();
    let mut split = trimmed.split('@');
    let (local, domain) = match (split.next(), split.next(), split.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return None,
    };
    if local.is_empty() || domain.is_empty() {
        return None;
    }

    let mut local = local.to_lowercase();
    if options.remove_plus_addressing {
        if let Some(plus) = local.find('+') {
            local.truncate(plus);
            if local.is_empty() {
                return None;
            }
        }
    }

    Some(format!("{}@{}", local, domain.to_lowercase()))
}
