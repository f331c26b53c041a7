//! Helpers for working with DNS names.
//!
//! Internally all managed names are kept in canonical FQDN form: lower-case
//! with exactly one trailing dot. DNS names are case-insensitive and the
//! trailing dot is a presentation detail, so comparisons always go through
//! [`normalize`] first.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("empty or whitespace-only name entry")]
    Empty,
}

/// Strip a name down to its comparable form: trimmed, lower-case, no trailing dot.
pub fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_lowercase()
}

/// Canonical FQDN form of a name: normalized with exactly one trailing dot.
pub fn to_fqdn(name: &str) -> String {
    format!("{}.", normalize(name))
}

/// Returns whether two names refer to the same DNS name.
pub fn names_equal(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Expand a configured alias entry into an FQDN within `zone`.
///
/// - a bare label (`api`) expands to `api.<zone>.`
/// - an entry already ending in the zone keeps its name, normalized to one trailing dot
/// - any other entry containing a dot is treated as fully qualified and only
///   gets its trailing dot normalized
///
/// Empty or whitespace-only entries are a configuration error.
pub fn expand_alias(entry: &str, zone: &str) -> Result<String, NameError> {
    let n = normalize(entry);
    let z = normalize(zone);
    if n.is_empty() {
        return Err(NameError::Empty);
    }

    if n == z || n.ends_with(&format!(".{}", z)) {
        return Ok(format!("{}.", n));
    }

    // Some other absolute name, leave it alone apart from the trailing dot
    if n.contains('.') {
        return Ok(format!("{}.", n));
    }

    Ok(format!("{}.{}.", n, z))
}
