//! Tag resolution against the option catalog.
//!
//! Free-text input typed into a scope is mapped to a canonical catalog value when one can be
//! found. Resolution tries, in order:
//!
//! 1. a case-insensitive exact match,
//! 2. a prefix match (only once the input is at least [`PREFIX_MATCH_MIN_LEN`] characters),
//! 3. a substring match in either direction,
//!
//! and otherwise keeps the trimmed input as a custom tag. Resolution never fails.

use crate::catalog::{OptionCatalog, ScopeType};
use crate::constants::PREFIX_MATCH_MIN_LEN;
use scope_types::fold_case;

/// Resolves `raw` to a tag for `scope_type`.
///
/// # Returns
///
/// `None` if `raw` is empty or whitespace only; otherwise the catalog's canonical spelling of
/// the best match, or the trimmed input itself when nothing in the catalog matches.
pub fn find_matching_option(
    catalog: &OptionCatalog,
    scope_type: ScopeType,
    raw: &str,
) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let options = catalog.options(scope_type);
    let wanted = fold_case(trimmed);

    if let Some(exact) = options.iter().find(|o| fold_case(o) == wanted) {
        return Some(exact.clone());
    }

    if wanted.chars().count() >= PREFIX_MATCH_MIN_LEN {
        if let Some(prefixed) = options.iter().find(|o| fold_case(o).starts_with(&wanted)) {
            return Some(prefixed.clone());
        }
    }

    let overlapping = options.iter().find(|o| {
        let folded = fold_case(o);
        folded.contains(&wanted) || wanted.contains(&folded)
    });
    if let Some(found) = overlapping {
        return Some(found.clone());
    }

    Some(trimmed.to_string())
}

/// Splits comma-separated input into trimmed, non-empty segments.
pub fn split_comma_separated(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
