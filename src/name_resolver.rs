//! # Name Resolver
//!
//! Matches free-text ingredient names produced by the vision model against the
//! [nutrient catalog](crate::knowledge_base::NUTRIENT_CATALOG).
//!
//! For each catalog entry, in catalog order, a name matches when its trimmed,
//! lowercased form:
//!
//! 1. equals the entry's canonical name (lowercased), or
//! 2. equals one of its aliases, or
//! 3. contains an alias, or is contained in one, on token boundaries.
//!
//! The first matching entry wins. Containment only counts when the inner string
//! starts and ends on a non-alphanumeric boundary of the outer one, so that
//! "vitamin b1" does not match inside "vitamin b12" and the single-letter
//! iodine alias "i" does not match inside every word containing an i.

use log::trace;

use crate::knowledge_base::{NutrientReference, NUTRIENT_CATALOG};

/// Find the catalog entry for a raw ingredient name
///
/// Returns `None` for unknown ingredients; callers treat those as valid but
/// unverifiable rather than as errors.
///
/// # Examples
///
/// ```rust
/// use vitamin_scan::name_resolver::resolve;
///
/// assert_eq!(resolve("folate").unwrap().canonical_name, "Folic Acid");
/// assert_eq!(resolve("VITAMIN D").unwrap().canonical_name, "Vitamin D3");
/// assert!(resolve("xyzzy-not-a-vitamin").is_none());
/// ```
pub fn resolve(raw_name: &str) -> Option<&'static NutrientReference> {
    let search = raw_name.trim().to_lowercase();
    if search.is_empty() {
        return None;
    }

    let found = NUTRIENT_CATALOG.iter().find(|entry| matches_entry(&search, entry));

    trace!(
        "Resolved '{}' to {:?}",
        raw_name,
        found.map(|entry| entry.canonical_name)
    );

    found
}

/// Canonical name for a raw ingredient name; unresolved names pass through unchanged
pub fn normalize_ingredient_name(name: &str) -> String {
    resolve(name)
        .map(|entry| entry.canonical_name.to_string())
        .unwrap_or_else(|| name.to_string())
}

fn matches_entry(search: &str, entry: &NutrientReference) -> bool {
    if entry.canonical_name.to_lowercase() == search {
        return true;
    }

    entry.aliases.iter().any(|alias| {
        *alias == search || contains_on_boundary(search, alias) || contains_on_boundary(alias, search)
    })
}

/// True when `needle` occurs in `haystack` delimited by non-alphanumeric characters
fn contains_on_boundary(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_resolution() {
        let lower = resolve("vitamin d").unwrap();
        let title = resolve("Vitamin D").unwrap();
        let upper = resolve("VITAMIN D").unwrap();

        assert_eq!(lower.id, "vitamin-d");
        assert!(std::ptr::eq(lower, title));
        assert!(std::ptr::eq(title, upper));
    }

    #[test]
    fn test_canonical_name_match() {
        assert_eq!(resolve("Thiamin (Vitamin B1)").unwrap().id, "vitamin-b1");
        assert_eq!(resolve("  Folic Acid  ").unwrap().id, "folic-acid");
    }

    #[test]
    fn test_alias_match() {
        assert_eq!(resolve("folate").unwrap().canonical_name, "Folic Acid");
        assert_eq!(resolve("Cholecalciferol").unwrap().canonical_name, "Vitamin D3");
        assert_eq!(resolve("fe").unwrap().canonical_name, "Iron");
    }

    #[test]
    fn test_containment_match() {
        // alias inside a longer label name
        assert_eq!(
            resolve("Vitamin D3 (as Cholecalciferol)").unwrap().id,
            "vitamin-d"
        );
        assert_eq!(resolve("Calcium Pantothenate").unwrap().id, "pantothenic-acid");
        // label name inside a longer alias
        assert_eq!(resolve("retinyl").unwrap().id, "vitamin-a");
        assert_eq!(resolve("ascorbic").unwrap().id, "vitamin-c");
    }

    #[test]
    fn test_token_boundaries() {
        assert_eq!(resolve("Vitamin B12").unwrap().id, "vitamin-b12");
        assert_eq!(resolve("vitamin b1").unwrap().id, "vitamin-b1");
        assert!(resolve("xyzzy-not-a-vitamin").is_none());
        assert!(resolve("Ferrous").is_none());
    }

    #[test]
    fn test_first_entry_wins() {
        // "omega-3" is an alias of both DHA and EPA; DHA comes first
        assert_eq!(resolve("Omega-3").unwrap().id, "dha");
    }

    #[test]
    fn test_unknown_and_empty_names() {
        assert!(resolve("").is_none());
        assert!(resolve("   ").is_none());
        assert!(resolve("Gelatin").is_none());
    }

    #[test]
    fn test_normalize_ingredient_name() {
        assert_eq!(normalize_ingredient_name("folate"), "Folic Acid");
        assert_eq!(normalize_ingredient_name("Gelatin"), "Gelatin");
        assert_eq!(normalize_ingredient_name("Iron"), "Iron");
    }

    #[test]
    fn test_contains_on_boundary() {
        assert!(contains_on_boundary("vitamin d3 (as x)", "vitamin d3"));
        assert!(!contains_on_boundary("vitamin d3", "vitamin d"));
        assert!(contains_on_boundary("omega-3", "omega"));
        assert!(!contains_on_boundary("b", "b12"));
    }
}
