//! # Amount Validator
//!
//! Checks a parsed (name, amount, unit) triple against the typical dosage range
//! of the matching catalog entry.
//!
//! The policy is asymmetric: an amount below the range only produces a soft
//! warning, an amount above it invalidates the line. No unit conversion is
//! attempted; a unit that differs from the range unit cannot be judged and is
//! accepted.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::name_resolver::resolve;
use crate::nutrient_model::Population;

lazy_static! {
    /// Leading decimal number, optionally signed, optionally in exponent form
    static ref LEADING_NUMBER: Regex =
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
            .expect("Leading number pattern should be valid");

    /// Thousands separators between digit groups ("1,000" / "2,565")
    static ref THOUSANDS_SEPARATOR: Regex =
        Regex::new(r"(\d),(\d{3})").expect("Thousands separator pattern should be valid");
}

/// Outcome of an amount check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AmountValidation {
    /// False only when the amount exceeds the safe upper limit
    pub valid: bool,
    pub warning: Option<String>,
}

impl AmountValidation {
    fn accepted() -> Self {
        Self {
            valid: true,
            warning: None,
        }
    }
}

/// Validate an amount for a named nutrient
///
/// # Examples
///
/// ```rust
/// use vitamin_scan::amount_validator::validate_amount;
/// use vitamin_scan::nutrient_model::Population;
///
/// let over = validate_amount("Iron", 50.0, "mg", Population::Prenatal);
/// assert!(!over.valid);
///
/// let under = validate_amount("Iron", 5.0, "mg", Population::Prenatal);
/// assert!(under.valid);
/// assert!(under.warning.is_some());
/// ```
pub fn validate_amount(name: &str, amount: f64, unit: &str, population: Population) -> AmountValidation {
    let Some(entry) = resolve(name) else {
        return AmountValidation::accepted();
    };

    let Some(range) = entry.range_for(population) else {
        return AmountValidation::accepted();
    };

    if range.unit != unit {
        debug!(
            "Cannot judge {} {}{}: typical range is expressed in {}",
            name, amount, unit, range.unit
        );
        return AmountValidation::accepted();
    }

    if amount < range.min {
        return AmountValidation {
            valid: true,
            warning: Some(format!(
                "{}: {}{} is below typical range ({}-{}{})",
                name, amount, unit, range.min, range.max, unit
            )),
        };
    }

    if amount > range.max {
        return AmountValidation {
            valid: false,
            warning: Some(format!(
                "{}: {}{} exceeds safe upper limit ({}{})",
                name, amount, unit, range.max, unit
            )),
        };
    }

    AmountValidation::accepted()
}

/// Static cautionary notes for a nutrient; empty when unknown
pub fn ingredient_warnings(name: &str) -> Vec<String> {
    resolve(name)
        .map(|entry| entry.warnings.iter().map(|w| w.to_string()).collect())
        .unwrap_or_default()
}

/// Whether a unit is customary for a nutrient; unknown nutrients accept any unit
pub fn is_valid_unit(name: &str, unit: &str) -> bool {
    resolve(name).map_or(true, |entry| entry.uses_unit(unit))
}

/// Parse the numeric part of an amount string
///
/// Takes the leading decimal number after removing thousands separators, so
/// "2,000" is 2000 and "600 mcg" is 600. Returns `None` when the text does
/// not start with a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = THOUSANDS_SEPARATOR.replace_all(raw.trim(), "$1$2");
    LEADING_NUMBER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_range_is_invalid() {
        let result = validate_amount("Iron", 50.0, "mg", Population::Prenatal);
        assert!(!result.valid);
        assert_eq!(
            result.warning.as_deref(),
            Some("Iron: 50mg exceeds safe upper limit (45mg)")
        );
    }

    #[test]
    fn test_under_range_is_soft_warning() {
        let result = validate_amount("Iron", 5.0, "mg", Population::Prenatal);
        assert!(result.valid);
        assert_eq!(
            result.warning.as_deref(),
            Some("Iron: 5mg is below typical range (27-45mg)")
        );
    }

    #[test]
    fn test_in_range_and_boundaries() {
        assert_eq!(
            validate_amount("Iron", 27.0, "mg", Population::Prenatal),
            AmountValidation { valid: true, warning: None }
        );
        assert_eq!(
            validate_amount("Iron", 45.0, "mg", Population::Prenatal),
            AmountValidation { valid: true, warning: None }
        );
    }

    #[test]
    fn test_population_changes_range() {
        // 10mg iron is low for pregnancy but fine for a general adult
        assert!(validate_amount("Iron", 10.0, "mg", Population::Prenatal).warning.is_some());
        assert!(validate_amount("Iron", 10.0, "mg", Population::Adult).warning.is_none());
    }

    #[test]
    fn test_unjudgeable_inputs_are_accepted() {
        // unit mismatch, no conversion attempted
        let mismatch = validate_amount("Vitamin D3", 15.0, "mcg", Population::Prenatal);
        assert!(mismatch.valid);
        assert!(mismatch.warning.is_none());

        // unknown ingredient
        let unknown = validate_amount("Gelatin", 99999.0, "mg", Population::Prenatal);
        assert!(unknown.valid);
        assert!(unknown.warning.is_none());
    }

    #[test]
    fn test_fractional_amounts_format_plainly() {
        let result = validate_amount("Vitamin B6", 1.5, "mg", Population::Prenatal);
        assert_eq!(
            result.warning.as_deref(),
            Some("Vitamin B6: 1.5mg is below typical range (1.9-100mg)")
        );
    }

    #[test]
    fn test_ingredient_warnings() {
        assert_eq!(
            ingredient_warnings("folate"),
            vec!["Essential during pregnancy - prevents neural tube defects".to_string()]
        );
        assert_eq!(ingredient_warnings("Iron").len(), 2);
        assert!(ingredient_warnings("Vitamin C").is_empty());
        assert!(ingredient_warnings("Gelatin").is_empty());
    }

    #[test]
    fn test_is_valid_unit() {
        assert!(is_valid_unit("Iron", "mg"));
        assert!(!is_valid_unit("Iron", "IU"));
        assert!(is_valid_unit("Vitamin D3", "iu"));
        assert!(is_valid_unit("Gelatin", "furlongs"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("600"), Some(600.0));
        assert_eq!(parse_amount(" 1.4 "), Some(1.4));
        assert_eq!(parse_amount("600 mcg"), Some(600.0));
        assert_eq!(parse_amount("2,000"), Some(2000.0));
        assert_eq!(parse_amount(".5"), Some(0.5));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("~15"), None);
        assert_eq!(parse_amount(""), None);
    }
}
