//! # Issue Detector
//!
//! Post-processes a fully annotated ingredient list and flags problems that
//! only show up across ingredients: duplicates, gaps in essential prenatal
//! coverage and low aggregate confidence.

use indexmap::IndexMap;
use log::debug;

use crate::nutrient_model::AnnotatedIngredient;

/// Nutrients every prenatal formula is expected to contain
pub const ESSENTIAL_NUTRIENTS: [&str; 4] = ["folic acid", "iron", "calcium", "vitamin d"];

/// Lists this short are treated as single-purpose supplements
pub const COVERAGE_CHECK_MIN_INGREDIENTS: usize = 4;

/// Average confidence below which the whole result needs manual review
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 70.0;

pub const LOW_CONFIDENCE_MESSAGE: &str = "Low overall confidence - results may need manual review";

/// Detect cross-ingredient issues; all checks are independent
pub fn detect_issues(ingredients: &[AnnotatedIngredient]) -> Vec<String> {
    let mut issues = Vec::new();

    // Duplicates, reported in first-seen order
    let mut name_counts: IndexMap<String, usize> = IndexMap::new();
    for ingredient in ingredients {
        *name_counts.entry(ingredient.name().to_lowercase()).or_insert(0) += 1;
    }
    for (name, count) in &name_counts {
        if *count > 1 {
            issues.push(format!("Duplicate ingredient detected: {name}"));
        }
    }

    if ingredients.len() >= COVERAGE_CHECK_MIN_INGREDIENTS {
        let missing: Vec<&str> = ESSENTIAL_NUTRIENTS
            .iter()
            .copied()
            .filter(|nutrient| !name_counts.keys().any(|name| name.contains(nutrient)))
            .collect();

        if !missing.is_empty() {
            issues.push(format!(
                "May be missing essential prenatal nutrients: {}",
                missing.join(", ")
            ));
        }
    }

    if !ingredients.is_empty() {
        let average = ingredients
            .iter()
            .map(|i| f64::from(i.confidence))
            .sum::<f64>()
            / ingredients.len() as f64;

        if average < LOW_CONFIDENCE_THRESHOLD {
            issues.push(LOW_CONFIDENCE_MESSAGE.to_string());
        }
    }

    debug!("Detected {} issues across {} ingredients", issues.len(), ingredients.len());

    issues
}
