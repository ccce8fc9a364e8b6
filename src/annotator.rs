//! # Confidence and Warning Annotator
//!
//! Attaches a 0-100 confidence score and warnings to each extracted ingredient.
//!
//! Every ingredient starts at 100 and loses a flat amount for each failed check:
//!
//! | Check | Deduction | Warning |
//! |---|---|---|
//! | amount present but not numeric | 30 | `Invalid amount: <raw>` |
//! | amount over the safe upper limit | 20 | validator warning |
//! | amount above 100000 in any unit | 30 | `Extremely high amount: ...` |
//! | amount missing | 15 | `Missing amount` |
//! | unit missing | 15 | `Missing unit` |
//! | unit not customary for a known nutrient | 25 | `Unusual unit for <name>: <unit>` |
//! | name not in the knowledge base | 10 | none |
//!
//! Known nutrients additionally carry their static catalog warnings, which do
//! not cost confidence. The final score is floored at 0.

use chrono::Utc;
use log::{debug, info};
use std::time::Duration;

use crate::amount_validator::{parse_amount, validate_amount};
use crate::issue_detector::detect_issues;
use crate::name_resolver::resolve;
use crate::nutrient_model::{
    AnalysisResult, AnnotatedAnalysis, AnnotatedIngredient, ExtractedIngredient, Population,
};

/// Amounts above this are flagged whatever the unit
pub const EXTREME_AMOUNT_THRESHOLD: f64 = 100_000.0;

const INVALID_AMOUNT_PENALTY: i32 = 30;
const OVER_RANGE_PENALTY: i32 = 20;
const EXTREME_AMOUNT_PENALTY: i32 = 30;
const MISSING_AMOUNT_PENALTY: i32 = 15;
const MISSING_UNIT_PENALTY: i32 = 15;
const UNUSUAL_UNIT_PENALTY: i32 = 25;
const UNKNOWN_NAME_PENALTY: i32 = 10;

/// Annotate an ingredient against prenatal ranges
pub fn annotate(ingredient: &ExtractedIngredient) -> AnnotatedIngredient {
    annotate_for(ingredient, Population::Prenatal)
}

/// Annotate an ingredient against the ranges of a given population
pub fn annotate_for(ingredient: &ExtractedIngredient, population: Population) -> AnnotatedIngredient {
    let mut confidence: i32 = 100;
    let mut warnings = Vec::new();

    let entry = resolve(&ingredient.name);

    let mut annotated = ingredient.clone();
    let mut original_name = None;
    let mut normalized = false;
    if let Some(entry) = entry {
        if entry.canonical_name != ingredient.name {
            original_name = Some(ingredient.name.clone());
            annotated.name = entry.canonical_name.to_string();
            normalized = true;
        }
    }

    let amount_text = ingredient.amount_text();
    let unit_text = ingredient.unit_text();

    match amount_text {
        Some(raw) => match parse_amount(raw) {
            None => {
                confidence -= INVALID_AMOUNT_PENALTY;
                warnings.push(format!("Invalid amount: {raw}"));
            }
            Some(amount) => {
                if let Some(unit) = unit_text {
                    let validation = validate_amount(&annotated.name, amount, unit, population);
                    // below-range notes stay with the validator
                    if !validation.valid {
                        confidence -= OVER_RANGE_PENALTY;
                        warnings.extend(validation.warning);
                    }

                    if amount > EXTREME_AMOUNT_THRESHOLD {
                        confidence -= EXTREME_AMOUNT_PENALTY;
                        warnings.push(format!("Extremely high amount: {amount}{unit}"));
                    }
                }
            }
        },
        None => {
            confidence -= MISSING_AMOUNT_PENALTY;
            warnings.push("Missing amount".to_string());
        }
    }

    if unit_text.is_none() {
        confidence -= MISSING_UNIT_PENALTY;
        warnings.push("Missing unit".to_string());
    }

    match entry {
        Some(entry) => {
            if let Some(unit) = unit_text {
                if !entry.uses_unit(unit) {
                    confidence -= UNUSUAL_UNIT_PENALTY;
                    warnings.push(format!("Unusual unit for {}: {}", annotated.name, unit));
                }
            }

            if annotated.chemical_form.is_none() {
                annotated.chemical_form = entry
                    .find_chemical_form(&ingredient.name)
                    .map(str::to_string);
            }

            warnings.extend(entry.warnings.iter().map(|w| w.to_string()));
        }
        None => {
            confidence -= UNKNOWN_NAME_PENALTY;
        }
    }

    debug!(
        "Annotated '{}' as '{}' with confidence {}",
        ingredient.name, annotated.name, confidence
    );

    AnnotatedIngredient {
        ingredient: annotated,
        original_name,
        confidence: floor_confidence(confidence),
        normalized,
        warnings,
    }
}

/// Clamp a running confidence score into 0..=100
pub fn floor_confidence(score: i32) -> u8 {
    score.clamp(0, 100) as u8
}

/// Annotate every ingredient of a single-pass result and collect quality warnings
pub fn annotate_result(
    result: &AnalysisResult,
    population: Population,
    elapsed: Duration,
) -> AnnotatedAnalysis {
    let analyzed_at = Utc::now();
    let processing_time_ms = elapsed.as_millis() as u64;

    if !result.success {
        let error = result
            .error
            .clone()
            .unwrap_or_else(|| "Analysis failed".to_string());
        return AnnotatedAnalysis {
            success: false,
            ingredients: Vec::new(),
            product_name: None,
            serving_size: None,
            warnings: Vec::new(),
            error: Some(error.clone()),
            failure: result.failure,
            overall_confidence: 0.0,
            quality_warnings: vec![error],
            processing_time_ms,
            analyzed_at,
        };
    }

    let ingredients: Vec<AnnotatedIngredient> = result
        .ingredients
        .iter()
        .map(|ingredient| annotate_for(ingredient, population))
        .collect();

    let overall_confidence = if ingredients.is_empty() {
        0.0
    } else {
        ingredients.iter().map(|i| f64::from(i.confidence)).sum::<f64>() / ingredients.len() as f64
    };

    let mut quality_warnings: Vec<String> = ingredients
        .iter()
        .flat_map(|i| i.warnings.iter().cloned())
        .collect();
    quality_warnings.extend(detect_issues(&ingredients));

    info!(
        "Annotated {} ingredients with {:.1}% overall confidence, {} quality warnings",
        ingredients.len(),
        overall_confidence,
        quality_warnings.len()
    );

    AnnotatedAnalysis {
        success: true,
        ingredients,
        product_name: result.product_name.clone(),
        serving_size: result.serving_size.clone(),
        warnings: result.warnings.clone(),
        error: None,
        failure: None,
        overall_confidence,
        quality_warnings,
        processing_time_ms,
        analyzed_at,
    }
}
