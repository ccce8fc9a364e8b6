//! # Multi-Strategy Merger
//!
//! Curved bottles distort label text, so a single extraction often misses or
//! garbles lines. This module runs every [`ExtractionStrategy`] concurrently,
//! keeps whatever succeeded and reconciles the ingredient lists into one
//! [`MergedResult`].
//!
//! All strategies run to completion; one failing never cancels another.
//! Merging only starts once every call has settled.
//!
//! ## Merge rules
//!
//! Ingredients are keyed by lowercased name. Successful results are visited in
//! strategy order; an ingredient is inserted when its key is new and replaces
//! the existing entry only when that entry has no amount and the new one does.
//! A replacement keeps the original position, so the final order is the order
//! in which names were first seen across strategies, not label order.

use futures::future::join_all;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::time::Duration;
use tracing::{info, warn};

use crate::label_image::LabelImage;
use crate::nutrient_model::{AnalysisMethod, AnalysisResult, ExtractedIngredient, MergedResult};
use crate::prompts::ExtractionStrategy;
use crate::scan_errors::ScanError;
use crate::vision_client::{extract, VisionModel};

/// Hints returned when no strategy produced a usable result
pub const FAILURE_SUGGESTIONS: [&str; 3] = [
    "Try taking the photo from a different angle",
    "Ensure good lighting",
    "Try flattening the label if possible",
];

const FEW_INGREDIENTS_SUGGESTION: &str = "Try taking a photo of the Supplement Facts panel";
const INCOMPLETE_SUGGESTION: &str = "Ensure the label is fully visible and well-lit";
const ROTATE_SUGGESTION: &str = "Try rotating the bottle to get a better angle";
const FLATTEN_SUGGESTION: &str = "Consider flattening the label if possible";

/// Run every strategy against the image and merge the successful results
pub async fn analyze_curved_bottle(
    model: &dyn VisionModel,
    image: &LabelImage,
    timeout: Duration,
) -> MergedResult {
    let attempts = ExtractionStrategy::ALL
        .iter()
        .map(|strategy| run_strategy(model, image, *strategy, timeout));

    let outcomes = join_all(attempts).await;

    combine_outcomes(outcomes)
}

async fn run_strategy(
    model: &dyn VisionModel,
    image: &LabelImage,
    strategy: ExtractionStrategy,
    timeout: Duration,
) -> (ExtractionStrategy, AnalysisResult) {
    let result = if strategy.needs_preprocessing() {
        match image.preprocess_for_curved_text() {
            Ok(processed) => extract(model, &processed, strategy.prompt(), timeout).await,
            Err(e) => {
                warn!(strategy = %strategy, error = %e, "Image preprocessing failed");
                AnalysisResult::failed(&e)
            }
        }
    } else {
        extract(model, image, strategy.prompt(), timeout).await
    };

    (strategy, result)
}

/// Build the merged outcome from every strategy's settled result
pub fn combine_outcomes(outcomes: Vec<(ExtractionStrategy, AnalysisResult)>) -> MergedResult {
    let attempted = outcomes.len();
    let (strategies, successes): (Vec<ExtractionStrategy>, Vec<AnalysisResult>) = outcomes
        .into_iter()
        .filter(|(_, result)| result.success)
        .unzip();

    if successes.is_empty() {
        warn!(attempted, "All curved-bottle strategies failed");
        return failed_merge(&ScanError::AllStrategiesFailed);
    }

    let analysis_method = match strategies.as_slice() {
        [ExtractionStrategy::Preprocessed] => AnalysisMethod::Preprocessed,
        [_] => AnalysisMethod::Single,
        _ => AnalysisMethod::MultiAngle,
    };

    let merged = merge_results(&successes);
    let confidence = confidence_score(&merged);

    info!(
        attempted,
        succeeded = successes.len(),
        ingredients_count = merged.ingredients.len(),
        confidence,
        method = %analysis_method,
        "Curved-bottle analysis merged"
    );

    MergedResult {
        suggestions: suggestions(&merged),
        confidence_score: confidence,
        analysis_method,
        preprocessing_applied: strategies.iter().map(|s| s.label().to_string()).collect(),
        result: merged,
    }
}

/// A failed merged outcome carrying the fallback suggestions
pub fn failed_merge(error: &ScanError) -> MergedResult {
    MergedResult {
        result: AnalysisResult::failed(error),
        confidence_score: 0.0,
        analysis_method: AnalysisMethod::Single,
        preprocessing_applied: Vec::new(),
        suggestions: FAILURE_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
    }
}

/// Merge successful results; a single result passes through unchanged
pub fn merge_results(results: &[AnalysisResult]) -> AnalysisResult {
    match results {
        [] => AnalysisResult::succeeded(Vec::new()),
        [single] => single.clone(),
        _ => {
            let mut by_name: IndexMap<String, ExtractedIngredient> = IndexMap::new();

            for ingredient in results.iter().flat_map(|r| r.ingredients.iter()) {
                match by_name.entry(ingredient.name.to_lowercase()) {
                    Entry::Vacant(slot) => {
                        slot.insert(ingredient.clone());
                    }
                    Entry::Occupied(mut slot) => {
                        if slot.get().amount_text().is_none() && ingredient.amount_text().is_some() {
                            slot.insert(ingredient.clone());
                        }
                    }
                }
            }

            // concatenated in strategy order, repeats included
            let warnings: Vec<String> = results
                .iter()
                .flat_map(|r| r.warnings.iter().cloned())
                .collect();

            AnalysisResult::succeeded(by_name.into_values().collect())
                .with_product_name(results[0].product_name.clone())
                .with_serving_size(results[0].serving_size.clone())
                .with_warnings(warnings)
                .with_raw_response(&format!("Merged from {} analyses", results.len()))
        }
    }
}

/// Aggregate quality score within 0..=100
///
/// +50 for success, up to +30 for the number of ingredients (3 each) and up
/// to +20 for the share of complete ingredients.
pub fn confidence_score(result: &AnalysisResult) -> f64 {
    let mut score = 0.0;

    if result.success {
        score += 50.0;
    }

    let count = result.ingredients.len();
    if count > 0 {
        score += (count as f64 * 3.0).min(30.0);

        let complete = result.complete_count();
        if complete > 0 {
            score += (complete as f64 / count as f64 * 20.0).min(20.0);
        }
    }

    score.clamp(0.0, 100.0)
}

/// Remediation hints for the end user; the generic tips are always present
pub fn suggestions(result: &AnalysisResult) -> Vec<String> {
    let mut suggestions = Vec::new();

    if result.ingredients.len() < 3 {
        suggestions.push(FEW_INGREDIENTS_SUGGESTION.to_string());
    }

    if result.ingredients.iter().any(|i| i.amount_text().is_none() || i.unit_text().is_none()) {
        suggestions.push(INCOMPLETE_SUGGESTION.to_string());
    }

    suggestions.push(ROTATE_SUGGESTION.to_string());
    suggestions.push(FLATTEN_SUGGESTION.to_string());

    suggestions
}
