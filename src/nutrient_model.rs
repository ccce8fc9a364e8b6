//! # Label Analysis Data Model
//!
//! This module defines the data structures that flow through the label scanning
//! pipeline, from the raw line items produced by the vision model to the
//! annotated and merged results handed back to the caller.
//!
//! ## Core Concepts
//!
//! - **ExtractedIngredient**: One line item parsed from a label image
//! - **AnnotatedIngredient**: An extracted ingredient plus confidence and warnings
//! - **AnalysisResult**: The outcome of a single extraction call
//! - **MergedResult**: The reconciled outcome of several extraction strategies
//!
//! ## Usage
//!
//! ```rust
//! use vitamin_scan::nutrient_model::{AnalysisResult, ExtractedIngredient};
//!
//! let folic = ExtractedIngredient::new("Folic Acid").with_amount("600", "mcg");
//! let result = AnalysisResult::succeeded(vec![folic]);
//! assert!(result.success);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scan_errors::ScanError;

/// Population segment a dosage range applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Population {
    /// Pregnant or lactating adults
    #[default]
    Prenatal,
    /// General adult population
    Adult,
}

/// One line item read off a supplement label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedIngredient {
    /// Name as produced by the vision model (e.g., "Vitamin D3", "folate")
    pub name: String,

    /// Numeric text of the amount (e.g., "600"); not parsed yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,

    /// Unit of the amount (mg, mcg, IU, g)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Percent daily value as printed (e.g., "150%")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_daily_value: Option<String>,

    /// The "as X" qualifier (e.g., "as Cholecalciferol")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemical_form: Option<String>,
}

impl ExtractedIngredient {
    /// Create a new ingredient with just a name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Attach an amount and unit
    pub fn with_amount(mut self, amount: &str, unit: &str) -> Self {
        self.amount = Some(amount.to_string());
        self.unit = Some(unit.to_string());
        self
    }

    /// Attach a percent daily value
    pub fn with_percent_daily_value(mut self, percent: &str) -> Self {
        self.percent_daily_value = Some(percent.to_string());
        self
    }

    /// Attach a chemical form qualifier
    pub fn with_chemical_form(mut self, form: &str) -> Self {
        self.chemical_form = Some(form.to_string());
        self
    }

    /// Amount text if present and not blank
    pub fn amount_text(&self) -> Option<&str> {
        non_blank(self.amount.as_deref())
    }

    /// Unit text if present and not blank
    pub fn unit_text(&self) -> Option<&str> {
        non_blank(self.unit.as_deref())
    }

    /// True when name, amount and unit are all present
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.amount_text().is_some() && self.unit_text().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// An extracted ingredient after knowledge-base normalization and scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedIngredient {
    /// The ingredient, with `name` replaced by the canonical name when resolved
    #[serde(flatten)]
    pub ingredient: ExtractedIngredient,

    /// The raw name, kept only when normalization changed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,

    /// Confidence in the extraction, always within 0..=100
    pub confidence: u8,

    /// Whether the name differed from its canonical form
    pub normalized: bool,

    /// Accumulated warnings, in the order the checks produced them
    pub warnings: Vec<String>,
}

impl AnnotatedIngredient {
    /// Canonical (or pass-through) name
    pub fn name(&self) -> &str {
        &self.ingredient.name
    }
}

/// Machine-readable reason attached to a failed result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    HttpStatus(u16),
    Timeout,
    Unparseable,
    Malformed,
    InvalidImage,
    AllStrategiesFailed,
    CircuitOpen,
}

impl FailureKind {
    /// Whether a caller-side retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            FailureKind::Transport | FailureKind::Timeout => true,
            FailureKind::HttpStatus(status) => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Outcome of one extraction attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub success: bool,

    /// Ingredients in label order (or merge order for merged results)
    #[serde(default)]
    pub ingredients: Vec<ExtractedIngredient>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,

    /// Label-level warnings (allergens, "keep out of reach of children")
    #[serde(default)]
    pub warnings: Vec<String>,

    /// Model reply text the result was parsed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,

    /// Present iff `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl AnalysisResult {
    /// Successful result carrying the given ingredients
    pub fn succeeded(ingredients: Vec<ExtractedIngredient>) -> Self {
        Self {
            success: true,
            ingredients,
            ..Default::default()
        }
    }

    /// Failed result; ingredients are always empty and `error` is always set
    pub fn failed(error: &ScanError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            failure: Some(error.kind()),
            ..Default::default()
        }
    }

    pub fn with_product_name(mut self, name: Option<String>) -> Self {
        self.product_name = name;
        self
    }

    pub fn with_serving_size(mut self, serving: Option<String>) -> Self {
        self.serving_size = serving;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_raw_response(mut self, raw: &str) -> Self {
        self.raw_response = Some(raw.to_string());
        self
    }

    /// Number of ingredients with name, amount and unit all present
    pub fn complete_count(&self) -> usize {
        self.ingredients.iter().filter(|i| i.is_complete()).count()
    }
}

/// How a merged result was obtained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMethod {
    #[default]
    Single,
    MultiAngle,
    Preprocessed,
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnalysisMethod::Single => "single",
            AnalysisMethod::MultiAngle => "multi-angle",
            AnalysisMethod::Preprocessed => "preprocessed",
        };
        write!(f, "{label}")
    }
}

/// Reconciled outcome of a multi-strategy (curved bottle) analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedResult {
    #[serde(flatten)]
    pub result: AnalysisResult,

    /// Aggregate quality score within 0..=100
    pub confidence_score: f64,

    pub analysis_method: AnalysisMethod,

    /// Labels of the strategies that contributed to the result
    pub preprocessing_applied: Vec<String>,

    /// Remediation hints for the end user; never empty on failure
    pub suggestions: Vec<String>,
}

/// A single-pass result with every ingredient annotated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedAnalysis {
    pub success: bool,
    pub ingredients: Vec<AnnotatedIngredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Mean ingredient confidence, 0 when nothing was found
    pub overall_confidence: f64,
    /// Ingredient warnings followed by detected issues
    pub quality_warnings: Vec<String>,
    pub processing_time_ms: u64,
    pub analyzed_at: DateTime<Utc>,
}

impl fmt::Display for ExtractedIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;

        if let Some(form) = &self.chemical_form {
            write!(f, " ({form})")?;
        }

        match (self.amount_text(), self.unit_text()) {
            (Some(amount), Some(unit)) => write!(f, " {amount} {unit}")?,
            (Some(amount), None) => write!(f, " {amount}")?,
            _ => {}
        }

        if let Some(dv) = &self.percent_daily_value {
            write!(f, " [{dv} DV]")?;
        }

        Ok(())
    }
}

impl fmt::Display for AnnotatedIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}% confidence)", self.ingredient, self.confidence)
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.success {
            return write!(
                f,
                "Analysis failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        writeln!(
            f,
            "{} ({} ingredients, {} complete):",
            self.product_name.as_deref().unwrap_or("Unknown product"),
            self.ingredients.len(),
            self.complete_count()
        )?;

        for ingredient in &self.ingredients {
            writeln!(f, "  • {ingredient}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_creation() {
        let ingredient = ExtractedIngredient::new("Vitamin D3")
            .with_amount("600", "IU")
            .with_percent_daily_value("75%")
            .with_chemical_form("as Cholecalciferol");

        assert_eq!(ingredient.name, "Vitamin D3");
        assert_eq!(ingredient.amount_text(), Some("600"));
        assert_eq!(ingredient.unit_text(), Some("IU"));
        assert!(ingredient.is_complete());
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let mut ingredient = ExtractedIngredient::new("Iron");
        ingredient.amount = Some("  ".to_string());
        ingredient.unit = Some(String::new());

        assert_eq!(ingredient.amount_text(), None);
        assert_eq!(ingredient.unit_text(), None);
        assert!(!ingredient.is_complete());
    }

    #[test]
    fn test_failed_result_invariant() {
        let result = AnalysisResult::failed(&ScanError::UnparseableResponse);

        assert!(!result.success);
        assert!(result.ingredients.is_empty());
        assert_eq!(result.error.as_deref(), Some("could not parse response"));
        assert_eq!(result.failure, Some(FailureKind::Unparseable));
    }

    #[test]
    fn test_retryable_failures() {
        assert!(FailureKind::Transport.is_retryable());
        assert!(FailureKind::Timeout.is_retryable());
        assert!(FailureKind::HttpStatus(503).is_retryable());
        assert!(FailureKind::HttpStatus(429).is_retryable());
        assert!(!FailureKind::HttpStatus(401).is_retryable());
        assert!(!FailureKind::Unparseable.is_retryable());
        assert!(!FailureKind::Malformed.is_retryable());
    }

    #[test]
    fn test_camel_case_wire_format() {
        let ingredient = ExtractedIngredient::new("Folic Acid")
            .with_amount("600", "mcg")
            .with_percent_daily_value("150%");
        let json = serde_json::to_value(&ingredient).unwrap();

        assert_eq!(json["percentDailyValue"], "150%");
        assert!(json.get("chemicalForm").is_none());

        let method = serde_json::to_value(AnalysisMethod::MultiAngle).unwrap();
        assert_eq!(method, "multi-angle");
    }

    #[test]
    fn test_merged_result_flattens_analysis() {
        let merged = MergedResult {
            result: AnalysisResult::succeeded(vec![ExtractedIngredient::new("Iron")]),
            confidence_score: 53.0,
            analysis_method: AnalysisMethod::Single,
            preprocessing_applied: vec![],
            suggestions: vec!["Try rotating the bottle to get a better angle".to_string()],
        };
        let json = serde_json::to_value(&merged).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["ingredients"][0]["name"], "Iron");
        assert_eq!(json["analysisMethod"], "single");
        assert_eq!(json["confidenceScore"], 53.0);
    }

    #[test]
    fn test_display_formatting() {
        let ingredient = ExtractedIngredient::new("Calcium")
            .with_amount("200", "mg")
            .with_chemical_form("as Calcium Carbonate");

        assert_eq!(format!("{ingredient}"), "Calcium (as Calcium Carbonate) 200 mg");

        let failed = AnalysisResult::failed(&ScanError::AllStrategiesFailed);
        assert_eq!(format!("{failed}"), "Analysis failed: all analysis methods failed");
    }
}
