//! # Label Analyzer
//!
//! Public entry point of the pipeline. [`analyze_label`] picks a pipeline
//! from [`AnalysisOptions::mode`] and always resolves to a [`LabelReport`];
//! failures are carried inside the report, never returned as errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::info;

use crate::annotator::annotate_result;
use crate::label_image::LabelImage;
use crate::nutrient_model::{AnalysisResult, AnnotatedAnalysis, FailureKind, MergedResult, Population};
use crate::prompts::{ENHANCED_PROMPT, STANDARD_PROMPT};
use crate::scan_config::DEFAULT_TIMEOUT_SECS;
use crate::scan_errors::ScanError;
use crate::strategy_merger::{analyze_curved_bottle, failed_merge};
use crate::vision_client::{extract, VisionModel};

/// Which pipeline to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// One extraction with the basic prompt, raw result
    Standard,
    /// One extraction with the detailed prompt, then annotation and issue detection
    #[default]
    Enhanced,
    /// Every extraction strategy concurrently, merged
    CurvedBottle,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnalysisMode::Standard => "standard",
            AnalysisMode::Enhanced => "enhanced",
            AnalysisMode::CurvedBottle => "curved-bottle",
        };
        write!(f, "{label}")
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(AnalysisMode::Standard),
            "enhanced" => Ok(AnalysisMode::Enhanced),
            "curved-bottle" | "curved" => Ok(AnalysisMode::CurvedBottle),
            other => Err(format!("unknown analysis mode: {other}")),
        }
    }
}

/// Options for a single label analysis
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub mode: AnalysisMode,
    /// Dosage ranges used by the annotator
    pub population: Population,
    /// Per-call timeout for every model request
    pub timeout: Duration,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            population: Population::Prenatal,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AnalysisOptions {
    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_population(mut self, population: Population) -> Self {
        self.population = population;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Outcome of [`analyze_label`], one variant per mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LabelReport {
    Basic(AnalysisResult),
    Annotated(AnnotatedAnalysis),
    Merged(MergedResult),
}

impl LabelReport {
    /// Failed report of the shape the given mode would have produced
    pub fn failed(error: &ScanError, options: &AnalysisOptions) -> Self {
        match options.mode {
            AnalysisMode::Standard => LabelReport::Basic(AnalysisResult::failed(error)),
            AnalysisMode::Enhanced => LabelReport::Annotated(annotate_result(
                &AnalysisResult::failed(error),
                options.population,
                Duration::ZERO,
            )),
            AnalysisMode::CurvedBottle => LabelReport::Merged(failed_merge(error)),
        }
    }

    pub fn success(&self) -> bool {
        match self {
            LabelReport::Basic(result) => result.success,
            LabelReport::Annotated(analysis) => analysis.success,
            LabelReport::Merged(merged) => merged.result.success,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LabelReport::Basic(result) => result.error.as_deref(),
            LabelReport::Annotated(analysis) => analysis.error.as_deref(),
            LabelReport::Merged(merged) => merged.result.error.as_deref(),
        }
    }

    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            LabelReport::Basic(result) => result.failure,
            LabelReport::Annotated(analysis) => analysis.failure,
            LabelReport::Merged(merged) => merged.result.failure,
        }
    }

    pub fn ingredient_count(&self) -> usize {
        match self {
            LabelReport::Basic(result) => result.ingredients.len(),
            LabelReport::Annotated(analysis) => analysis.ingredients.len(),
            LabelReport::Merged(merged) => merged.result.ingredients.len(),
        }
    }
}

/// Analyze a label image with the pipeline selected by `options.mode`
pub async fn analyze_label(
    model: &dyn VisionModel,
    image: &LabelImage,
    options: &AnalysisOptions,
) -> LabelReport {
    let started = Instant::now();

    let report = match options.mode {
        AnalysisMode::Standard => {
            LabelReport::Basic(extract(model, image, STANDARD_PROMPT, options.timeout).await)
        }
        AnalysisMode::Enhanced => {
            let result = extract(model, image, ENHANCED_PROMPT, options.timeout).await;
            LabelReport::Annotated(annotate_result(&result, options.population, started.elapsed()))
        }
        AnalysisMode::CurvedBottle => {
            LabelReport::Merged(analyze_curved_bottle(model, image, options.timeout).await)
        }
    };

    info!(
        mode = %options.mode,
        success = report.success(),
        ingredients_count = report.ingredient_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Label analysis finished"
    );

    report
}
