use async_trait::async_trait;
use image::{ImageOutputFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;

use vitamin_scan::label_analyzer::{analyze_label, AnalysisMode, AnalysisOptions, LabelReport};
use vitamin_scan::label_image::LabelImage;
use vitamin_scan::nutrient_model::{AnalysisMethod, FailureKind};
use vitamin_scan::prompts::ExtractionStrategy;
use vitamin_scan::scan_errors::ScanError;
use vitamin_scan::strategy_merger::analyze_curved_bottle;
use vitamin_scan::vision_client::VisionModel;

/// Answers each strategy's prompt with a canned reply
#[derive(Debug, Default)]
struct ScriptedModel {
    replies: HashMap<ExtractionStrategy, Result<String, ScanError>>,
    seen_formats: Mutex<Vec<(ExtractionStrategy, image::ImageFormat)>>,
}

impl ScriptedModel {
    fn reply(mut self, strategy: ExtractionStrategy, json: &str) -> Self {
        self.replies.insert(strategy, Ok(json.to_string()));
        self
    }

    fn fail(mut self, strategy: ExtractionStrategy, error: ScanError) -> Self {
        self.replies.insert(strategy, Err(error));
        self
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    async fn complete(&self, prompt: &str, image: &LabelImage) -> Result<String, ScanError> {
        let strategy = ExtractionStrategy::ALL
            .iter()
            .copied()
            .find(|s| s.prompt() == prompt)
            .ok_or_else(|| ScanError::Validation("unexpected prompt".to_string()))?;

        self.seen_formats
            .lock()
            .unwrap()
            .push((strategy, image.format()));

        self.replies
            .get(&strategy)
            .cloned()
            .unwrap_or_else(|| Err(ScanError::EmptyResponse))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn label_photo() -> LabelImage {
    let img = RgbImage::from_fn(64, 32, |x, y| {
        if (x + y) % 5 == 0 {
            Rgb([30, 30, 30])
        } else {
            Rgb([220, 215, 200])
        }
    });
    let mut cursor = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, ImageOutputFormat::Jpeg(90))
        .unwrap();
    LabelImage::from_bytes(cursor.into_inner()).unwrap()
}

const DIRECT_READ: &str = r#"{
    "productName": "Bump Daily Prenatal",
    "servingSize": "1 Softgel",
    "ingredients": [
        {"name": "Vitamin D3"},
        {"name": "Folic Acid", "amount": "600", "unit": "mcg"}
    ],
    "warnings": ["Contains iron"]
}"#;

const THREE_PASS_READ: &str = r#"{
    "productName": "Bump Dai1y Prenata1",
    "ingredients": [
        {"name": "Iron", "amount": "27", "unit": "mg"},
        {"name": "vitamin d3", "amount": "600", "unit": "IU"}
    ],
    "warnings": ["Contains iron", "Keep out of reach of children"]
}"#;

const CONTRAST_READ: &str = r#"{
    "ingredients": [
        {"name": "DHA", "amount": "200", "unit": "mg"}
    ]
}"#;

#[tokio::test]
async fn test_merges_every_successful_strategy() {
    let model = ScriptedModel::default()
        .reply(ExtractionStrategy::CurvedBottle, DIRECT_READ)
        .reply(ExtractionStrategy::MultiAngle, THREE_PASS_READ)
        .reply(ExtractionStrategy::Preprocessed, CONTRAST_READ);

    let merged = analyze_curved_bottle(&model, &label_photo(), Duration::from_secs(5)).await;

    assert!(merged.result.success);
    assert_eq!(merged.analysis_method, AnalysisMethod::MultiAngle);
    assert_eq!(merged.preprocessing_applied.len(), 3);

    let names: Vec<&str> = merged.result.ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["vitamin d3", "Folic Acid", "Iron", "DHA"]);
    assert_eq!(merged.result.ingredients[0].amount.as_deref(), Some("600"));
    assert_eq!(merged.result.ingredients[0].unit.as_deref(), Some("IU"));

    assert_eq!(merged.result.product_name.as_deref(), Some("Bump Daily Prenatal"));
    assert_eq!(merged.result.serving_size.as_deref(), Some("1 Softgel"));
    assert_eq!(
        merged.result.warnings,
        vec![
            "Contains iron".to_string(),
            "Contains iron".to_string(),
            "Keep out of reach of children".to_string(),
        ]
    );
    assert_eq!(merged.result.raw_response.as_deref(), Some("Merged from 3 analyses"));
    assert!(merged.confidence_score > 50.0);
}

#[tokio::test]
async fn test_preprocessed_strategy_sees_png() {
    let model = ScriptedModel::default()
        .reply(ExtractionStrategy::CurvedBottle, DIRECT_READ)
        .reply(ExtractionStrategy::MultiAngle, THREE_PASS_READ)
        .reply(ExtractionStrategy::Preprocessed, CONTRAST_READ);

    analyze_curved_bottle(&model, &label_photo(), Duration::from_secs(5)).await;

    let seen = model.seen_formats.lock().unwrap().clone();
    assert_eq!(seen.len(), 3);
    for (strategy, format) in seen {
        match strategy {
            ExtractionStrategy::Preprocessed => assert_eq!(format, image::ImageFormat::Png),
            _ => assert_eq!(format, image::ImageFormat::Jpeg),
        }
    }
}

#[tokio::test]
async fn test_partial_failure_still_merges() {
    let model = ScriptedModel::default()
        .reply(ExtractionStrategy::CurvedBottle, DIRECT_READ)
        .fail(
            ExtractionStrategy::MultiAngle,
            ScanError::HttpStatus {
                status: 500,
                message: "internal error".to_string(),
            },
        )
        .reply(ExtractionStrategy::Preprocessed, "I could not read this label");

    let merged = analyze_curved_bottle(&model, &label_photo(), Duration::from_secs(5)).await;

    assert!(merged.result.success);
    assert_eq!(merged.analysis_method, AnalysisMethod::Single);
    assert_eq!(merged.preprocessing_applied, vec!["curved-bottle-prompt".to_string()]);
    // one survivor passes through untouched
    assert_eq!(merged.result.raw_response.as_deref(), Some(DIRECT_READ));
    assert_eq!(merged.result.ingredients.len(), 2);
}

#[tokio::test]
async fn test_only_preprocessed_survives() {
    let model = ScriptedModel::default().reply(ExtractionStrategy::Preprocessed, CONTRAST_READ);

    let merged = analyze_curved_bottle(&model, &label_photo(), Duration::from_secs(5)).await;

    assert!(merged.result.success);
    assert_eq!(merged.analysis_method, AnalysisMethod::Preprocessed);
    assert_eq!(merged.preprocessing_applied, vec!["contrast-preprocessing".to_string()]);
}

#[tokio::test]
async fn test_all_strategies_failing() {
    let model = ScriptedModel::default()
        .fail(ExtractionStrategy::CurvedBottle, ScanError::Timeout(Duration::from_secs(5)))
        .fail(ExtractionStrategy::MultiAngle, ScanError::Transport("reset".to_string()))
        .reply(ExtractionStrategy::Preprocessed, "{\"notes\": []}");

    let options = AnalysisOptions::default()
        .with_mode(AnalysisMode::CurvedBottle)
        .with_timeout(Duration::from_secs(5));
    let report = analyze_label(&model, &label_photo(), &options).await;

    assert!(!report.success());
    assert!(report.error().unwrap().contains("failed"));
    assert_eq!(report.failure(), Some(FailureKind::AllStrategiesFailed));

    let LabelReport::Merged(merged) = report else {
        panic!("curved-bottle mode should produce a merged report");
    };
    assert!(merged.result.ingredients.is_empty());
    assert!(!merged.suggestions.is_empty());
    assert_eq!(merged.confidence_score, 0.0);
}

#[tokio::test]
async fn test_merged_report_serializes_flat() {
    let model = ScriptedModel::default()
        .reply(ExtractionStrategy::CurvedBottle, DIRECT_READ)
        .reply(ExtractionStrategy::MultiAngle, THREE_PASS_READ);

    let options = AnalysisOptions::default().with_mode(AnalysisMode::CurvedBottle);
    let report = analyze_label(&model, &label_photo(), &options).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["analysisMethod"], "multi-angle");
    assert!(json["ingredients"].is_array());
    assert!(json["suggestions"].is_array());
}
