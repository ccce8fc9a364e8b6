//! # Pipeline Tests
//!
//! End-to-end checks of the offline half of the pipeline: name resolution,
//! amount validation, annotation and issue detection.

use vitamin_scan::amount_validator::validate_amount;
use vitamin_scan::annotator::{annotate, annotate_result};
use vitamin_scan::facts_parser::parse_supplement_facts;
use vitamin_scan::issue_detector::detect_issues;
use vitamin_scan::knowledge_base::NUTRIENT_CATALOG;
use vitamin_scan::name_resolver::{normalize_ingredient_name, resolve};
use vitamin_scan::nutrient_model::{AnalysisResult, AnnotatedIngredient, ExtractedIngredient, Population};
use vitamin_scan::response_parser::parse_model_response;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_resolver_is_case_insensitive() {
        let references: Vec<_> = ["vitamin d", "Vitamin D", "VITAMIN D"]
            .iter()
            .map(|name| resolve(name).expect("vitamin D should resolve"))
            .collect();

        assert!(std::ptr::eq(references[0], references[1]));
        assert!(std::ptr::eq(references[1], references[2]));
    }

    #[test]
    fn test_resolver_aliases_and_unknowns() {
        assert_eq!(resolve("folate").map(|r| r.canonical_name), Some("Folic Acid"));
        assert!(resolve("xyzzy-not-a-vitamin").is_none());
        assert_eq!(normalize_ingredient_name("xyzzy-not-a-vitamin"), "xyzzy-not-a-vitamin");
    }

    #[test]
    fn test_every_canonical_name_resolves_to_itself() {
        for entry in NUTRIENT_CATALOG {
            let found = resolve(entry.canonical_name).expect("canonical names resolve");
            assert_eq!(found.id, entry.id, "{} resolved elsewhere", entry.canonical_name);
        }
    }

    #[test]
    fn test_validator_asymmetry() {
        let over = validate_amount("Iron", 50.0, "mg", Population::Prenatal);
        assert!(!over.valid);
        assert!(over.warning.is_some());

        let under = validate_amount("Iron", 5.0, "mg", Population::Prenatal);
        assert!(under.valid);
        assert!(under.warning.unwrap().contains("below typical range"));
    }

    #[test]
    fn test_round_trip_short_list() {
        let extraction = parse_model_response(
            r#"{"ingredients": [
                {"name": "Vitamin A", "amount": "770", "unit": "mcg"},
                {"name": "Folic Acid", "amount": "600", "unit": "mcg"}
            ]}"#,
        )
        .unwrap();

        let annotated: Vec<AnnotatedIngredient> = extraction.ingredients.iter().map(annotate).collect();
        let issues = detect_issues(&annotated);

        assert!(!issues.iter().any(|i| i.starts_with("Duplicate ingredient")));
        assert!(!issues.iter().any(|i| i.contains("missing essential")));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_annotation_is_idempotent() {
        let ingredient = ExtractedIngredient::new("  folate ").with_amount("2,000", "mcg");

        let first = serde_json::to_string(&annotate(&ingredient)).unwrap();
        let second = serde_json::to_string(&annotate(&ingredient)).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            resolve("  folate ").map(|r| r.id),
            resolve("  folate ").map(|r| r.id)
        );
    }

    #[test]
    fn test_worst_case_ingredient_never_goes_negative() {
        let mut ingredient = ExtractedIngredient::new("xyzzy-not-a-vitamin");
        ingredient.amount = Some("a lot".to_string());

        let annotated = annotate(&ingredient);

        assert_eq!(annotated.confidence, 45);
        assert!(annotated.warnings.contains(&"Invalid amount: a lot".to_string()));
        assert!(annotated.warnings.contains(&"Missing unit".to_string()));
    }

    #[test]
    fn test_annotated_analysis_of_text_panel() {
        let text = "\
Supplement Facts
Serving Size: 2 Softgels
Vitamin D3 (as Cholecalciferol) 1000 IU 250%
Folic Acid 800 mcg 200%
Iron 60 mg 333%
Zinc 11 mg 100%
";
        let analysis = annotate_result(&parse_supplement_facts(text), Population::Prenatal, Duration::ZERO);

        assert!(analysis.success);
        assert_eq!(analysis.ingredients.len(), 4);

        let iron = &analysis.ingredients[2];
        assert_eq!(iron.confidence, 80);
        assert!(analysis
            .quality_warnings
            .contains(&"Iron: 60mg exceeds safe upper limit (45mg)".to_string()));
        assert!(analysis
            .quality_warnings
            .contains(&"May be missing essential prenatal nutrients: calcium".to_string()));
    }

    #[test]
    fn test_low_doses_do_not_raise_quality_warnings() {
        let extraction = AnalysisResult::succeeded(vec![
            ExtractedIngredient::new("Iron").with_amount("5", "mg"),
            ExtractedIngredient::new("Vitamin A").with_amount("100", "mcg"),
        ]);

        let analysis = annotate_result(&extraction, Population::Prenatal, Duration::ZERO);

        assert!(analysis.ingredients.iter().all(|i| i.confidence == 100));
        assert!(!analysis
            .quality_warnings
            .iter()
            .any(|w| w.contains("below typical range")));
        assert!(analysis
            .quality_warnings
            .contains(&"May cause constipation".to_string()));
    }

    #[test]
    fn test_failed_extraction_annotates_to_zero() {
        let failed = parse_model_response("nothing here")
            .unwrap_or_else(|e| AnalysisResult::failed(&e));
        let analysis = annotate_result(&failed, Population::Prenatal, Duration::ZERO);

        assert!(!analysis.success);
        assert_eq!(analysis.overall_confidence, 0.0);
        assert_eq!(analysis.quality_warnings, vec!["could not parse response".to_string()]);
    }
}
