//! # Supplement Facts Text Parser
//!
//! Parses the plain text of a Supplement Facts panel, for callers that already
//! ran OCR themselves and do not need the vision model.
//!
//! ## Recognized line shape
//!
//! ```text
//! <name> [(<qualifier>)] <amount><unit> [<dv>%]
//! Vitamin D3 (as Cholecalciferol) 15 mcg 75%
//! Iron 27mg 150%
//! ```
//!
//! Units: mg, mcg, µg/μg (reported as mcg), IU and g. Panel headers and
//! footnotes (`†`, "Daily Value not established") are skipped.

use lazy_static::lazy_static;
use log::{debug, info, trace};
use regex::Regex;

use crate::nutrient_model::{AnalysisResult, ExtractedIngredient};

/// How many leading lines may hold the product name
const PRODUCT_NAME_SEARCH_LINES: usize = 5;

/// Words that mark a leading line as panel text rather than a product name
const NON_PRODUCT_WORDS: [&str; 6] = ["supplement", "facts", "serving", "size", "tablet", "capsule"];

/// Lines that belong to the panel header
const HEADER_MARKERS: [&str; 4] = [
    "supplement facts",
    "serving size",
    "servings per container",
    "amount per serving",
];

lazy_static! {
    static ref INGREDIENT_LINE: Regex = Regex::new(
        r"(?i)^(?P<name>[a-z][a-z0-9 ,'/.\-]*?)\s*(?:\((?P<paren>[^)]+)\))?\s+(?P<amount>\d[\d,]*(?:\.\d+)?)\s*(?P<unit>mcg|µg|μg|mg|iu|g)\b(?:\s+(?P<dv>\d+(?:\.\d+)?)\s*%)?"
    )
    .expect("Ingredient line pattern should be valid");

    static ref SERVING_SIZE: Regex =
        Regex::new(r"(?i)serving\s+size\s*:?\s*(?P<size>.+)").expect("Serving size pattern should be valid");
}

/// Parse supplement-facts text into an analysis result
///
/// Never fails: text without recognizable ingredient lines yields a
/// successful result with no ingredients.
///
/// # Examples
///
/// ```rust
/// use vitamin_scan::facts_parser::parse_supplement_facts;
///
/// let text = "Supplement Facts\nServing Size: 1 Tablet\nFolic Acid 600 mcg 150%\nIron 27 mg 150%";
/// let result = parse_supplement_facts(text);
///
/// assert_eq!(result.ingredients.len(), 2);
/// assert_eq!(result.serving_size.as_deref(), Some("1 Tablet"));
/// ```
pub fn parse_supplement_facts(text: &str) -> AnalysisResult {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let panel_start = lines
        .iter()
        .position(|line| line.to_lowercase().contains("supplement facts"))
        .map_or(0, |index| index + 1);

    let ingredients: Vec<ExtractedIngredient> = lines[panel_start..]
        .iter()
        .filter(|line| !is_header(line) && !is_footnote(line))
        .filter_map(|line| parse_ingredient_line(line))
        .collect();

    let product_name = find_product_name(&lines);
    let serving_size = lines
        .iter()
        .find_map(|line| SERVING_SIZE.captures(line))
        .map(|caps| caps["size"].trim().to_string())
        .filter(|size| !size.is_empty());

    info!(
        "Parsed {} ingredients from {} lines of supplement facts text",
        ingredients.len(),
        lines.len()
    );

    AnalysisResult::succeeded(ingredients)
        .with_product_name(product_name)
        .with_serving_size(serving_size)
}

/// Parse one panel line, if it has the ingredient shape
pub fn parse_ingredient_line(line: &str) -> Option<ExtractedIngredient> {
    let caps = INGREDIENT_LINE.captures(line.trim())?;

    let base_name = caps["name"].trim().trim_end_matches(',').trim();
    if base_name.is_empty() {
        return None;
    }

    // "(as X)" is a chemical form, any other parenthetical is part of the name
    let paren = caps.name("paren").map(|p| p.as_str().trim());
    let (name, form) = match paren {
        Some(text) if text.to_lowercase().starts_with("as ") => (base_name.to_string(), Some(text)),
        Some(text) => (format!("{base_name} ({text})"), None),
        None => (base_name.to_string(), None),
    };

    let amount = caps["amount"].replace(',', "");
    let unit = normalize_unit(&caps["unit"]);

    let mut ingredient = ExtractedIngredient::new(&name).with_amount(&amount, &unit);
    if let Some(form) = form {
        ingredient = ingredient.with_chemical_form(form);
    }
    if let Some(dv) = caps.name("dv") {
        ingredient = ingredient.with_percent_daily_value(&format!("{}%", dv.as_str()));
    }

    trace!("Parsed ingredient line '{}' as {}", line, ingredient);

    Some(ingredient)
}

fn normalize_unit(unit: &str) -> String {
    match unit.to_lowercase().as_str() {
        "µg" | "μg" | "mcg" => "mcg".to_string(),
        "iu" => "IU".to_string(),
        other => other.to_string(),
    }
}

fn is_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    HEADER_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn is_footnote(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.starts_with('†')
        || line.starts_with('*')
        || lower.contains("daily value not established")
        || lower.contains("percent daily values are based")
}

fn find_product_name(lines: &[&str]) -> Option<String> {
    let name = lines
        .iter()
        .take(PRODUCT_NAME_SEARCH_LINES)
        .find(|line| {
            let lower = line.to_lowercase();
            line.len() > 3
                && !NON_PRODUCT_WORDS.iter().any(|word| lower.contains(word))
                && !INGREDIENT_LINE.is_match(line)
        })
        .map(|line| line.to_string());

    debug!("Detected product name: {:?}", name);

    name
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANEL: &str = "\
Daily Prenatal Complete
Supplement Facts
Serving Size: 1 Tablet
Servings Per Container: 60
Amount Per Serving  % Daily Value
Vitamin A (as Retinyl Palmitate) 770 mcg 85%
Vitamin D3 (as Cholecalciferol) 15 mcg 75%
Thiamin (Vitamin B1) 1.4 mg
Vitamin B12 2.6 μg 108%
Folic Acid 600 mcg 150%
Iron 27mg 150%
Calcium 1,000 mg 77%
DHA 200 mg †
† Daily Value not established.
";

    #[test]
    fn test_full_panel() {
        let result = parse_supplement_facts(PANEL);

        assert!(result.success);
        assert_eq!(result.product_name.as_deref(), Some("Daily Prenatal Complete"));
        assert_eq!(result.serving_size.as_deref(), Some("1 Tablet"));

        let names: Vec<&str> = result.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Vitamin A",
                "Vitamin D3",
                "Thiamin (Vitamin B1)",
                "Vitamin B12",
                "Folic Acid",
                "Iron",
                "Calcium",
                "DHA"
            ]
        );
    }

    #[test]
    fn test_line_details() {
        let vitamin_a = parse_ingredient_line("Vitamin A (as Retinyl Palmitate) 770 mcg 85%").unwrap();
        assert_eq!(vitamin_a.name, "Vitamin A");
        assert_eq!(vitamin_a.chemical_form.as_deref(), Some("as Retinyl Palmitate"));
        assert_eq!(vitamin_a.amount.as_deref(), Some("770"));
        assert_eq!(vitamin_a.unit.as_deref(), Some("mcg"));
        assert_eq!(vitamin_a.percent_daily_value.as_deref(), Some("85%"));

        let iron = parse_ingredient_line("Iron 27mg").unwrap();
        assert_eq!(iron.amount.as_deref(), Some("27"));
        assert_eq!(iron.unit.as_deref(), Some("mg"));
        assert!(iron.percent_daily_value.is_none());
    }

    #[test]
    fn test_unit_normalization() {
        assert_eq!(
            parse_ingredient_line("Vitamin B12 2.6 µg").unwrap().unit.as_deref(),
            Some("mcg")
        );
        assert_eq!(
            parse_ingredient_line("Vitamin D 600 iu").unwrap().unit.as_deref(),
            Some("IU")
        );
        assert_eq!(
            parse_ingredient_line("Calcium 1,000 mg").unwrap().amount.as_deref(),
            Some("1000")
        );
    }

    #[test]
    fn test_non_ingredient_lines() {
        assert!(parse_ingredient_line("Keep out of reach of children").is_none());
        assert!(parse_ingredient_line("60 Tablets").is_none());
    }

    #[test]
    fn test_parenthetical_qualifiers() {
        let thiamin = parse_ingredient_line("Thiamin (Vitamin B1) 1.4 mg").unwrap();
        assert_eq!(thiamin.name, "Thiamin (Vitamin B1)");
        assert!(thiamin.chemical_form.is_none());

        let zinc = parse_ingredient_line("Zinc (As Zinc Oxide) 11 mg").unwrap();
        assert_eq!(zinc.name, "Zinc");
        assert_eq!(zinc.chemical_form.as_deref(), Some("As Zinc Oxide"));
    }

    #[test]
    fn test_text_without_header() {
        let result = parse_supplement_facts("Zinc 11 mg\nIodine 150 mcg");

        assert_eq!(result.ingredients.len(), 2);
        assert!(result.serving_size.is_none());
    }

    #[test]
    fn test_nothing_recognizable() {
        let result = parse_supplement_facts("blurry\n\n???");

        assert!(result.success);
        assert!(result.ingredients.is_empty());
    }
}
