//! # Model Response Parser
//!
//! Turns the free-text completion returned by the vision model into an
//! [`AnalysisResult`]. The model is asked for pure JSON but may wrap it in
//! prose or markdown fences, so the parser first locates a balanced `{...}`
//! span and only then decodes it.
//!
//! The decoded JSON is untrusted input. Its shape is checked field by field
//! before any typed record is built:
//!
//! - a missing or non-array `ingredients` field makes the response malformed;
//! - an empty `ingredients` array is a valid zero-ingredient result;
//! - ingredient entries without a non-empty string `name` are dropped, with a
//!   single warning added to the result;
//! - numeric `amount` / `percentDailyValue` values are kept as their text.

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::nutrient_model::{AnalysisResult, ExtractedIngredient};
use crate::scan_errors::ScanError;

/// Parse a model completion into a successful result, or explain why it cannot be
///
/// # Examples
///
/// ```rust
/// use vitamin_scan::response_parser::parse_model_response;
///
/// let reply = "Here you go:\n```json\n{\"ingredients\": [{\"name\": \"Iron\", \"amount\": \"27\", \"unit\": \"mg\"}]}\n```";
/// let result = parse_model_response(reply).unwrap();
/// assert_eq!(result.ingredients[0].name, "Iron");
/// ```
pub fn parse_model_response(text: &str) -> Result<AnalysisResult, ScanError> {
    let object = json_spans(text)
        .find_map(|span| match serde_json::from_str::<Value>(span) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
        .ok_or(ScanError::UnparseableResponse)?;

    let ingredients = match object.get("ingredients") {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ScanError::MalformedResponse(
                "ingredients is not an array".to_string(),
            ))
        }
        None => {
            return Err(ScanError::MalformedResponse(
                "missing ingredients array".to_string(),
            ))
        }
    };

    let mut parsed = Vec::with_capacity(ingredients.len());
    let mut skipped = 0;
    for item in ingredients {
        match parse_ingredient(item) {
            Some(ingredient) => parsed.push(ingredient),
            None => skipped += 1,
        }
    }

    let mut warnings = string_list(object.get("warnings"));
    if skipped > 0 {
        warn!("Dropped {} ingredient entries without a usable name", skipped);
        warnings.push(format!("Skipped {skipped} ingredient entries without a name"));
    }

    debug!(
        "Parsed model response: {} ingredients, {} warnings",
        parsed.len(),
        warnings.len()
    );

    Ok(AnalysisResult::succeeded(parsed)
        .with_product_name(text_field(&object, "productName"))
        .with_serving_size(text_field(&object, "servingSize"))
        .with_warnings(warnings)
        .with_raw_response(text))
}

/// The first balanced `{...}` span in `text`, if any
pub fn find_json_span(text: &str) -> Option<&str> {
    json_spans(text).next()
}

/// Every balanced top-level `{...}` span, left to right
fn json_spans(text: &str) -> impl Iterator<Item = &str> {
    let mut offset = 0;
    std::iter::from_fn(move || {
        while let Some(start) = text[offset..].find('{').map(|i| i + offset) {
            match balanced_end(&text[start..]) {
                Some(len) => {
                    offset = start + len;
                    return Some(&text[start..start + len]);
                }
                // Unclosed brace; a later one may still open a complete object
                None => offset = start + 1,
            }
        }
        None
    })
}

/// Byte length of the balanced object starting at `candidate[0] == '{'`
fn balanced_end(candidate: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in candidate.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index + 1);
                }
            }
            _ => {}
        }
    }

    None
}

fn parse_ingredient(item: &Value) -> Option<ExtractedIngredient> {
    let fields = item.as_object()?;
    let name = fields.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    Some(ExtractedIngredient {
        name: name.to_string(),
        amount: scalar_text(fields.get("amount")),
        unit: scalar_text(fields.get("unit")),
        percent_daily_value: scalar_text(fields.get("percentDailyValue")),
        chemical_form: scalar_text(fields.get("chemicalForm")),
    })
}

/// Strings pass through, numbers become their decimal text, anything else is absent
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => vec![single.clone()],
        _ => Vec::new(),
    }
}
