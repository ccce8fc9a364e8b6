//! # Extraction Prompts
//!
//! Instructions sent alongside the label image. Every prompt asks for the same
//! JSON shape (`productName`, `servingSize`, `ingredients[]`, `warnings[]`),
//! so a single response parser handles all of them.

use std::fmt;

/// Basic single-pass extraction prompt
pub const STANDARD_PROMPT: &str = r#"Analyze this vitamin/supplement label image and extract ALL ingredients with their amounts.

Please provide the information in this exact JSON format:
{
  "productName": "Name of the product",
  "servingSize": "Serving size if visible",
  "ingredients": [
    {
      "name": "Ingredient name",
      "amount": "Amount (just the number)",
      "unit": "Unit (mg, mcg, IU, g, etc.)",
      "percentDailyValue": "% DV if shown"
    }
  ],
  "warnings": ["Any warnings or allergen information"]
}

Be thorough and extract every vitamin, mineral, and active ingredient listed."#;

/// Detailed prompt used by the annotated single-pass analysis
pub const ENHANCED_PROMPT: &str = r#"You are a supplement label analyzer with expertise in supplement labeling requirements, vitamin nomenclature, and prenatal nutrition.

Analyze this prenatal vitamin/supplement label image and extract ALL ingredient information.

For EACH vitamin, mineral, or nutrient extract:
- name: the most specific name shown, e.g. "Vitamin D3 (Cholecalciferol)"
- amount: ONLY the numeric value; if several are shown (e.g. "2000 IU (50 mcg)") use the first
- unit: mg, mcg, g, IU
- percentDailyValue: as printed, preferring the pregnant/lactating column
- chemicalForm: the "as ..." part, e.g. "as Calcium Carbonate"

Common pitfalls: do not confuse "l" with "1" or "O" with "0", and never mix up mg and mcg.

Return ONLY valid JSON:
{
  "productName": "Exact product name",
  "servingSize": "1 tablet",
  "ingredients": [
    {
      "name": "Vitamin D3",
      "amount": "2000",
      "unit": "IU",
      "percentDailyValue": "500%",
      "chemicalForm": "as Cholecalciferol"
    }
  ],
  "warnings": ["Contains iron - keep out of reach of children"]
}"#;

/// Prompt tuned for text distorted by a curved bottle surface
pub const CURVED_BOTTLE_PROMPT: &str = r#"You are analyzing a vitamin/supplement label on a CURVED BOTTLE. The text may be stretched, compressed, warped, or partly hidden by reflections.

Reading strategy:
- Look for the Supplement Facts panel first
- Read distorted words character by character; familiar vitamin names are a good anchor
- Watch for "l" read as "1", "O" read as "0", and "mcg" read as "mg"

Extract ALL ingredients. For each one give the name, the numeric amount only, the unit, and the % Daily Value if shown.

Return ONLY valid JSON:
{
  "productName": "exact product name",
  "servingSize": "serving size if visible",
  "ingredients": [
    {
      "name": "Vitamin name (even if slightly unclear)",
      "amount": "numeric amount",
      "unit": "mg, mcg, IU, etc.",
      "percentDailyValue": "% DV if shown"
    }
  ],
  "warnings": ["any warnings"]
}"#;

/// Same target shape, read edge-to-edge to recover text that wraps out of view
pub const MULTI_ANGLE_PROMPT: &str = r#"This photo shows a supplement label wrapped around a round bottle, so the left and right edges of the label bend away from the camera.

Read the label in three passes: the flat center, then the left edge, then the right edge. Combine the passes into one list without repeating any ingredient. Text near the edges is foreshortened; use the column layout of the Supplement Facts panel (name, amount, % Daily Value) to line values up with their names.

Return ONLY valid JSON:
{
  "productName": "exact product name",
  "servingSize": "serving size if visible",
  "ingredients": [
    {
      "name": "ingredient name",
      "amount": "numeric amount only",
      "unit": "mg, mcg, IU, g",
      "percentDailyValue": "% DV if shown"
    }
  ],
  "warnings": ["any warnings"]
}"#;

/// Paired with a grayscale, contrast-stretched copy of the image
pub const PREPROCESSED_PROMPT: &str = r#"This is a high-contrast grayscale copy of a supplement label photo, prepared to make faint or glossy print readable.

Extract every vitamin, mineral, and active ingredient from the Supplement Facts panel. Give the numeric amount only, the unit exactly as printed (mg, mcg, IU, g), and the % Daily Value when shown. Skip footnote markers such as "†" and "*".

Return ONLY valid JSON:
{
  "productName": "exact product name",
  "servingSize": "serving size if visible",
  "ingredients": [
    {
      "name": "ingredient name",
      "amount": "numeric amount only",
      "unit": "mg, mcg, IU, g",
      "percentDailyValue": "% DV if shown"
    }
  ],
  "warnings": ["any warnings"]
}"#;

/// One independent extraction attempt run by the curved-bottle merger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    /// Original image with the curved-surface prompt
    CurvedBottle,
    /// Original image read in edge-to-edge passes
    MultiAngle,
    /// Contrast-enhanced copy of the image
    Preprocessed,
}

impl ExtractionStrategy {
    /// All strategies, in merge order
    pub const ALL: [ExtractionStrategy; 3] = [
        ExtractionStrategy::CurvedBottle,
        ExtractionStrategy::MultiAngle,
        ExtractionStrategy::Preprocessed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExtractionStrategy::CurvedBottle => "curved-bottle-prompt",
            ExtractionStrategy::MultiAngle => "multi-angle-analysis",
            ExtractionStrategy::Preprocessed => "contrast-preprocessing",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            ExtractionStrategy::CurvedBottle => CURVED_BOTTLE_PROMPT,
            ExtractionStrategy::MultiAngle => MULTI_ANGLE_PROMPT,
            ExtractionStrategy::Preprocessed => PREPROCESSED_PROMPT,
        }
    }

    /// Whether the strategy sends a transformed copy of the image
    pub fn needs_preprocessing(&self) -> bool {
        matches!(self, ExtractionStrategy::Preprocessed)
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
