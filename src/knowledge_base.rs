//! # Nutrient Knowledge Base
//!
//! Static reference table of the vitamins, minerals and fatty acids commonly
//! found on prenatal supplement labels: canonical names, aliases used for
//! matching, customary units, chemical forms, plausible daily-dose envelopes
//! and static cautionary notes.
//!
//! ## Catalog order
//!
//! Name resolution returns the *first* entry that matches, so the order of
//! [`NUTRIENT_CATALOG`] is part of the observable behavior:
//!
//! 1. Vitamin A, 2. Vitamin C, 3. Vitamin D3, 4. Vitamin E, 5. Vitamin K,
//! 6. Thiamin (B1), 7. Riboflavin (B2), 8. Niacin (B3), 9. Vitamin B6,
//! 10. Vitamin B12, 11. Folic Acid, 12. Biotin, 13. Pantothenic Acid,
//! 14. Calcium, 15. Iron, 16. Magnesium, 17. Zinc, 18. Iodine, 19. DHA,
//! 20. EPA, 21. Choline.
//!
//! Entries are never reordered; new entries are appended.

use serde::Serialize;

use crate::nutrient_model::Population;

/// Plausible daily-dose envelope for one population segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DosageRange {
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

/// Typical ranges per population segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TypicalRanges {
    pub prenatal: Option<DosageRange>,
    pub adult: Option<DosageRange>,
}

/// A canonical catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientReference {
    /// Stable identifier (e.g., "folic-acid")
    pub id: &'static str,
    /// Display name (e.g., "Vitamin D3")
    pub canonical_name: &'static str,
    /// Lowercase alternate names and chemical synonyms
    pub aliases: &'static [&'static str],
    /// Units this nutrient is customarily expressed in
    pub common_units: &'static [&'static str],
    /// Known "as X" qualifiers
    pub chemical_forms: &'static [&'static str],
    pub typical_ranges: TypicalRanges,
    /// Multipliers from a unit to the nutrient's base unit
    pub conversion_factors: &'static [(&'static str, f64)],
    pub pregnancy_recommendation: Option<&'static str>,
    /// Informational notes surfaced whenever the nutrient is found
    pub warnings: &'static [&'static str],
}

const fn range(min: f64, max: f64, unit: &'static str) -> Option<DosageRange> {
    Some(DosageRange { min, max, unit })
}

/// The nutrient catalog, in resolution order
pub static NUTRIENT_CATALOG: &[NutrientReference] = &[
    NutrientReference {
        id: "vitamin-a",
        canonical_name: "Vitamin A",
        aliases: &["vitamin a", "retinol", "beta-carotene", "beta carotene", "retinyl palmitate", "retinyl acetate"],
        common_units: &["mcg", "μg", "IU", "mg"],
        chemical_forms: &["as Retinol", "as Beta-Carotene", "as Retinyl Palmitate"],
        typical_ranges: TypicalRanges {
            prenatal: range(700.0, 3000.0, "mcg"),
            adult: range(700.0, 3000.0, "mcg"),
        },
        conversion_factors: &[("IU", 0.3), ("mcg", 1.0), ("mg", 1000.0)],
        pregnancy_recommendation: Some("770 mcg (2,565 IU) daily"),
        warnings: &["High doses (>3000 mcg) may be harmful during pregnancy"],
    },
    NutrientReference {
        id: "vitamin-c",
        canonical_name: "Vitamin C",
        aliases: &["vitamin c", "ascorbic acid", "ascorbate", "l-ascorbic acid"],
        common_units: &["mg", "g"],
        chemical_forms: &["as Ascorbic Acid", "as Sodium Ascorbate", "as Calcium Ascorbate"],
        typical_ranges: TypicalRanges {
            prenatal: range(80.0, 2000.0, "mg"),
            adult: range(75.0, 2000.0, "mg"),
        },
        conversion_factors: &[("mg", 1.0), ("g", 1000.0)],
        pregnancy_recommendation: Some("85 mg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "vitamin-d",
        canonical_name: "Vitamin D3",
        aliases: &["vitamin d", "vitamin d3", "vitamin d2", "cholecalciferol", "ergocalciferol", "calciferol"],
        common_units: &["IU", "mcg", "μg"],
        chemical_forms: &["as Cholecalciferol", "as Ergocalciferol"],
        typical_ranges: TypicalRanges {
            prenatal: range(400.0, 4000.0, "IU"),
            adult: range(600.0, 4000.0, "IU"),
        },
        conversion_factors: &[("IU", 1.0), ("mcg", 40.0), ("μg", 40.0)],
        pregnancy_recommendation: Some("600 IU (15 mcg) daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "vitamin-e",
        canonical_name: "Vitamin E",
        aliases: &["vitamin e", "tocopherol", "alpha-tocopherol", "tocopheryl", "d-alpha-tocopherol"],
        common_units: &["mg", "IU"],
        chemical_forms: &["as d-alpha-Tocopherol", "as dl-alpha-Tocopherol", "as Tocopheryl Acetate"],
        typical_ranges: TypicalRanges {
            prenatal: range(15.0, 1000.0, "mg"),
            adult: range(15.0, 1000.0, "mg"),
        },
        conversion_factors: &[("mg", 1.0), ("IU", 0.67)],
        pregnancy_recommendation: Some("15 mg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "vitamin-k",
        canonical_name: "Vitamin K",
        aliases: &["vitamin k", "vitamin k1", "vitamin k2", "phylloquinone", "menaquinone"],
        common_units: &["mcg", "μg"],
        chemical_forms: &["as Phylloquinone", "as Menaquinone"],
        typical_ranges: TypicalRanges {
            prenatal: range(75.0, 120.0, "mcg"),
            adult: range(90.0, 120.0, "mcg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("90 mcg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "vitamin-b1",
        canonical_name: "Thiamin (Vitamin B1)",
        aliases: &["thiamin", "thiamine", "vitamin b1", "b1"],
        common_units: &["mg"],
        chemical_forms: &["as Thiamine Hydrochloride", "as Thiamine Mononitrate"],
        typical_ranges: TypicalRanges {
            prenatal: range(1.4, 100.0, "mg"),
            adult: range(1.1, 100.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("1.4 mg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "vitamin-b2",
        canonical_name: "Riboflavin (Vitamin B2)",
        aliases: &["riboflavin", "vitamin b2", "b2"],
        common_units: &["mg"],
        chemical_forms: &["as Riboflavin"],
        typical_ranges: TypicalRanges {
            prenatal: range(1.4, 100.0, "mg"),
            adult: range(1.1, 100.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("1.4 mg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "vitamin-b3",
        canonical_name: "Niacin (Vitamin B3)",
        aliases: &["niacin", "vitamin b3", "b3", "nicotinic acid", "niacinamide", "nicotinamide"],
        common_units: &["mg"],
        chemical_forms: &["as Niacinamide", "as Nicotinic Acid"],
        typical_ranges: TypicalRanges {
            prenatal: range(18.0, 35.0, "mg"),
            adult: range(14.0, 35.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("18 mg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "vitamin-b6",
        canonical_name: "Vitamin B6",
        aliases: &["vitamin b6", "b6", "pyridoxine", "pyridoxal", "pyridoxamine"],
        common_units: &["mg"],
        chemical_forms: &["as Pyridoxine Hydrochloride", "as Pyridoxal-5-Phosphate"],
        typical_ranges: TypicalRanges {
            prenatal: range(1.9, 100.0, "mg"),
            adult: range(1.3, 100.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("1.9 mg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "vitamin-b12",
        canonical_name: "Vitamin B12",
        aliases: &["vitamin b12", "b12", "cobalamin", "cyanocobalamin", "methylcobalamin"],
        common_units: &["mcg", "μg"],
        chemical_forms: &["as Cyanocobalamin", "as Methylcobalamin"],
        typical_ranges: TypicalRanges {
            prenatal: range(2.6, 1000.0, "mcg"),
            adult: range(2.4, 1000.0, "mcg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("2.6 mcg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "folic-acid",
        canonical_name: "Folic Acid",
        aliases: &["folic acid", "folate", "vitamin b9", "b9", "methylfolate", "5-mthf", "l-methylfolate"],
        common_units: &["mcg", "μg", "mg"],
        chemical_forms: &["as Folic Acid", "as L-Methylfolate", "as 5-MTHF"],
        typical_ranges: TypicalRanges {
            prenatal: range(400.0, 1000.0, "mcg"),
            adult: range(400.0, 1000.0, "mcg"),
        },
        conversion_factors: &[("mcg", 1.0), ("mg", 1000.0)],
        pregnancy_recommendation: Some("600 mcg daily (critical for neural tube development)"),
        warnings: &["Essential during pregnancy - prevents neural tube defects"],
    },
    NutrientReference {
        id: "biotin",
        canonical_name: "Biotin",
        aliases: &["biotin", "vitamin b7", "vitamin h", "b7"],
        common_units: &["mcg", "μg"],
        chemical_forms: &["as d-Biotin"],
        typical_ranges: TypicalRanges {
            prenatal: range(30.0, 10000.0, "mcg"),
            adult: range(30.0, 10000.0, "mcg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("30 mcg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "pantothenic-acid",
        canonical_name: "Pantothenic Acid",
        aliases: &["pantothenic acid", "vitamin b5", "b5", "pantothenate"],
        common_units: &["mg"],
        chemical_forms: &["as Calcium Pantothenate", "as Pantothenic Acid"],
        typical_ranges: TypicalRanges {
            prenatal: range(6.0, 100.0, "mg"),
            adult: range(5.0, 100.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("6 mg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "calcium",
        canonical_name: "Calcium",
        aliases: &["calcium", "ca"],
        common_units: &["mg", "g"],
        chemical_forms: &["as Calcium Carbonate", "as Calcium Citrate", "as Calcium Phosphate"],
        typical_ranges: TypicalRanges {
            prenatal: range(1000.0, 2500.0, "mg"),
            adult: range(1000.0, 2500.0, "mg"),
        },
        conversion_factors: &[("mg", 1.0), ("g", 1000.0)],
        pregnancy_recommendation: Some("1000-1300 mg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "iron",
        canonical_name: "Iron",
        aliases: &["iron", "fe"],
        common_units: &["mg"],
        chemical_forms: &["as Ferrous Sulfate", "as Ferrous Fumarate", "as Ferrous Gluconate", "as Ferric Iron"],
        typical_ranges: TypicalRanges {
            prenatal: range(27.0, 45.0, "mg"),
            adult: range(8.0, 45.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("27 mg daily"),
        warnings: &["May cause constipation", "Take with vitamin C for better absorption"],
    },
    NutrientReference {
        id: "magnesium",
        canonical_name: "Magnesium",
        aliases: &["magnesium", "mg"],
        common_units: &["mg", "g"],
        chemical_forms: &["as Magnesium Oxide", "as Magnesium Citrate", "as Magnesium Glycinate"],
        typical_ranges: TypicalRanges {
            prenatal: range(350.0, 400.0, "mg"),
            adult: range(310.0, 420.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("350-400 mg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "zinc",
        canonical_name: "Zinc",
        aliases: &["zinc", "zn"],
        common_units: &["mg"],
        chemical_forms: &["as Zinc Oxide", "as Zinc Sulfate", "as Zinc Gluconate"],
        typical_ranges: TypicalRanges {
            prenatal: range(11.0, 40.0, "mg"),
            adult: range(8.0, 40.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("11 mg daily"),
        warnings: &[],
    },
    NutrientReference {
        id: "iodine",
        canonical_name: "Iodine",
        aliases: &["iodine", "i"],
        common_units: &["mcg", "μg"],
        chemical_forms: &["as Potassium Iodide", "as Sodium Iodide"],
        typical_ranges: TypicalRanges {
            prenatal: range(220.0, 1100.0, "mcg"),
            adult: range(150.0, 1100.0, "mcg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("220 mcg daily (critical for baby brain development)"),
        warnings: &[],
    },
    NutrientReference {
        id: "dha",
        canonical_name: "DHA (Docosahexaenoic Acid)",
        aliases: &["dha", "docosahexaenoic acid", "omega-3", "omega 3", "fish oil"],
        common_units: &["mg", "g"],
        chemical_forms: &["from Fish Oil", "from Algal Oil"],
        typical_ranges: TypicalRanges {
            prenatal: range(200.0, 1000.0, "mg"),
            adult: range(250.0, 1000.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("200-300 mg daily (supports baby brain/eye development)"),
        warnings: &[],
    },
    NutrientReference {
        id: "epa",
        canonical_name: "EPA (Eicosapentaenoic Acid)",
        aliases: &["epa", "eicosapentaenoic acid", "omega-3"],
        common_units: &["mg", "g"],
        chemical_forms: &["from Fish Oil", "from Algal Oil"],
        typical_ranges: TypicalRanges {
            prenatal: range(100.0, 500.0, "mg"),
            adult: range(250.0, 1000.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: None,
        warnings: &[],
    },
    NutrientReference {
        id: "choline",
        canonical_name: "Choline",
        aliases: &["choline", "choline bitartrate"],
        common_units: &["mg"],
        chemical_forms: &["as Choline Bitartrate", "as Phosphatidylcholine"],
        typical_ranges: TypicalRanges {
            prenatal: range(450.0, 550.0, "mg"),
            adult: range(425.0, 550.0, "mg"),
        },
        conversion_factors: &[],
        pregnancy_recommendation: Some("450 mg daily"),
        warnings: &[],
    },
];

impl NutrientReference {
    /// Dosage range for a population segment, if the catalog defines one
    pub fn range_for(&self, population: Population) -> Option<&DosageRange> {
        match population {
            Population::Prenatal => self.typical_ranges.prenatal.as_ref(),
            Population::Adult => self.typical_ranges.adult.as_ref(),
        }
    }

    /// Whether `unit` is one of this nutrient's customary units (case-insensitive)
    pub fn uses_unit(&self, unit: &str) -> bool {
        let unit = unit.trim();
        self.common_units.iter().any(|u| u.eq_ignore_ascii_case(unit))
    }

    /// Convert an amount between two units using the conversion factors.
    ///
    /// Returns `None` when either unit has no factor.
    pub fn convert(&self, amount: f64, from_unit: &str, to_unit: &str) -> Option<f64> {
        if from_unit == to_unit {
            return Some(amount);
        }
        let from = self.conversion_factor(from_unit)?;
        let to = self.conversion_factor(to_unit)?;
        Some(amount * from / to)
    }

    fn conversion_factor(&self, unit: &str) -> Option<f64> {
        self.conversion_factors
            .iter()
            .find(|(u, _)| u.eq_ignore_ascii_case(unit))
            .map(|(_, factor)| *factor)
    }

    /// Chemical form listed in the catalog that appears in `text`, if any
    pub fn find_chemical_form(&self, text: &str) -> Option<&'static str> {
        let text = text.to_lowercase();
        self.chemical_forms
            .iter()
            .copied()
            .find(|form| text.contains(&form.to_lowercase()))
    }
}

/// Look up a catalog entry by its stable identifier
pub fn find_by_id(id: &str) -> Option<&'static NutrientReference> {
    NUTRIENT_CATALOG.iter().find(|entry| entry.id == id)
}
