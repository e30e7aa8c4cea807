//! Edamam recipe search and nutrition-analysis payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::openfoodfacts::lenient_number;
use super::{null_as_default, RecipeCandidate};
use crate::nutrition::NutrientRecord;

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hits: Vec<Option<Hit>>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    pub recipe: Option<RawRecipe>,
}

/// Nutrient code to amount. Entries sent as `null` are kept as `None`.
pub type RawTotals = HashMap<String, Option<RawNutrient>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecipe {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    pub image: Option<String>,
    #[serde(rename = "yield", default)]
    pub servings: Value,
    #[serde(default)]
    pub calories: Value,
    #[serde(default)]
    pub total_weight: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_nutrients: RawTotals,
}

#[derive(Debug, Deserialize)]
pub struct RawNutrient {
    #[serde(default)]
    pub quantity: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
}

/// Body for `POST /api/nutrition-details`.
#[derive(Debug, Serialize)]
pub struct AnalysisRequest<'a> {
    pub title: &'a str,
    pub ingr: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    #[serde(default)]
    pub calories: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_nutrients: RawTotals,
}

impl RawNutrient {
    fn grams(&self) -> f64 {
        let q = lenient_number(Some(&self.quantity));
        match self.unit.as_str() {
            "mg" => q / 1_000.0,
            "µg" | "ug" => q / 1_000_000.0,
            _ => q,
        }
    }

    fn kcal(&self) -> f64 {
        let q = lenient_number(Some(&self.quantity));
        if self.unit.eq_ignore_ascii_case("kj") {
            q / 4.184
        } else {
            q
        }
    }
}

/// Maps Edamam nutrient codes onto the seven tracked fields. `calories` is the
/// top-level figure, used when `ENERC_KCAL` is absent.
pub fn nutrients_from_totals(totals: &RawTotals, calories: &Value) -> NutrientRecord {
    let nutrient = |code: &str| totals.get(code).and_then(Option::as_ref);
    let grams = |code: &str| nutrient(code).map(RawNutrient::grams).unwrap_or(0.0);
    let energy = nutrient("ENERC_KCAL")
        .map(RawNutrient::kcal)
        .unwrap_or_else(|| lenient_number(Some(calories)));

    NutrientRecord {
        calories: energy,
        fat: grams("FAT"),
        saturated_fat: grams("FASAT"),
        carbohydrates: grams("CHOCDF"),
        proteins: grams("PROCNT"),
        sodium: grams("NA"),
        sugars: grams("SUGAR"),
    }
    .sanitized()
}

pub fn into_candidates(resp: SearchResponse) -> Vec<RecipeCandidate> {
    resp.hits
        .into_iter()
        .filter_map(|hit| hit?.recipe)
        .map(|r| {
            let totals = nutrients_from_totals(&r.total_nutrients, &r.calories);
            let weight = lenient_number(Some(&r.total_weight));
            RecipeCandidate::new(
                r.label,
                lenient_number(Some(&r.servings)),
                totals,
                (weight > 0.0).then_some(weight),
                r.image,
            )
        })
        .collect()
}

pub fn analysis_totals(resp: &AnalysisResponse) -> NutrientRecord {
    nutrients_from_totals(&resp.total_nutrients, &resp.calories)
}
