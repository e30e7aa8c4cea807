//! External food data: barcode products, recipe search and ingredient
//! analysis. Everything that crosses this boundary is normalized into
//! [`NutrientRecord`] before the rest of the crate sees it.

pub mod barcode;
pub mod edamam;
pub mod http;
pub mod openfoodfacts;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::nutrition::NutrientRecord;

pub use http::HttpFoodSource;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid barcode '{0}': expected 8 to 14 digits")]
    InvalidBarcode(String),
    #[error("food service unreachable: {0}")]
    Transport(String),
    #[error("food service answered {status}")]
    Upstream { status: u16 },
    #[error("unreadable food service response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LookupError::Decode(e.to_string())
        } else {
            LookupError::Transport(e.to_string())
        }
    }
}

/// A packaged product found by barcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub barcode: String,
    pub name: String,
    pub brands: Option<String>,
    pub image_url: Option<String>,
    pub ingredients_text: Option<String>,
    pub nutrition_grade: Option<String>,
    pub per_100g: NutrientRecord,
}

/// A recipe search hit with its totals split into servings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCandidate {
    pub name: String,
    #[serde(rename = "yield")]
    pub servings: f64,
    pub total_weight_g: Option<f64>,
    pub image: Option<String>,
    pub totals: NutrientRecord,
    pub per_serving: NutrientRecord,
}

impl RecipeCandidate {
    pub fn new(
        name: impl Into<String>,
        servings: f64,
        totals: NutrientRecord,
        total_weight_g: Option<f64>,
        image: Option<String>,
    ) -> Self {
        let servings = if servings.is_finite() && servings > 0.0 {
            servings
        } else {
            1.0
        };
        Self {
            name: name.into(),
            servings,
            total_weight_g,
            image,
            totals,
            per_serving: totals.per_serving(servings),
        }
    }
}

/// Reads an explicit JSON `null` the same way as a missing key.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[async_trait]
pub trait FoodSource: Send + Sync {
    /// `Ok(None)` when the database has no product for this code.
    async fn lookup_product(&self, barcode: &str) -> Result<Option<Product>, LookupError>;
    async fn search_recipes(&self, query: &str) -> Result<Vec<RecipeCandidate>, LookupError>;
    /// Total nutrients for a free-text ingredient list (one line per item).
    async fn analyze_ingredients(
        &self,
        title: &str,
        ingredients: &[String],
    ) -> Result<NutrientRecord, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_splits_totals_by_yield() {
        let totals = NutrientRecord {
            calories: 800.0,
            ..NutrientRecord::ZERO
        };
        let c = RecipeCandidate::new("stew", 4.0, totals, Some(1200.0), None);
        assert_eq!(c.per_serving.calories, 200.0);
        assert_eq!(c.totals.calories, 800.0);
    }

    #[test]
    fn candidate_with_bad_yield_counts_as_one_serving() {
        let totals = NutrientRecord {
            calories: 500.0,
            ..NutrientRecord::ZERO
        };
        for bad in [0.0, -2.0, f64::NAN] {
            let c = RecipeCandidate::new("mystery", bad, totals, None, None);
            assert_eq!(c.servings, 1.0);
            assert_eq!(c.per_serving.calories, 500.0);
        }
    }

    #[test]
    fn candidate_serializes_yield_key() {
        let c = RecipeCandidate::new("toast", 2.0, NutrientRecord::ZERO, None, None);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["yield"], 2.0);
    }
}
