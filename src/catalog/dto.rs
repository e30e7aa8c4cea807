use serde::{Deserialize, Serialize};

use crate::foods::{Product, RecipeCandidate};
use crate::nutrition::FormattedNutrients;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    pub per_100g_display: FormattedNutrients,
}

#[derive(Debug, Deserialize)]
pub struct RecipeQuery {
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeHit {
    #[serde(flatten)]
    pub recipe: RecipeCandidate,
    pub per_serving_display: FormattedNutrients,
}

impl From<RecipeCandidate> for RecipeHit {
    fn from(recipe: RecipeCandidate) -> Self {
        Self {
            per_serving_display: recipe.per_serving.formatted(),
            recipe,
        }
    }
}
