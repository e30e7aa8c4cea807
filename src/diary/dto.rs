use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{FoodEntry, MealSlot};
use crate::nutrition::NutrientRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedSessionResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    pub barcode: String,
    #[serde(default = "default_quantity_g")]
    pub quantity_g: f64,
}
fn default_quantity_g() -> f64 {
    100.0
}

/// A recipe the client already has totals for (e.g. a search hit).
#[derive(Debug, Deserialize)]
pub struct AddRecipeRequest {
    pub name: String,
    /// Totals for the whole recipe; missing nutrients count as 0.
    #[serde(default)]
    pub nutrients: NutrientRecord,
    #[serde(rename = "yield")]
    pub servings: f64,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRecipeRequest {
    pub title: Option<String>,
    pub ingredients: Vec<String>,
    #[serde(rename = "yield")]
    pub servings: f64,
}

#[derive(Debug, Deserialize)]
pub struct SaveRecipeRequest {
    pub name: String,
    #[serde(rename = "yield")]
    pub servings: f64,
    #[serde(default)]
    pub totals: NutrientRecord,
    pub total_weight_g: Option<f64>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceSlotRequest {
    pub keep: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub calories: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoalResponse {
    pub calorie_goal: f64,
    pub goal_progress_percent: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddedEntryResponse {
    pub slot: MealSlot,
    pub index: usize,
    pub entry: FoodEntry,
    pub total: NutrientRecord,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemovedEntryResponse {
    pub slot: MealSlot,
    pub removed: FoodEntry,
    pub total: NutrientRecord,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlotResponse {
    pub slot: MealSlot,
    pub entries: Vec<FoodEntry>,
    pub subtotal: NutrientRecord,
}
