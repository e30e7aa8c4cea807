use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::NutrientRecord;

/// Where a ledger entry's numbers came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntrySource {
    Product { barcode: String },
    Recipe,
    /// Free-text ingredient list run through the nutrition analysis API.
    Analysis,
}

/// How much of the source was eaten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "snake_case")]
pub enum Portion {
    Grams(f64),
    Servings(f64),
}

/// One food item filed under a meal slot.
///
/// `nutrients` holds the already scaled amounts for `portion`, not the
/// per-100 g reference values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub name: String,
    pub source: EntrySource,
    pub portion: Portion,
    pub nutrients: NutrientRecord,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
}

impl FoodEntry {
    pub fn new(
        name: impl Into<String>,
        source: EntrySource,
        servings: f64,
        nutrients: NutrientRecord,
    ) -> Self {
        Self::with_portion(name, source, Portion::Servings(servings), nutrients)
    }

    pub fn with_portion(
        name: impl Into<String>,
        source: EntrySource,
        portion: Portion,
        nutrients: NutrientRecord,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            source,
            portion,
            nutrients,
            added_at: OffsetDateTime::now_utc(),
        }
    }
}
