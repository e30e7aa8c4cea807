use serde::Serialize;

use super::record::NutrientRecord;
use crate::ledger::MealLedger;

/// Running nutrition total for one session.
///
/// Mutated only through [`NutritionTotal::apply_delta`]; every field is kept
/// at zero or above.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct NutritionTotal {
    current: NutrientRecord,
}

impl NutritionTotal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &NutrientRecord {
        &self.current
    }

    /// Folds a signed delta into the total, clamping each field at 0.
    pub fn apply_delta(&mut self, delta: &NutrientRecord) {
        self.current = (self.current + *delta).clamped_non_negative();
    }

    /// Rebuilds the total from the ledger contents, discarding any drift the
    /// incremental path accumulated.
    pub fn recompute_from_scratch(&mut self, ledger: &MealLedger) {
        self.current = ledger
            .entries()
            .map(|e| &e.nutrients)
            .sum::<NutrientRecord>()
            .clamped_non_negative();
    }
}
