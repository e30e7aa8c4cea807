//! One user's tracked day: the meal ledger, its running nutrition total, the
//! recipe shortlist and the calorie goal.

mod store;

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::foods::{Product, RecipeCandidate};
use crate::ledger::{EntrySource, FoodEntry, LedgerError, MealLedger, MealSlot, Portion};
use crate::nutrition::{FormattedNutrients, NutrientRecord, NutritionTotal};

pub use store::{SessionHandle, SessionLimitReached, SessionStore};

pub const DEFAULT_CALORIE_GOAL: f64 = 2000.0;

/// Tolerance for comparing the running total against a full recompute.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Largest amount any single nutrient of one entry may carry.
pub const MAX_ENTRY_AMOUNT: f64 = 1e7;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("quantity must be a positive number of grams, got {0}")]
    InvalidQuantity(f64),
    #[error("yield must be a positive number of servings, got {0}")]
    InvalidYield(f64),
    #[error("calorie goal must be zero or more, got {0}")]
    InvalidGoal(f64),
    #[error("nutrient amount {0} is outside 0 to {max}", max = MAX_ENTRY_AMOUNT)]
    AmountOutOfRange(f64),
    #[error("running total would overflow")]
    TotalOverflow,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: OffsetDateTime,
    ledger: MealLedger,
    total: NutritionTotal,
    recipes: Vec<RecipeCandidate>,
    calorie_goal: f64,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: OffsetDateTime::now_utc(),
            ledger: MealLedger::new(),
            total: NutritionTotal::new(),
            recipes: Vec::new(),
            calorie_goal: DEFAULT_CALORIE_GOAL,
        }
    }

    pub fn ledger(&self) -> &MealLedger {
        &self.ledger
    }

    pub fn total(&self) -> &NutrientRecord {
        self.total.get()
    }

    /// Files `entry` under `slot` and adds its nutrients to the total.
    /// Entries with amounts outside `0..=MAX_ENTRY_AMOUNT`, or that would push
    /// the total past `f64::MAX`, are refused and nothing changes.
    pub fn add_entry(&mut self, slot: MealSlot, entry: FoodEntry) -> Result<usize, SessionError> {
        let delta = entry.nutrients;
        check_amounts(&delta)?;
        if !(*self.total() + delta).is_finite() {
            return Err(SessionError::TotalOverflow);
        }
        let index = self.ledger.add_entry(slot, entry);
        self.total.apply_delta(&delta);
        self.check_drift("add");
        debug!(session_id = %self.id, %slot, index, calories = delta.calories, "entry added");
        Ok(index)
    }

    /// Replaces the whole slot and moves the total by the difference between
    /// the new and old contents.
    pub fn replace_slot(
        &mut self,
        slot: MealSlot,
        entries: Vec<FoodEntry>,
    ) -> Result<Vec<FoodEntry>, SessionError> {
        for e in &entries {
            check_amounts(&e.nutrients)?;
        }
        let incoming: NutrientRecord = entries.iter().map(|e| &e.nutrients).sum();
        let outgoing: NutrientRecord = self.ledger.slot(slot).iter().map(|e| &e.nutrients).sum();
        if !(*self.total() + incoming - outgoing).is_finite() {
            return Err(SessionError::TotalOverflow);
        }
        let old = self.ledger.replace_slot(slot, entries);
        self.total.apply_delta(&(incoming - outgoing));
        self.check_drift("replace");
        debug!(session_id = %self.id, %slot, replaced = old.len(), "slot replaced");
        Ok(old)
    }

    /// Removes the entry and subtracts the amounts that were stored for it,
    /// i.e. the scaled portion, never the per-100 g reference values.
    pub fn remove_entry_at(
        &mut self,
        slot: MealSlot,
        index: usize,
    ) -> Result<FoodEntry, SessionError> {
        let entry = self.ledger.remove_entry_at(slot, index)?;
        self.total.apply_delta(&-entry.nutrients);
        self.check_drift("remove");
        debug!(session_id = %self.id, %slot, index, "entry removed");
        Ok(entry)
    }

    fn check_drift(&self, op: &'static str) {
        if cfg!(debug_assertions) && !self.verify() {
            warn!(session_id = %self.id, op, "running total drifted from ledger");
        }
    }

    pub fn add_product(
        &mut self,
        slot: MealSlot,
        product: &Product,
        grams: f64,
    ) -> Result<(usize, FoodEntry), SessionError> {
        if !(grams.is_finite() && grams > 0.0) {
            return Err(SessionError::InvalidQuantity(grams));
        }
        let entry = FoodEntry::with_portion(
            product.name.clone(),
            EntrySource::Product {
                barcode: product.barcode.clone(),
            },
            Portion::Grams(grams),
            product.per_100g.sanitized().for_grams(grams),
        );
        let index = self.add_entry(slot, entry.clone())?;
        Ok((index, entry))
    }

    /// Adds one serving of a recipe whose `totals` cover `servings` portions.
    pub fn add_recipe_serving(
        &mut self,
        slot: MealSlot,
        name: &str,
        totals: &NutrientRecord,
        servings: f64,
        source: EntrySource,
    ) -> Result<(usize, FoodEntry), SessionError> {
        if !(servings.is_finite() && servings > 0.0) {
            return Err(SessionError::InvalidYield(servings));
        }
        let entry = FoodEntry::new(name, source, 1.0, totals.sanitized().per_serving(servings));
        let index = self.add_entry(slot, entry.clone())?;
        Ok((index, entry))
    }

    pub fn save_recipe(&mut self, recipe: RecipeCandidate) -> usize {
        self.recipes.push(recipe);
        self.recipes.len()
    }

    pub fn saved_recipes(&self) -> &[RecipeCandidate] {
        &self.recipes
    }

    pub fn calorie_goal(&self) -> f64 {
        self.calorie_goal
    }

    pub fn set_calorie_goal(&mut self, kcal: f64) -> Result<(), SessionError> {
        if !(kcal.is_finite() && kcal >= 0.0) {
            return Err(SessionError::InvalidGoal(kcal));
        }
        self.calorie_goal = kcal;
        Ok(())
    }

    /// Calories eaten as a percentage of the goal. Not capped at 100.
    pub fn goal_progress(&self) -> f64 {
        if self.calorie_goal == 0.0 {
            return 0.0;
        }
        self.total().calories / self.calorie_goal * 100.0
    }

    /// True when the running total matches a full recompute of the ledger.
    pub fn verify(&self) -> bool {
        let mut fresh = NutritionTotal::new();
        fresh.recompute_from_scratch(&self.ledger);
        fresh.get().approx_eq(self.total(), SUM_TOLERANCE)
    }

    pub fn summary(&self) -> SessionSummary {
        let meals = self
            .ledger
            .iter()
            .map(|(slot, entries)| SlotSummary {
                slot,
                subtotal: entries.iter().map(|e| &e.nutrients).sum(),
                entries: entries.to_vec(),
            })
            .collect();
        SessionSummary {
            id: self.id,
            created_at: self.created_at,
            meals,
            entry_count: self.ledger.len(),
            total: *self.total(),
            total_display: self.total().formatted(),
            calorie_goal: self.calorie_goal,
            goal_progress_percent: self.goal_progress(),
        }
    }
}

fn check_amounts(nutrients: &NutrientRecord) -> Result<(), SessionError> {
    match nutrients
        .fields()
        .into_iter()
        .find(|v| !(0.0..=MAX_ENTRY_AMOUNT).contains(v))
    {
        Some(bad) => Err(SessionError::AmountOutOfRange(bad)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub slot: MealSlot,
    pub entries: Vec<FoodEntry>,
    pub subtotal: NutrientRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub meals: Vec<SlotSummary>,
    pub entry_count: usize,
    pub total: NutrientRecord,
    pub total_display: FormattedNutrients,
    pub calorie_goal: f64,
    pub goal_progress_percent: f64,
}
