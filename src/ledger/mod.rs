//! Per-meal food lists for one day.

mod entry;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use entry::{EntrySource, FoodEntry, Portion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snacks,
    ];

    fn index(self) -> usize {
        match self {
            MealSlot::Breakfast => 0,
            MealSlot::Lunch => 1,
            MealSlot::Dinner => 2,
            MealSlot::Snacks => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
            MealSlot::Snacks => "Snacks",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown meal slot '{0}'")]
pub struct UnknownSlot(pub String);

impl FromStr for MealSlot {
    type Err = UnknownSlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSlot(s.to_string()))
    }
}

impl TryFrom<String> for MealSlot {
    type Error = UnknownSlot;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no entry at index {index} in {slot} (it holds {len})")]
    IndexOutOfRange {
        slot: MealSlot,
        index: usize,
        len: usize,
    },
}

/// The four meal slots and their entries, in insertion order.
///
/// The ledger knows nothing about totals; [`crate::session::Session`] pairs
/// every mutation here with the matching accumulator update.
#[derive(Debug, Clone, Default)]
pub struct MealLedger {
    slots: [Vec<FoodEntry>; 4],
}

impl MealLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, slot: MealSlot) -> &[FoodEntry] {
        &self.slots[slot.index()]
    }

    /// All slots in fixed Breakfast..Snacks order.
    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, &[FoodEntry])> {
        MealSlot::ALL
            .into_iter()
            .map(move |slot| (slot, self.slot(slot)))
    }

    pub fn entries(&self) -> impl Iterator<Item = &FoodEntry> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    /// Appends `entry` and returns the index it landed at.
    pub fn add_entry(&mut self, slot: MealSlot, entry: FoodEntry) -> usize {
        let list = &mut self.slots[slot.index()];
        list.push(entry);
        list.len() - 1
    }

    /// Swaps in a whole new sequence for `slot`, handing back the old one.
    pub fn replace_slot(&mut self, slot: MealSlot, entries: Vec<FoodEntry>) -> Vec<FoodEntry> {
        std::mem::replace(&mut self.slots[slot.index()], entries)
    }

    pub fn remove_entry_at(
        &mut self,
        slot: MealSlot,
        index: usize,
    ) -> Result<FoodEntry, LedgerError> {
        let list = &mut self.slots[slot.index()];
        if index >= list.len() {
            return Err(LedgerError::IndexOutOfRange {
                slot,
                index,
                len: list.len(),
            });
        }
        Ok(list.remove(index))
    }
}
