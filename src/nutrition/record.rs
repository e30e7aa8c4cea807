use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// The seven tracked nutrient quantities.
///
/// Used both for per-reference-unit data (per 100 g, per serving) and for
/// signed deltas folded into a running total. Missing fields deserialize as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientRecord {
    /// kcal
    pub calories: f64,
    pub fat: f64,
    pub saturated_fat: f64,
    pub carbohydrates: f64,
    pub proteins: f64,
    /// grams, not milligrams
    pub sodium: f64,
    pub sugars: f64,
}

impl NutrientRecord {
    pub const ZERO: Self = Self {
        calories: 0.0,
        fat: 0.0,
        saturated_fat: 0.0,
        carbohydrates: 0.0,
        proteins: 0.0,
        sodium: 0.0,
        sugars: 0.0,
    };

    pub fn fields(&self) -> [f64; 7] {
        [
            self.calories,
            self.fat,
            self.saturated_fat,
            self.carbohydrates,
            self.proteins,
            self.sodium,
            self.sugars,
        ]
    }

    fn from_fields(f: [f64; 7]) -> Self {
        Self {
            calories: f[0],
            fat: f[1],
            saturated_fat: f[2],
            carbohydrates: f[3],
            proteins: f[4],
            sodium: f[5],
            sugars: f[6],
        }
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_fields(self.fields().map(f))
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let (a, b) = (self.fields(), other.fields());
        Self::from_fields(std::array::from_fn(|i| f(a[i], b[i])))
    }

    pub fn scaled(&self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// Scales a per-100 g record to `grams` actually eaten.
    pub fn for_grams(&self, grams: f64) -> Self {
        self.scaled(grams / 100.0)
    }

    /// Splits recipe totals into one serving. Callers validate `servings > 0`.
    pub fn per_serving(&self, servings: f64) -> Self {
        self.map(|v| v / servings)
    }

    pub fn clamped_non_negative(&self) -> Self {
        self.map(|v| v.max(0.0))
    }

    /// Boundary cleanup for external data: NaN, infinities and negative
    /// amounts become 0.
    pub fn sanitized(&self) -> Self {
        self.map(|v| if v.is_finite() && v > 0.0 { v } else { 0.0 })
    }

    pub fn is_finite(&self) -> bool {
        self.fields().iter().all(|v| v.is_finite())
    }

    /// Field-wise comparison. `tolerance` is absolute for values up to 1 and
    /// relative above that. A non-finite field only matches the identical
    /// value, so NaN never matches and infinity never matches a finite number.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.fields()
            .iter()
            .zip(other.fields().iter())
            .all(|(&a, &b)| {
                if !(a.is_finite() && b.is_finite()) {
                    return a == b;
                }
                (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
            })
    }

    pub fn formatted(&self) -> FormattedNutrients {
        FormattedNutrients {
            calories: format!("{:.2}", self.calories),
            fat: format!("{:.2}", self.fat),
            saturated_fat: format!("{:.2}", self.saturated_fat),
            carbohydrates: format!("{:.2}", self.carbohydrates),
            proteins: format!("{:.2}", self.proteins),
            sodium: format!("{:.2}", self.sodium),
            sugars: format!("{:.2}", self.sugars),
        }
    }
}

impl Add for NutrientRecord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_with(&rhs, |a, b| a + b)
    }
}

impl Sub for NutrientRecord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_with(&rhs, |a, b| a - b)
    }
}

impl Neg for NutrientRecord {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|v| -v)
    }
}

impl Sum for NutrientRecord {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, r| acc + r)
    }
}

impl<'a> Sum<&'a NutrientRecord> for NutrientRecord {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, r| acc + *r)
    }
}

/// Display copy of a record, every value rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedNutrients {
    pub calories: String,
    pub fat: String,
    pub saturated_fat: String,
    pub carbohydrates: String,
    pub proteins: String,
    pub sodium: String,
    pub sugars: String,
}
