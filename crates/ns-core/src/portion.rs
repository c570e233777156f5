//! Per-100g reference values and portion scaling.

use serde::{Deserialize, Serialize};

/// Nutrient values per 100 g, as published by food databases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Per100g {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
}

/// Nutrient totals for a concrete portion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScaledNutrients {
    pub calories: Option<u32>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
}

impl Per100g {
    /// Scales the reference values to `quantity_grams`.
    ///
    /// Returns `None` when the quantity is not a positive finite number.
    /// Calories are rounded to whole kcal and clamped at zero; macros keep
    /// their fractional part. Missing values stay missing.
    pub fn scale(&self, quantity_grams: f64) -> Option<ScaledNutrients> {
        if !quantity_grams.is_finite() || quantity_grams <= 0.0 {
            return None;
        }
        let factor = quantity_grams / 100.0;
        Some(ScaledNutrients {
            calories: self.calories.map(|kcal| round_kcal(kcal * factor)),
            protein: self.protein.map(|g| g * factor),
            fat: self.fat.map(|g| g * factor),
            carbs: self.carbs.map(|g| g * factor),
        })
    }
}

impl ScaledNutrients {
    /// Entry-level values from totals the user already knows.
    pub fn from_totals(
        calories: f64,
        protein: Option<f64>,
        fat: Option<f64>,
        carbs: Option<f64>,
    ) -> Self {
        Self {
            calories: Some(round_kcal(calories)),
            protein,
            fat,
            carbs,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_kcal(kcal: f64) -> u32 {
    if kcal.is_nan() {
        return 0;
    }
    kcal.round().clamp(0.0, f64::from(u32::MAX)) as u32
}
