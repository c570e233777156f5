//! Logged food entries and meal categories.

use serde::{Deserialize, Serialize};

use crate::ValidationError;

define_str_enum!(
    /// Meal a food entry belongs to.
    ///
    /// The Spanish labels used by earlier exports (`Desayuno`, `Comida`, `Cena`)
    /// are accepted as aliases when parsing.
    Category, "meal category" {
        Breakfast => "breakfast" | "desayuno",
        Lunch => "lunch" | "comida",
        Dinner => "dinner" | "cena",
        Snack => "snack",
    }
);

impl Category {
    /// Human-readable label for display.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snack => "Snack",
        }
    }
}

/// A persisted food log entry.
///
/// Nutrient values are totals for the logged quantity, not per-100g values.
/// Use [`Per100g::scale`](crate::Per100g::scale) to convert reference values
/// before building an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    /// Store-assigned identifier.
    pub id: i64,
    pub name: String,
    pub quantity_grams: f64,
    pub category: Category,
    pub calories: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    /// Creation time in epoch milliseconds.
    pub timestamp_millis: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl FoodEntry {
    /// Checks the fields required before an entry may be saved.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.quantity_grams, self.calories)?;
        validate_macros(self.protein, self.fat, self.carbs)
    }
}

/// A food entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFoodEntry {
    pub name: String,
    pub quantity_grams: f64,
    pub category: Category,
    pub calories: u32,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub timestamp_millis: i64,
    pub image_path: Option<String>,
}

impl NewFoodEntry {
    /// Checks the fields required before an entry may be saved.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.quantity_grams, self.calories)?;
        validate_macros(self.protein, self.fat, self.carbs)
    }

    /// Attaches a store-assigned ID.
    #[must_use]
    pub fn with_id(self, id: i64) -> FoodEntry {
        FoodEntry {
            id,
            name: self.name,
            quantity_grams: self.quantity_grams,
            category: self.category,
            calories: self.calories,
            protein: self.protein,
            fat: self.fat,
            carbs: self.carbs,
            timestamp_millis: self.timestamp_millis,
            image_path: self.image_path,
        }
    }
}

fn validate_fields(name: &str, quantity_grams: f64, calories: u32) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Empty { field: "name" });
    }
    // Written as a negated comparison so NaN is rejected too.
    if !(quantity_grams > 0.0) {
        return Err(ValidationError::NotPositive {
            field: "quantity",
            value: quantity_grams,
        });
    }
    if !quantity_grams.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "quantity",
            value: quantity_grams,
        });
    }
    if calories == 0 {
        return Err(ValidationError::NotPositive {
            field: "calories",
            value: 0.0,
        });
    }
    Ok(())
}

/// Macros are optional, but a present value must be a finite gram count.
fn validate_macros(
    protein: Option<f64>,
    fat: Option<f64>,
    carbs: Option<f64>,
) -> Result<(), ValidationError> {
    for (field, value) in [("protein", protein), ("fat", fat), ("carbs", carbs)] {
        let Some(value) = value else { continue };
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
        if value < 0.0 {
            return Err(ValidationError::Negative { field, value });
        }
    }
    Ok(())
}
