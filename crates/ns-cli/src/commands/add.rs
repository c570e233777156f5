//! Add command for logging a food entry.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use ns_core::{Category, Per100g, ScaledNutrients};
use ns_db::Database;

use super::util::{build_entry, parse_timestamp};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Food name.
    pub name: String,

    /// Quantity eaten, in grams.
    #[arg(short, long)]
    pub grams: f64,

    /// Meal category (breakfast, lunch, dinner, snack).
    #[arg(long)]
    pub category: Category,

    /// Calories (kcal) for the whole portion.
    #[arg(long)]
    pub calories: f64,

    /// Protein in grams.
    #[arg(long)]
    pub protein: Option<f64>,

    /// Fat in grams.
    #[arg(long)]
    pub fat: Option<f64>,

    /// Carbohydrates in grams.
    #[arg(long)]
    pub carbs: Option<f64>,

    /// Treat nutrient values as per 100 g and scale them to --grams.
    #[arg(long)]
    pub per_100g: bool,

    /// Photo of the meal.
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// When the food was eaten (RFC 3339 or 'YYYY-MM-DD HH:MM'); defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

impl AddArgs {
    fn nutrients(&self) -> Option<ScaledNutrients> {
        if self.per_100g {
            Per100g {
                calories: Some(self.calories),
                protein: self.protein,
                fat: self.fat,
                carbs: self.carbs,
            }
            .scale(self.grams)
        } else {
            Some(ScaledNutrients::from_totals(
                self.calories,
                self.protein,
                self.fat,
                self.carbs,
            ))
        }
    }
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &AddArgs) -> Result<()> {
    let timestamp = match &args.at {
        Some(at) => parse_timestamp(at)?,
        None => Utc::now().timestamp_millis(),
    };
    let nutrients = args
        .nutrients()
        .with_context(|| format!("quantity must be positive, got {}", args.grams))?;
    let entry = build_entry(
        &args.name,
        args.grams,
        args.category,
        nutrients,
        args.image.as_deref(),
        timestamp,
    )?;

    let saved = db.insert_entry(&entry).context("failed to save entry")?;
    tracing::info!(id = saved.id, "entry added");
    writeln!(
        writer,
        "Added #{}: {} ({:.0} g, {}) {} kcal",
        saved.id,
        saved.name,
        saved.quantity_grams,
        saved.category.label(),
        saved.calories
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn args(name: &str, grams: f64, calories: f64) -> AddArgs {
        AddArgs {
            name: name.to_string(),
            grams,
            category: Category::Breakfast,
            calories,
            protein: Some(8.0),
            fat: None,
            carbs: Some(12.5),
            per_100g: false,
            image: None,
            at: Some("2025-03-12T08:00:00Z".to_string()),
        }
    }

    #[test]
    fn add_stores_totals_as_given() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();

        run(&mut output, &mut db, &args("Yogurt", 150.0, 180.4)).unwrap();

        let entries = db.list_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].calories, 180);
        assert_eq!(entries[0].protein, Some(8.0));
        assert_eq!(entries[0].timestamp_millis, 1_741_766_400_000);
        assert_snapshot!(
            String::from_utf8(output).unwrap(),
            @"Added #1: Yogurt (150 g, Breakfast) 180 kcal"
        );
    }

    #[test]
    fn add_scales_per_100g_values() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let per_100g = AddArgs {
            per_100g: true,
            calories: 250.0,
            ..args("Yogurt", 150.0, 0.0)
        };

        run(&mut output, &mut db, &per_100g).unwrap();

        let entry = &db.list_entries().unwrap()[0];
        assert_eq!(entry.calories, 375);
        assert!((entry.protein.unwrap() - 12.0).abs() < 1e-9);
        assert!((entry.carbs.unwrap() - 18.75).abs() < 1e-9);
    }

    #[test]
    fn add_rejects_zero_calories() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let err = run(&mut output, &mut db, &args("Water", 250.0, 0.0)).unwrap_err();
        assert!(err.to_string().contains("calories must be positive"));
        assert!(db.list_entries().unwrap().is_empty());
    }

    #[test]
    fn add_rejects_non_positive_grams_when_scaling() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let bad = AddArgs {
            per_100g: true,
            ..args("Yogurt", 0.0, 250.0)
        };
        let err = run(&mut output, &mut db, &bad).unwrap_err();
        assert!(err.to_string().contains("quantity must be positive"));
    }

    #[test]
    fn add_rejects_negative_macros() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let bad = AddArgs {
            protein: Some(-50.0),
            ..args("Shake", 300.0, 200.0)
        };
        let err = run(&mut output, &mut db, &bad).unwrap_err();
        assert!(err.to_string().contains("protein must not be negative"));
        assert!(db.list_entries().unwrap().is_empty());
    }
}
