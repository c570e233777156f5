//! Edit and delete commands for logged entries.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use ns_core::{Category, FoodEntry};
use ns_db::Database;

/// Fields to change; anything omitted keeps its stored value.
#[derive(Debug, Default, Args)]
pub struct EditArgs {
    /// Entry ID.
    pub id: i64,

    #[arg(long)]
    pub name: Option<String>,

    /// Quantity in grams.
    #[arg(short, long)]
    pub grams: Option<f64>,

    #[arg(long)]
    pub category: Option<Category>,

    /// Calories (kcal) for the whole portion.
    #[arg(long)]
    pub calories: Option<u32>,

    #[arg(long)]
    pub protein: Option<f64>,

    #[arg(long)]
    pub fat: Option<f64>,

    #[arg(long)]
    pub carbs: Option<f64>,

    #[arg(long)]
    pub image: Option<PathBuf>,
}

impl EditArgs {
    fn apply(&self, entry: FoodEntry) -> FoodEntry {
        FoodEntry {
            name: self
                .name
                .as_ref()
                .map_or(entry.name, |n| n.trim().to_string()),
            quantity_grams: self.grams.unwrap_or(entry.quantity_grams),
            category: self.category.unwrap_or(entry.category),
            calories: self.calories.unwrap_or(entry.calories),
            protein: self.protein.or(entry.protein),
            fat: self.fat.or(entry.fat),
            carbs: self.carbs.or(entry.carbs),
            image_path: self
                .image
                .as_ref()
                .map(|p| p.display().to_string())
                .or(entry.image_path),
            ..entry
        }
    }
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &EditArgs) -> Result<()> {
    let Some(stored) = db.get_entry(args.id)? else {
        bail!("entry not found: {}", args.id);
    };
    let updated = args.apply(stored);
    if !db.update_entry(&updated).context("failed to save entry")? {
        bail!("entry not found: {}", args.id);
    }
    tracing::info!(id = updated.id, "entry updated");
    writeln!(
        writer,
        "Updated #{}: {} ({:.0} g, {}) {} kcal",
        updated.id,
        updated.name,
        updated.quantity_grams,
        updated.category.label(),
        updated.calories
    )?;
    Ok(())
}

pub fn delete<W: Write>(writer: &mut W, db: &mut Database, id: i64) -> Result<()> {
    if !db.delete_entry(id)? {
        bail!("entry not found: {id}");
    }
    tracing::info!(id, "entry deleted");
    writeln!(writer, "Deleted #{id}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use ns_core::NewFoodEntry;

    fn seeded() -> (Database, FoodEntry) {
        let mut db = Database::open_in_memory().unwrap();
        let entry = db
            .insert_entry(&NewFoodEntry {
                name: "Toast".to_string(),
                quantity_grams: 60.0,
                category: Category::Breakfast,
                calories: 160,
                protein: Some(5.0),
                fat: Some(2.0),
                carbs: None,
                timestamp_millis: 1_741_766_400_000,
                image_path: None,
            })
            .unwrap();
        (db, entry)
    }

    #[test]
    fn edit_overrides_only_given_fields() {
        let (mut db, entry) = seeded();
        let mut output = Vec::new();
        let args = EditArgs {
            id: entry.id,
            grams: Some(90.0),
            calories: Some(240),
            category: Some(Category::Snack),
            ..EditArgs::default()
        };

        run(&mut output, &mut db, &args).unwrap();

        let stored = db.get_entry(entry.id).unwrap().unwrap();
        assert_eq!(stored.name, "Toast");
        assert_eq!(stored.quantity_grams, 90.0);
        assert_eq!(stored.calories, 240);
        assert_eq!(stored.category, Category::Snack);
        assert_eq!(stored.protein, Some(5.0));
        assert_eq!(stored.timestamp_millis, entry.timestamp_millis);
        assert_snapshot!(
            String::from_utf8(output).unwrap(),
            @"Updated #1: Toast (90 g, Snack) 240 kcal"
        );
    }

    #[test]
    fn edit_rejects_invalid_values() {
        let (mut db, entry) = seeded();
        let mut output = Vec::new();
        let args = EditArgs {
            id: entry.id,
            name: Some("  ".to_string()),
            ..EditArgs::default()
        };
        let err = run(&mut output, &mut db, &args).unwrap_err();
        assert!(format!("{err:#}").contains("name cannot be empty"));
        assert_eq!(db.get_entry(entry.id).unwrap().unwrap().name, "Toast");
    }

    #[test]
    fn edit_missing_entry_fails() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let args = EditArgs {
            id: 99,
            ..EditArgs::default()
        };
        let err = run(&mut output, &mut db, &args).unwrap_err();
        assert!(err.to_string().contains("entry not found: 99"));
    }

    #[test]
    fn delete_removes_entry() {
        let (mut db, entry) = seeded();
        let mut output = Vec::new();
        delete(&mut output, &mut db, entry.id).unwrap();
        assert!(db.get_entry(entry.id).unwrap().is_none());
        assert_snapshot!(String::from_utf8(output).unwrap(), @"Deleted #1");

        let err = delete(&mut Vec::new(), &mut db, entry.id).unwrap_err();
        assert!(err.to_string().contains("entry not found"));
    }
}
