//! Meal command: today's entries for one category.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{Local, NaiveDate, TimeZone};
use ns_core::{Category, FoodEntry, day_window};
use ns_db::Database;

use super::util::{entry_line, grams};

/// Format one meal's entries with a subtotal.
pub fn format_meal<Tz: TimeZone>(category: Category, entries: &[FoodEntry], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut output = String::new();
    writeln!(output, "{} today", category.label()).unwrap();

    if entries.is_empty() {
        writeln!(output, "Nothing logged.").unwrap();
        return output;
    }

    for entry in entries {
        writeln!(output, "  {}", entry_line(entry, tz)).unwrap();
        writeln!(
            output,
            "         protein {}  fat {}  carbs {}",
            grams(entry.protein),
            grams(entry.fat),
            grams(entry.carbs)
        )
        .unwrap();
    }

    let total: i64 = entries.iter().map(|e| i64::from(e.calories)).sum();
    writeln!(output, "Total: {total} kcal").unwrap();
    output
}

/// Entries of `category` within `day`, most recent first.
pub fn meal_entries<Tz: TimeZone>(
    db: &Database,
    category: Category,
    day: NaiveDate,
    tz: &Tz,
) -> Result<Vec<FoodEntry>> {
    let (start, end) = day_window(day, tz);
    Ok(db.list_entries_by_category_in_range(category, start, end)?)
}

pub fn run<W: Write>(writer: &mut W, db: &Database, category: Category) -> Result<()> {
    let entries = meal_entries(db, category, Local::now().date_naive(), &Local)?;
    write!(writer, "{}", format_meal(category, &entries, &Local))?;
    Ok(())
}
