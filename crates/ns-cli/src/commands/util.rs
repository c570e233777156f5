//! Shared utilities for CLI commands.

use std::path::Path;

use anyhow::{Context, bail};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use ns_core::{Category, FoodEntry, NewFoodEntry, ScaledNutrients};

/// Parse a timestamp as RFC 3339 or as local `YYYY-MM-DD HH:MM`.
///
/// Returns epoch milliseconds.
pub fn parse_timestamp(s: &str) -> anyhow::Result<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }

    let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M").with_context(|| {
        format!(
            "invalid timestamp: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z) or 'YYYY-MM-DD HH:MM'"
        )
    })?;
    let Some(local) = Local.from_local_datetime(&naive).earliest() else {
        bail!("{s} does not exist in the local time zone");
    };
    Ok(local.timestamp_millis())
}

/// Builds an unsaved entry from portion-level nutrients.
pub fn build_entry(
    name: &str,
    quantity_grams: f64,
    category: Category,
    nutrients: ScaledNutrients,
    image_path: Option<&Path>,
    timestamp_millis: i64,
) -> anyhow::Result<NewFoodEntry> {
    let Some(calories) = nutrients.calories else {
        bail!("no calorie value available for {name}; pass --calories");
    };
    let entry = NewFoodEntry {
        name: name.trim().to_string(),
        quantity_grams,
        category,
        calories,
        protein: nutrients.protein,
        fat: nutrients.fat,
        carbs: nutrients.carbs,
        timestamp_millis,
        image_path: image_path.map(|p| p.display().to_string()),
    };
    entry.validate()?;
    Ok(entry)
}

/// Formats an optional gram value, `-` when missing.
pub fn grams(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |g| format!("{g:.1} g"))
}

/// Local wall-clock time of an entry, `--:--` if out of range.
pub fn clock_time<Tz: TimeZone>(entry: &FoodEntry, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp_millis(entry.timestamp_millis).map_or_else(
        || "--:--".to_string(),
        |dt| dt.with_timezone(tz).format("%H:%M").to_string(),
    )
}

/// One table row for an entry: `#id  HH:MM  name  qty  category  kcal`.
pub fn entry_line<Tz: TimeZone>(entry: &FoodEntry, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    // Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8
    let name = if entry.name.chars().count() > 24 {
        format!("{}...", entry.name.chars().take(21).collect::<String>())
    } else {
        entry.name.clone()
    };
    format!(
        "#{:<5} {}  {:<24}  {:>7.0} g  {:<9}  {:>5} kcal",
        entry.id,
        clock_time(entry, tz),
        name,
        entry.quantity_grams,
        entry.category.label(),
        entry.calories
    )
}
