//! Today command: the current day's totals against the calorie goal.
//!
//! Also refreshes the widget snapshot, since this is the moment fresh
//! totals are known.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{Local, NaiveDate, TimeZone, Utc};
use ns_core::{Category, DayTotals, build_daily_totals, compute_goal, day_window};
use ns_db::Database;
use serde::Serialize;

use crate::widget::{self, WidgetSnapshot};

/// Totals for one day together with the goal they are measured against.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub goal_calories: i32,
    /// True when the profile is incomplete and the fallback goal applies.
    pub default_goal: bool,
    /// Negative once the goal is exceeded.
    pub remaining_calories: i64,
    #[serde(flatten)]
    pub totals: DayTotals,
}

/// Loads the day's entries and profile and builds the summary.
pub fn summarize<Tz: TimeZone>(db: &Database, day: NaiveDate, tz: &Tz) -> Result<DaySummary> {
    let (start, end) = day_window(day, tz);
    let entries = db.list_entries_in_range(start, end)?;
    let totals = build_daily_totals(&entries, start, end);
    let profile = db.profile()?;
    let goal_calories = compute_goal(&profile);
    Ok(DaySummary {
        date: day,
        goal_calories,
        default_goal: !profile.is_complete(),
        remaining_calories: i64::from(goal_calories) - totals.total_calories,
        totals,
    })
}

/// Format a summary for human-readable output.
pub fn format_summary(summary: &DaySummary) -> String {
    let mut output = String::new();
    let totals = &summary.totals;

    writeln!(output, "Today ({})", summary.date.format("%Y-%m-%d")).unwrap();
    let balance = if summary.remaining_calories >= 0 {
        format!("{} remaining", summary.remaining_calories)
    } else {
        format!("{} over", -summary.remaining_calories)
    };
    writeln!(
        output,
        "Calories: {} / {} kcal ({balance})",
        totals.total_calories, summary.goal_calories
    )
    .unwrap();
    writeln!(
        output,
        "Protein: {:.1} g  Fat: {:.1} g  Carbs: {:.1} g",
        totals.total_protein, totals.total_fat, totals.total_carbs
    )
    .unwrap();
    writeln!(output).unwrap();

    for category in Category::ALL {
        writeln!(
            output,
            "{:<10} {:>6} kcal",
            category.label(),
            totals.by_category.get(*category)
        )
        .unwrap();
    }

    if summary.default_goal {
        writeln!(output).unwrap();
        writeln!(
            output,
            "Tip: Using the default goal. Run 'ns profile set' to personalize it."
        )
        .unwrap();
    }
    output
}

pub fn run<W: Write>(writer: &mut W, db: &Database, widget_path: &Path, json: bool) -> Result<()> {
    let summary = summarize(db, Local::now().date_naive(), &Local)?;

    let snapshot = WidgetSnapshot::new(
        &summary.totals,
        summary.goal_calories,
        Utc::now().timestamp_millis(),
    );
    widget::publish(widget_path, &snapshot);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        write!(writer, "{}", format_summary(&summary))?;
    }
    Ok(())
}
