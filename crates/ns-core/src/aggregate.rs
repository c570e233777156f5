//! Daily aggregation of food entries.
//!
//! Two views are derived from a snapshot of entries:
//! - [`build_daily_totals`]: calorie and macro sums for one day window
//! - [`group_by_day`]: a flat row sequence with one header per calendar day
//!
//! Both are recomputed from scratch on every call.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{Category, FoodEntry};

/// Calorie sums per meal category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub breakfast: i64,
    pub lunch: i64,
    pub dinner: i64,
    pub snack: i64,
}

impl CategoryTotals {
    /// Calories logged for `category`.
    pub const fn get(&self, category: Category) -> i64 {
        match category {
            Category::Breakfast => self.breakfast,
            Category::Lunch => self.lunch,
            Category::Dinner => self.dinner,
            Category::Snack => self.snack,
        }
    }

    const fn slot(&mut self, category: Category) -> &mut i64 {
        match category {
            Category::Breakfast => &mut self.breakfast,
            Category::Lunch => &mut self.lunch,
            Category::Dinner => &mut self.dinner,
            Category::Snack => &mut self.snack,
        }
    }
}

/// Totals for a single day window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DayTotals {
    pub total_calories: i64,
    pub total_protein: f64,
    pub total_fat: f64,
    pub total_carbs: f64,
    pub by_category: CategoryTotals,
}

impl DayTotals {
    fn add(mut self, entry: &FoodEntry) -> Self {
        let calories = i64::from(entry.calories);
        self.total_calories += calories;
        self.total_protein += entry.protein.unwrap_or(0.0);
        self.total_fat += entry.fat.unwrap_or(0.0);
        self.total_carbs += entry.carbs.unwrap_or(0.0);
        *self.by_category.slot(entry.category) += calories;
        self
    }
}

/// Sums entries whose timestamp lies in `[window_start, window_end]`.
///
/// Entries outside the window are ignored, so an inverted window
/// (`window_end < window_start`) yields all zeros.
pub fn build_daily_totals(entries: &[FoodEntry], window_start: i64, window_end: i64) -> DayTotals {
    let window = window_start..=window_end;
    entries
        .iter()
        .filter(|entry| window.contains(&entry.timestamp_millis))
        .fold(DayTotals::default(), DayTotals::add)
}

/// Language used for day header labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelLocale {
    /// "Today", "Yesterday", "3 March".
    #[default]
    En,
    /// "Hoy", "Ayer", "3 de marzo".
    Es,
}

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

impl LabelLocale {
    /// Header label for `day`, relative to `today`.
    pub fn day_label(self, day: NaiveDate, today: NaiveDate) -> String {
        if day == today {
            return self.today().to_string();
        }
        if today.pred_opt() == Some(day) {
            return self.yesterday().to_string();
        }
        match self {
            Self::En => day.format("%-d %B").to_string(),
            Self::Es => format!("{} de {}", day.day(), MONTHS_ES[day.month0() as usize]),
        }
    }

    const fn today(self) -> &'static str {
        match self {
            Self::En => "Today",
            Self::Es => "Hoy",
        }
    }

    const fn yesterday(self) -> &'static str {
        match self {
            Self::En => "Yesterday",
            Self::Es => "Ayer",
        }
    }
}

/// A row in the day-grouped log view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogRow<'a> {
    /// Starts the rows of one calendar day.
    DayHeader { label: String },
    /// A single logged entry.
    Entry { entry: &'a FoodEntry },
}

/// Calendar day of an epoch-millisecond timestamp in `tz`.
fn calendar_day<Tz: TimeZone>(timestamp_millis: i64, tz: &Tz) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or_default()
        .with_timezone(tz)
        .date_naive()
}

/// Groups entries into day headers followed by that day's entries.
///
/// `entries` must already be ordered by timestamp, most recent first; the
/// order is preserved as-is. A header is emitted whenever an entry falls on a
/// different calendar day than the previous header.
pub fn group_by_day<'a, Tz: TimeZone>(
    entries: &'a [FoodEntry],
    today: NaiveDate,
    tz: &Tz,
    locale: LabelLocale,
) -> Vec<LogRow<'a>> {
    let (rows, _) = entries.iter().fold(
        (Vec::with_capacity(entries.len() + 1), None::<NaiveDate>),
        |(mut rows, last_header), entry| {
            let day = calendar_day(entry.timestamp_millis, tz);
            if last_header != Some(day) {
                rows.push(LogRow::DayHeader {
                    label: locale.day_label(day, today),
                });
            }
            rows.push(LogRow::Entry { entry });
            (rows, Some(day))
        },
    );
    rows
}

/// [`group_by_day`] in the process-local time zone, relative to the current date.
pub fn group_by_day_local(entries: &[FoodEntry], locale: LabelLocale) -> Vec<LogRow<'_>> {
    group_by_day(entries, Local::now().date_naive(), &Local, locale)
}
