//! Log command: every entry grouped under day headers.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{Local, TimeZone};
use ns_core::{LabelLocale, LogRow, group_by_day_local};
use ns_db::Database;

use super::util::entry_line;

/// Format grouped rows for human-readable output.
pub fn format_rows<Tz: TimeZone>(rows: &[LogRow<'_>], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut output = String::new();
    if rows.is_empty() {
        writeln!(output, "No entries logged yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Run 'ns add <name> --grams <g> --category <meal> --calories <kcal>' to log food."
        )
        .unwrap();
        return output;
    }

    for (i, row) in rows.iter().enumerate() {
        match row {
            LogRow::DayHeader { label } => {
                if i > 0 {
                    writeln!(output).unwrap();
                }
                writeln!(output, "{label}").unwrap();
            }
            LogRow::Entry { entry } => {
                writeln!(output, "  {}", entry_line(entry, tz)).unwrap();
            }
        }
    }
    output
}

pub fn run<W: Write>(writer: &mut W, db: &Database, locale: LabelLocale, json: bool) -> Result<()> {
    let entries = db.list_entries()?;
    let rows = group_by_day_local(&entries, locale);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
    } else {
        write!(writer, "{}", format_rows(&rows, &Local))?;
    }
    Ok(())
}
