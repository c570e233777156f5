//! Home-screen widget snapshot.
//!
//! The widget reads a small JSON file with today's totals. It is rewritten
//! whenever `ns today` runs.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ns_core::DayTotals;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSnapshot {
    pub total_calories: i64,
    pub goal_calories: i32,
    /// Grams, truncated toward zero.
    pub protein: i64,
    pub fat: i64,
    pub carbs: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl WidgetSnapshot {
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(totals: &DayTotals, goal_calories: i32, updated_at: i64) -> Self {
        Self {
            total_calories: totals.total_calories,
            goal_calories,
            protein: totals.total_protein.trunc() as i64,
            fat: totals.total_fat.trunc() as i64,
            carbs: totals.total_carbs.trunc() as i64,
            updated_at,
        }
    }
}

/// Atomically replaces the snapshot at `path`.
pub fn write_snapshot(path: &Path, snapshot: &WidgetSnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_vec_pretty(snapshot)?;
    std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err)
            .with_context(|| format!("failed to move snapshot into {}", path.display()));
    }
    Ok(())
}

/// Writes the snapshot, logging instead of failing.
pub fn publish(path: &Path, snapshot: &WidgetSnapshot) {
    match write_snapshot(path, snapshot) {
        Ok(()) => tracing::debug!(path = %path.display(), "widget snapshot published"),
        Err(err) => {
            let error = format!("{err:#}");
            tracing::warn!(path = %path.display(), %error, "failed to publish widget snapshot");
        }
    }
}
