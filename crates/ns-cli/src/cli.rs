//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ns_core::Category;

use crate::commands::add::AddArgs;
use crate::commands::edit::EditArgs;
use crate::commands::lookup::{AnalyzeArgs, ScanArgs, SearchArgs};
use crate::commands::profile::ProfileArgs;

/// Calorie and macro tracker.
///
/// Logs meals, totals the current day against a personal calorie goal, and
/// looks foods up by barcode, by name, or from a photo.
#[derive(Debug, Parser)]
#[command(name = "ns", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log a food entry.
    Add(AddArgs),

    /// Change fields of a logged entry.
    Edit(EditArgs),

    /// Delete a logged entry.
    Delete {
        /// Entry ID.
        id: i64,
    },

    /// Show every entry grouped by day, most recent first.
    Log {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show today's totals against the calorie goal.
    Today {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show today's entries for one meal.
    Meal {
        /// Meal category (breakfast, lunch, dinner, snack).
        category: Category,
    },

    /// Show or update the body profile used for the calorie goal.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Print the daily calorie goal.
    Goal,

    /// Print the end-of-day reminder for today.
    Remind,

    /// Look up a packaged food by barcode.
    Scan(ScanArgs),

    /// Search foods by name.
    Search(SearchArgs),

    /// Estimate nutrients from a food photo.
    Analyze(AnalyzeArgs),
}

/// Profile subcommands.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// Show the stored profile.
    Show {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Update profile fields and finish onboarding.
    Set(ProfileArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_meal_category_alias() {
        let cli = Cli::try_parse_from(["ns", "meal", "Desayuno"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Meal {
                category: Category::Breakfast
            })
        ));
    }

    #[test]
    fn rejects_unknown_meal_category() {
        assert!(Cli::try_parse_from(["ns", "meal", "brunch"]).is_err());
    }
}
