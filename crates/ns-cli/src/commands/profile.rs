//! Profile, goal, and reminder commands.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;
use ns_core::{
    ActivityLevel, DEFAULT_GOAL, GoalDirection, Sex, UserProfile, build_daily_totals,
    compute_goal, daily_reminder, today_window,
};
use ns_db::Database;

/// Profile fields to change; anything omitted keeps its stored value.
#[derive(Debug, Default, Args)]
pub struct ProfileArgs {
    /// male or female.
    #[arg(long)]
    pub sex: Option<Sex>,

    /// Age in years.
    #[arg(long)]
    pub age: Option<u32>,

    /// Height in centimetres.
    #[arg(long)]
    pub height: Option<f64>,

    /// Weight in kilograms.
    #[arg(long)]
    pub weight: Option<f64>,

    /// sedentary, light, moderate, or active.
    #[arg(long)]
    pub activity: Option<ActivityLevel>,

    /// lose, maintain, or gain.
    #[arg(long)]
    pub goal: Option<GoalDirection>,
}

impl ProfileArgs {
    fn apply(&self, profile: UserProfile) -> UserProfile {
        UserProfile {
            sex: self.sex.unwrap_or(profile.sex),
            age_years: self.age.unwrap_or(profile.age_years),
            height_cm: self.height.unwrap_or(profile.height_cm),
            weight_kg: self.weight.unwrap_or(profile.weight_kg),
            activity_level: self.activity.unwrap_or(profile.activity_level),
            goal_direction: self.goal.unwrap_or(profile.goal_direction),
        }
    }
}

/// Format a profile for human-readable output.
pub fn format_profile(profile: &UserProfile, onboarded: bool) -> String {
    let mut output = String::new();
    writeln!(output, "Sex:       {}", profile.sex).unwrap();
    writeln!(output, "Age:       {} years", profile.age_years).unwrap();
    writeln!(output, "Height:    {:.1} cm", profile.height_cm).unwrap();
    writeln!(output, "Weight:    {:.1} kg", profile.weight_kg).unwrap();
    writeln!(output, "Activity:  {}", profile.activity_level).unwrap();
    writeln!(output, "Goal:      {}", profile.goal_direction).unwrap();
    writeln!(output, "Daily goal: {} kcal", compute_goal(profile)).unwrap();
    if !onboarded {
        writeln!(output).unwrap();
        writeln!(
            output,
            "Tip: Run 'ns profile set --sex <s> --age <y> --height <cm> --weight <kg>' to finish setup."
        )
        .unwrap();
    }
    output
}

pub fn show<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let profile = db.profile()?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&profile)?)?;
    } else {
        write!(writer, "{}", format_profile(&profile, db.onboarding_complete()?))?;
    }
    Ok(())
}

pub fn set<W: Write>(writer: &mut W, db: &mut Database, args: &ProfileArgs) -> Result<()> {
    let profile = args.apply(db.profile()?);
    for (field, value) in [("height", profile.height_cm), ("weight", profile.weight_kg)] {
        if !value.is_finite() || value < 0.0 {
            bail!("{field} must be a non-negative number, got {value}");
        }
    }

    db.save_profile(&profile)?;
    db.complete_onboarding()?;
    tracing::info!(?profile, "profile updated");

    let goal = compute_goal(&profile);
    if profile.is_complete() {
        writeln!(writer, "Profile saved. Daily goal: {goal} kcal")?;
    } else {
        writeln!(
            writer,
            "Profile saved, but age, height, and weight are all needed; \
             using the default goal of {goal} kcal."
        )?;
    }
    Ok(())
}

pub fn goal<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let profile = db.profile()?;
    let goal = compute_goal(&profile);
    if profile.is_complete() {
        writeln!(writer, "Daily goal: {goal} kcal")?;
    } else {
        writeln!(writer, "Daily goal: {DEFAULT_GOAL} kcal (default; profile incomplete)")?;
    }
    Ok(())
}

pub fn remind<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let (start, end) = today_window();
    let entries = db.list_entries_in_range(start, end)?;
    let consumed = build_daily_totals(&entries, start, end).total_calories;
    let goal = compute_goal(&db.profile()?);

    let reminder = daily_reminder(goal, consumed);
    tracing::debug!(goal, consumed, "built reminder");
    writeln!(writer, "{}", reminder.title)?;
    writeln!(writer, "{}", reminder.message)?;
    Ok(())
}
