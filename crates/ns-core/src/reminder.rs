//! End-of-day reminder text.

use serde::Serialize;

/// Reminder title and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub title: String,
    pub message: String,
}

/// Builds the reminder for a day where `consumed` kcal were logged against `goal`.
pub fn daily_reminder(goal: i32, consumed: i64) -> Reminder {
    let remaining = i64::from(goal) - consumed;
    if remaining > 0 {
        Reminder {
            title: "NutriScan: don't forget dinner!".to_string(),
            message: format!("You still have {remaining} kcal left to reach today's goal."),
        }
    } else {
        Reminder {
            title: "Goal reached!".to_string(),
            message: "You've reached today's calorie goal. Keep it up!".to_string(),
        }
    }
}
