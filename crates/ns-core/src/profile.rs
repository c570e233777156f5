//! The single user profile used for goal calculation.

use serde::{Deserialize, Serialize};

define_str_enum!(
    /// Biological sex used by the BMR formula.
    #[derive(Default)]
    Sex, "sex" {
        #[default]
        Male => "male",
        Female => "female",
    }
);

define_str_enum!(
    /// Self-reported activity level.
    #[derive(Default)]
    ActivityLevel, "activity level" {
        /// Little or no exercise.
        Sedentary => "sedentary",
        /// Light exercise 1-3 days a week.
        #[default]
        Light => "light",
        /// Moderate exercise 3-5 days a week.
        Moderate => "moderate",
        /// Hard exercise 6-7 days a week.
        Active => "active",
    }
);

define_str_enum!(
    /// Direction the user wants their weight to move.
    #[derive(Default)]
    GoalDirection, "goal" {
        Lose => "lose",
        #[default]
        Maintain => "maintain",
        Gain => "gain",
    }
);

impl ActivityLevel {
    /// TDEE multiplier applied to the basal metabolic rate.
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
        }
    }
}

impl GoalDirection {
    /// Daily calorie adjustment applied on top of TDEE.
    #[must_use]
    pub const fn adjustment_kcal(&self) -> f64 {
        match self {
            Self::Lose => -500.0,
            Self::Maintain => 0.0,
            Self::Gain => 500.0,
        }
    }
}

/// Body measurements and preferences.
///
/// The default profile is deliberately incomplete (zero age, height and
/// weight) so that goal calculation falls back to
/// [`DEFAULT_GOAL`](crate::DEFAULT_GOAL) until the user fills it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub sex: Sex,
    pub age_years: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal_direction: GoalDirection,
}

impl UserProfile {
    /// Whether every measurement needed by the BMR formula is present.
    pub fn is_complete(&self) -> bool {
        self.age_years > 0 && self.height_cm > 0.0 && self.weight_kg > 0.0
    }
}
