//! Daily calorie goal from the Mifflin-St Jeor equation.
//!
//! The goal is computed in three steps:
//! 1. Basal metabolic rate (BMR) from sex, weight, height and age
//! 2. Total daily energy expenditure (TDEE) = BMR x activity multiplier
//! 3. Goal adjustment: -500 kcal to lose, +500 kcal to gain
//!
//! The result is rounded half away from zero. Profiles missing age, height
//! or weight get [`DEFAULT_GOAL`] instead.

use crate::profile::{Sex, UserProfile};

/// Goal returned for incomplete profiles.
pub const DEFAULT_GOAL: i32 = 2000;

/// Basal metabolic rate in kcal/day.
pub fn basal_metabolic_rate(profile: &UserProfile) -> f64 {
    let base = 10.0 * profile.weight_kg + 6.25 * profile.height_cm
        - 5.0 * f64::from(profile.age_years);
    match profile.sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Total daily energy expenditure in kcal/day.
pub fn total_daily_energy_expenditure(profile: &UserProfile) -> f64 {
    basal_metabolic_rate(profile) * profile.activity_level.multiplier()
}

/// Unrounded daily target, or `None` for incomplete profiles.
pub fn target_kcal(profile: &UserProfile) -> Option<f64> {
    if !profile.is_complete() {
        return None;
    }
    Some(total_daily_energy_expenditure(profile) + profile.goal_direction.adjustment_kcal())
}

/// Recommended daily calorie intake.
#[allow(clippy::cast_possible_truncation)]
pub fn compute_goal(profile: &UserProfile) -> i32 {
    target_kcal(profile).map_or(DEFAULT_GOAL, |target| target.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ActivityLevel, GoalDirection};

    fn reference_profile() -> UserProfile {
        UserProfile {
            sex: Sex::Male,
            age_years: 30,
            height_cm: 170.0,
            weight_kg: 70.0,
            activity_level: ActivityLevel::Light,
            goal_direction: GoalDirection::Maintain,
        }
    }

    #[test]
    fn incomplete_profiles_use_default_goal() {
        let cases = [
            UserProfile {
                age_years: 0,
                ..reference_profile()
            },
            UserProfile {
                height_cm: 0.0,
                ..reference_profile()
            },
            UserProfile {
                weight_kg: -3.0,
                ..reference_profile()
            },
            UserProfile::default(),
        ];
        for profile in &cases {
            assert_eq!(compute_goal(profile), DEFAULT_GOAL, "{profile:?}");
        }
    }

    #[test]
    fn reference_male_profile() {
        // BMR = 700 + 1062.5 - 150 + 5 = 1617.5; TDEE = 1617.5 * 1.375 = 2224.0625
        let profile = reference_profile();
        assert!((basal_metabolic_rate(&profile) - 1617.5).abs() < 1e-9);
        assert!((total_daily_energy_expenditure(&profile) - 2224.0625).abs() < 1e-9);
        assert_eq!(compute_goal(&profile), 2224);
    }

    #[test]
    fn female_offset_is_166_below_male() {
        let male = reference_profile();
        let female = UserProfile {
            sex: Sex::Female,
            ..reference_profile()
        };
        let diff = basal_metabolic_rate(&male) - basal_metabolic_rate(&female);
        assert!((diff - 166.0).abs() < 1e-9);
    }

    #[test]
    fn goal_direction_shifts_by_500() {
        let maintain = target_kcal(&reference_profile()).unwrap();
        let lose = target_kcal(&UserProfile {
            goal_direction: GoalDirection::Lose,
            ..reference_profile()
        })
        .unwrap();
        let gain = target_kcal(&UserProfile {
            goal_direction: GoalDirection::Gain,
            ..reference_profile()
        })
        .unwrap();

        assert!((maintain - lose - 500.0).abs() < 1e-9);
        assert!((gain - maintain - 500.0).abs() < 1e-9);
        assert_eq!(
            compute_goal(&UserProfile {
                goal_direction: GoalDirection::Lose,
                ..reference_profile()
            }),
            1724
        );
    }

    #[test]
    fn active_female_losing_weight() {
        let profile = UserProfile {
            sex: Sex::Female,
            age_years: 41,
            height_cm: 162.0,
            weight_kg: 58.5,
            activity_level: ActivityLevel::Active,
            goal_direction: GoalDirection::Lose,
        };
        // BMR = 585 + 1012.5 - 205 - 161 = 1231.5; TDEE = 2124.3375; -500 = 1624.3375
        assert_eq!(compute_goal(&profile), 1624);
    }
}
