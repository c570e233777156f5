//! Core domain logic for the nutrition tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Food entries and meal categories
//! - Daily aggregation: per-day totals and day-grouped log rows
//! - Goal calculation: Mifflin-St Jeor based daily calorie targets
//! - Portion scaling from per-100g reference values
//!
//! Everything here is pure: no I/O, no shared state.

/// Generates a fieldless enum with a canonical lower-case string form,
/// optional parse aliases, and string-based serde impls.
macro_rules! define_str_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $canonical:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// String representation for storage and serialization.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $canonical,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($canonical $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err($crate::ValidationError::UnknownVariant {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let s = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub mod aggregate;
pub mod entry;
mod error;
pub mod goal;
pub mod portion;
pub mod profile;
pub mod reminder;
pub mod window;

pub use aggregate::{
    CategoryTotals, DayTotals, LabelLocale, LogRow, build_daily_totals, group_by_day,
    group_by_day_local,
};
pub use entry::{Category, FoodEntry, NewFoodEntry};
pub use error::ValidationError;
pub use goal::{DEFAULT_GOAL, compute_goal};
pub use portion::{Per100g, ScaledNutrients};
pub use profile::{ActivityLevel, GoalDirection, Sex, UserProfile};
pub use reminder::{Reminder, daily_reminder};
pub use window::{day_window, local_day_window, today_window};
