//! Storage layer for the nutrition tracker.
//!
//! Provides persistence for food entries and the user profile using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamps
//!
//! Entry timestamps are stored as INTEGER epoch milliseconds, the same unit
//! the aggregation windows use, so range queries compare integers directly.
//!
//! ## Categories and profile enums
//!
//! Stored as their lower-case string forms (e.g. `breakfast`, `moderate`).
//! An unknown category on read is an error; unknown profile values fall back
//! to the field default with a warning.
//!
//! ## Profile
//!
//! `user_profile` holds at most one row (`id = 1`). Reading an unset profile
//! returns [`UserProfile::default`], which is incomplete by construction.

use std::path::Path;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use ns_core::{Category, FoodEntry, NewFoodEntry, UserProfile, ValidationError};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The entry failed validation and was not written.
    #[error("invalid entry: {0}")]
    Validation(#[from] ValidationError),
    /// A stored entry has a category this build does not know.
    #[error("invalid category for entry {entry_id}: {value}")]
    InvalidCategory {
        entry_id: i64,
        value: String,
        #[source]
        source: ValidationError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

const ENTRY_COLUMNS: &str =
    "id, name, quantity_grams, category, calories, protein, fat, carbs, timestamp_ms, image_path";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Food entries: nutrient columns are totals for quantity_grams
            -- timestamp_ms: creation time, epoch milliseconds
            CREATE TABLE IF NOT EXISTS food_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                quantity_grams REAL NOT NULL,
                category TEXT NOT NULL,
                calories INTEGER NOT NULL,
                protein REAL,
                fat REAL,
                carbs REAL,
                timestamp_ms INTEGER NOT NULL,
                image_path TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_food_entries_timestamp ON food_entries(timestamp_ms);
            CREATE INDEX IF NOT EXISTS idx_food_entries_category ON food_entries(category);

            CREATE TABLE IF NOT EXISTS user_profile (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                sex TEXT NOT NULL,
                age_years INTEGER NOT NULL,
                height_cm REAL NOT NULL,
                weight_kg REAL NOT NULL,
                activity_level TEXT NOT NULL,
                goal_direction TEXT NOT NULL,
                onboarding_complete INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    // ========== Food entries ==========

    /// Validates and inserts a new entry, returning it with its assigned ID.
    pub fn insert_entry(&mut self, entry: &NewFoodEntry) -> Result<FoodEntry, DbError> {
        entry.validate()?;
        self.conn.execute(
            "
            INSERT INTO food_entries
            (name, quantity_grams, category, calories, protein, fat, carbs, timestamp_ms, image_path)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                entry.name,
                entry.quantity_grams,
                entry.category.as_str(),
                entry.calories,
                entry.protein,
                entry.fat,
                entry.carbs,
                entry.timestamp_millis,
                entry.image_path,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name = %entry.name, "inserted food entry");
        Ok(entry.clone().with_id(id))
    }

    /// Replaces every field of an existing entry.
    ///
    /// Returns `false` if no entry has the given ID.
    pub fn update_entry(&mut self, entry: &FoodEntry) -> Result<bool, DbError> {
        entry.validate()?;
        let changed = self.conn.execute(
            "
            UPDATE food_entries
            SET name = ?, quantity_grams = ?, category = ?, calories = ?,
                protein = ?, fat = ?, carbs = ?, timestamp_ms = ?, image_path = ?
            WHERE id = ?
            ",
            params![
                entry.name,
                entry.quantity_grams,
                entry.category.as_str(),
                entry.calories,
                entry.protein,
                entry.fat,
                entry.carbs,
                entry.timestamp_millis,
                entry.image_path,
                entry.id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Deletes an entry by ID. Returns `false` if it did not exist.
    pub fn delete_entry(&mut self, id: i64) -> Result<bool, DbError> {
        let changed = self
            .conn
            .execute("DELETE FROM food_entries WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    /// Fetches a single entry.
    pub fn get_entry(&self, id: i64) -> Result<Option<FoodEntry>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM food_entries WHERE id = ?"),
                params![id],
                EntryRow::from_row,
            )
            .optional()?;
        row.map(FoodEntry::try_from).transpose()
    }

    /// Lists all entries, most recent first.
    pub fn list_entries(&self) -> Result<Vec<FoodEntry>, DbError> {
        self.query_entries(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM food_entries ORDER BY timestamp_ms DESC, id DESC"
            ),
            [],
        )
    }

    /// Lists entries with `start <= timestamp <= end`, most recent first.
    pub fn list_entries_in_range(&self, start: i64, end: i64) -> Result<Vec<FoodEntry>, DbError> {
        if end < start {
            return Ok(Vec::new());
        }
        self.query_entries(
            &format!(
                "
                SELECT {ENTRY_COLUMNS}
                FROM food_entries
                WHERE timestamp_ms >= ? AND timestamp_ms <= ?
                ORDER BY timestamp_ms DESC, id DESC
                "
            ),
            params![start, end],
        )
    }

    /// Lists entries of one category within `[start, end]`, most recent first.
    pub fn list_entries_by_category_in_range(
        &self,
        category: Category,
        start: i64,
        end: i64,
    ) -> Result<Vec<FoodEntry>, DbError> {
        if end < start {
            return Ok(Vec::new());
        }
        self.query_entries(
            &format!(
                "
                SELECT {ENTRY_COLUMNS}
                FROM food_entries
                WHERE category = ? AND timestamp_ms >= ? AND timestamp_ms <= ?
                ORDER BY timestamp_ms DESC, id DESC
                "
            ),
            params![category.as_str(), start, end],
        )
    }

    fn query_entries<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<FoodEntry>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, EntryRow::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(FoodEntry::try_from(row?)?);
        }
        Ok(entries)
    }

    // ========== Profile ==========

    /// Returns the stored profile, or the (incomplete) default if none is saved.
    pub fn profile(&self) -> Result<UserProfile, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT sex, age_years, height_cm, weight_kg, activity_level, goal_direction
                FROM user_profile
                WHERE id = 1
                ",
                [],
                |row| {
                    Ok(ProfileRow {
                        sex: row.get(0)?,
                        age_years: row.get(1)?,
                        height_cm: row.get(2)?,
                        weight_kg: row.get(3)?,
                        activity_level: row.get(4)?,
                        goal_direction: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(row.map(ProfileRow::into_profile).unwrap_or_default())
    }

    /// Overwrites the stored profile.
    ///
    /// The onboarding flag is left untouched.
    pub fn save_profile(&mut self, profile: &UserProfile) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO user_profile
            (id, sex, age_years, height_cm, weight_kg, activity_level, goal_direction, updated_at)
            VALUES (1, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                sex = excluded.sex,
                age_years = excluded.age_years,
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                activity_level = excluded.activity_level,
                goal_direction = excluded.goal_direction,
                updated_at = excluded.updated_at
            ",
            params![
                profile.sex.as_str(),
                profile.age_years,
                profile.height_cm,
                profile.weight_kg,
                profile.activity_level.as_str(),
                profile.goal_direction.as_str(),
                now_timestamp(),
            ],
        )?;
        tracing::debug!(?profile, "saved profile");
        Ok(())
    }

    /// Marks onboarding as done, creating a default profile row if needed.
    pub fn complete_onboarding(&mut self) -> Result<(), DbError> {
        let defaults = UserProfile::default();
        self.conn.execute(
            "
            INSERT INTO user_profile
            (id, sex, age_years, height_cm, weight_kg, activity_level, goal_direction,
             onboarding_complete, updated_at)
            VALUES (1, ?, ?, ?, ?, ?, ?, 1, ?)
            ON CONFLICT(id) DO UPDATE SET
                onboarding_complete = 1,
                updated_at = excluded.updated_at
            ",
            params![
                defaults.sex.as_str(),
                defaults.age_years,
                defaults.height_cm,
                defaults.weight_kg,
                defaults.activity_level.as_str(),
                defaults.goal_direction.as_str(),
                now_timestamp(),
            ],
        )?;
        Ok(())
    }

    /// Whether the user has finished onboarding.
    pub fn onboarding_complete(&self) -> Result<bool, DbError> {
        let flag: Option<bool> = self
            .conn
            .query_row(
                "SELECT onboarding_complete FROM user_profile WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(flag.unwrap_or(false))
    }
}

/// Raw entry row before the category string is parsed.
#[derive(Debug)]
struct EntryRow {
    id: i64,
    name: String,
    quantity_grams: f64,
    category: String,
    calories: u32,
    protein: Option<f64>,
    fat: Option<f64>,
    carbs: Option<f64>,
    timestamp_ms: i64,
    image_path: Option<String>,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            quantity_grams: row.get(2)?,
            category: row.get(3)?,
            calories: row.get(4)?,
            protein: row.get(5)?,
            fat: row.get(6)?,
            carbs: row.get(7)?,
            timestamp_ms: row.get(8)?,
            image_path: row.get(9)?,
        })
    }
}

impl TryFrom<EntryRow> for FoodEntry {
    type Error = DbError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse()
            .map_err(|source| DbError::InvalidCategory {
                entry_id: row.id,
                value: row.category.clone(),
                source,
            })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            quantity_grams: row.quantity_grams,
            category,
            calories: row.calories,
            protein: row.protein,
            fat: row.fat,
            carbs: row.carbs,
            timestamp_millis: row.timestamp_ms,
            image_path: row.image_path,
        })
    }
}

#[derive(Debug)]
struct ProfileRow {
    sex: String,
    age_years: u32,
    height_cm: f64,
    weight_kg: f64,
    activity_level: String,
    goal_direction: String,
}

impl ProfileRow {
    fn into_profile(self) -> UserProfile {
        UserProfile {
            sex: parse_or_default(&self.sex, "sex"),
            age_years: self.age_years,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            activity_level: parse_or_default(&self.activity_level, "activity_level"),
            goal_direction: parse_or_default(&self.goal_direction, "goal_direction"),
        }
    }
}

fn parse_or_default<T: FromStr + Default>(value: &str, column: &'static str) -> T {
    value.parse().unwrap_or_else(|_| {
        tracing::warn!(column, value, "unrecognized stored profile value, using default");
        T::default()
    })
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ns_core::{ActivityLevel, GoalDirection, Sex};
    use std::collections::HashSet;

    fn new_entry(
        name: &str,
        category: Category,
        calories: u32,
        timestamp_millis: i64,
    ) -> NewFoodEntry {
        NewFoodEntry {
            name: name.to_string(),
            quantity_grams: 100.0,
            category,
            calories,
            protein: Some(5.0),
            fat: None,
            carbs: Some(20.0),
            timestamp_millis,
            image_path: None,
        }
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .map(Result::unwrap)
            .collect()
    }

    fn index_names(conn: &Connection, table: &str) -> HashSet<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA index_list({table})"))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        assert_eq!(
            table_columns(&db.conn, "food_entries"),
            vec![
                "id",
                "name",
                "quantity_grams",
                "category",
                "calories",
                "protein",
                "fat",
                "carbs",
                "timestamp_ms",
                "image_path",
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "user_profile"),
            vec![
                "id",
                "sex",
                "age_years",
                "height_cm",
                "weight_kg",
                "activity_level",
                "goal_direction",
                "onboarding_complete",
                "updated_at",
            ]
        );

        let indexes = index_names(&db.conn, "food_entries");
        assert!(indexes.contains("idx_food_entries_timestamp"));
        assert!(indexes.contains("idx_food_entries_category"));
    }

    #[test]
    fn reopening_file_database_keeps_entries() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ns.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.insert_entry(&new_entry("Apple", Category::Snack, 80, 1_000))
                .unwrap();
        }
        let db = Database::open(&path).unwrap();
        let entries = db.list_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Apple");
    }

    #[test]
    fn insert_get_update_delete() {
        let mut db = Database::open_in_memory().unwrap();
        let inserted = db
            .insert_entry(&new_entry("Rice", Category::Lunch, 350, 5_000))
            .unwrap();
        assert!(inserted.id > 0);

        let fetched = db.get_entry(inserted.id).unwrap().unwrap();
        assert_eq!(fetched, inserted);

        let edited = FoodEntry {
            name: "Brown rice".to_string(),
            calories: 330,
            fat: Some(2.5),
            ..fetched
        };
        assert!(db.update_entry(&edited).unwrap());
        assert_eq!(db.get_entry(inserted.id).unwrap().unwrap(), edited);

        assert!(db.delete_entry(inserted.id).unwrap());
        assert!(db.get_entry(inserted.id).unwrap().is_none());
        assert!(!db.delete_entry(inserted.id).unwrap());
    }

    #[test]
    fn update_missing_entry_returns_false() {
        let mut db = Database::open_in_memory().unwrap();
        let ghost = new_entry("Ghost", Category::Dinner, 100, 0).with_id(42);
        assert!(!db.update_entry(&ghost).unwrap());
    }

    #[test]
    fn invalid_entries_are_not_written() {
        let mut db = Database::open_in_memory().unwrap();
        let blank = new_entry("  ", Category::Snack, 100, 0);
        assert!(matches!(
            db.insert_entry(&blank),
            Err(DbError::Validation(ValidationError::Empty { field: "name" }))
        ));
        let no_calories = new_entry("Water", Category::Snack, 0, 0);
        assert!(matches!(
            db.insert_entry(&no_calories),
            Err(DbError::Validation(_))
        ));
        assert!(db.list_entries().unwrap().is_empty());
    }

    #[test]
    fn negative_macros_and_infinite_quantity_are_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let negative = NewFoodEntry {
            protein: Some(-50.0),
            fat: Some(-10.0),
            ..new_entry("Shake", Category::Snack, 200, 0)
        };
        assert!(matches!(
            db.insert_entry(&negative),
            Err(DbError::Validation(ValidationError::Negative {
                field: "protein",
                ..
            }))
        ));

        let endless = NewFoodEntry {
            quantity_grams: f64::INFINITY,
            ..new_entry("Soup", Category::Lunch, 200, 0)
        };
        assert!(matches!(
            db.insert_entry(&endless),
            Err(DbError::Validation(ValidationError::NotFinite {
                field: "quantity",
                ..
            }))
        ));
        assert!(db.list_entries().unwrap().is_empty());

        let stored = db
            .insert_entry(&new_entry("Shake", Category::Snack, 200, 0))
            .unwrap();
        let edited = FoodEntry {
            carbs: Some(-5.0),
            ..stored.clone()
        };
        assert!(db.update_entry(&edited).is_err());
        assert_eq!(db.get_entry(stored.id).unwrap(), Some(stored));
    }

    #[test]
    fn list_entries_is_most_recent_first() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entry(&new_entry("a", Category::Breakfast, 100, 1_000))
            .unwrap();
        db.insert_entry(&new_entry("c", Category::Dinner, 100, 3_000))
            .unwrap();
        db.insert_entry(&new_entry("b", Category::Lunch, 100, 2_000))
            .unwrap();
        db.insert_entry(&new_entry("b2", Category::Lunch, 100, 2_000))
            .unwrap();

        let names: Vec<String> = db
            .list_entries()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["c", "b2", "b", "a"]);
    }

    #[test]
    fn range_queries_are_inclusive() {
        let mut db = Database::open_in_memory().unwrap();
        for (name, ts) in [("before", 99), ("start", 100), ("end", 200), ("after", 201)] {
            db.insert_entry(&new_entry(name, Category::Snack, 50, ts))
                .unwrap();
        }

        let names: Vec<String> = db
            .list_entries_in_range(100, 200)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["end", "start"]);
        assert!(db.list_entries_in_range(200, 100).unwrap().is_empty());
    }

    #[test]
    fn category_range_query_filters_category() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entry(&new_entry("eggs", Category::Breakfast, 150, 100))
            .unwrap();
        db.insert_entry(&new_entry("soup", Category::Lunch, 200, 110))
            .unwrap();
        db.insert_entry(&new_entry("toast", Category::Breakfast, 120, 120))
            .unwrap();
        db.insert_entry(&new_entry("old eggs", Category::Breakfast, 150, 10))
            .unwrap();

        let names: Vec<String> = db
            .list_entries_by_category_in_range(Category::Breakfast, 100, 200)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["toast", "eggs"]);
    }

    #[test]
    fn legacy_spanish_categories_are_read() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO food_entries (name, quantity_grams, category, calories, timestamp_ms)
                 VALUES ('Tostada', 50.0, 'Desayuno', 150, 10)",
                [],
            )
            .unwrap();
        let entries = db.list_entries().unwrap();
        assert_eq!(entries[0].category, Category::Breakfast);
    }

    #[test]
    fn unknown_stored_category_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO food_entries (name, quantity_grams, category, calories, timestamp_ms)
                 VALUES ('Mystery', 50.0, 'brunch', 150, 10)",
                [],
            )
            .unwrap();
        let err = db.list_entries().unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidCategory { ref value, .. } if value == "brunch"
        ));
    }

    #[test]
    fn unset_profile_is_default() {
        let db = Database::open_in_memory().unwrap();
        let profile = db.profile().unwrap();
        assert_eq!(profile, UserProfile::default());
        assert!(!profile.is_complete());
        assert!(!db.onboarding_complete().unwrap());
    }

    #[test]
    fn save_profile_overwrites() {
        let mut db = Database::open_in_memory().unwrap();
        let first = UserProfile {
            sex: Sex::Female,
            age_years: 28,
            height_cm: 165.0,
            weight_kg: 60.0,
            activity_level: ActivityLevel::Moderate,
            goal_direction: GoalDirection::Gain,
        };
        db.save_profile(&first).unwrap();
        assert_eq!(db.profile().unwrap(), first);

        let second = UserProfile {
            weight_kg: 61.5,
            goal_direction: GoalDirection::Maintain,
            ..first
        };
        db.save_profile(&second).unwrap();
        assert_eq!(db.profile().unwrap(), second);
    }

    #[test]
    fn onboarding_flag_survives_profile_saves() {
        let mut db = Database::open_in_memory().unwrap();
        db.complete_onboarding().unwrap();
        assert!(db.onboarding_complete().unwrap());
        assert_eq!(db.profile().unwrap(), UserProfile::default());

        let profile = UserProfile {
            age_years: 35,
            height_cm: 180.0,
            weight_kg: 82.0,
            ..UserProfile::default()
        };
        db.save_profile(&profile).unwrap();
        assert!(db.onboarding_complete().unwrap());
        assert_eq!(db.profile().unwrap(), profile);
    }

    #[test]
    fn unknown_profile_values_fall_back_to_defaults() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO user_profile
                 (id, sex, age_years, height_cm, weight_kg, activity_level, goal_direction, updated_at)
                 VALUES (1, 'female', 30, 170.0, 70.0, 'extreme', 'shred', '2025-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
        let profile = db.profile().unwrap();
        assert_eq!(profile.sex, Sex::Female);
        assert_eq!(profile.activity_level, ActivityLevel::Light);
        assert_eq!(profile.goal_direction, GoalDirection::Maintain);
    }
}
