//! Database repository layer
//!
//! Provides query and mutation operations for habits, the check-in ledger,
//! and per-user aggregate stats. Cross-entity writes that must land together
//! (the check-in path) run inside a single transaction here.

use crate::error::{Error, Result};
use crate::types::*;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

/// True when the error is a UNIQUE/constraint violation.
///
/// Inside the check-in transaction the only constraint that can fire on the
/// ledger insert is `UNIQUE(habit_id, check_in_date)` (the row id is a fresh
/// UUID), so this is how a losing concurrent check-in surfaces.
fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better concurrency
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Habit operations
    // ============================================

    /// Create a habit with zeroed streak state.
    pub fn create_habit(&self, new: &NewHabit) -> Result<Habit> {
        if new.title.trim().is_empty() {
            return Err(Error::validation("title", "title must not be empty"));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO habits (id, user_id, title, description, icon, colour, streak, last_check_in, image_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL, NULL, ?7)
            "#,
            params![
                id,
                new.user_id,
                new.title,
                new.description,
                new.icon,
                new.colour,
                now.to_rfc3339(),
            ],
        )?;

        conn.query_row("SELECT * FROM habits WHERE id = ?", [&id], row_to_habit)
            .map_err(Error::from)
    }

    /// Get a habit by id, scoped to its owner.
    pub fn get_habit(&self, id: &str, user_id: &str) -> Result<Option<Habit>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM habits WHERE id = ? AND user_id = ?",
            [id, user_id],
            row_to_habit,
        )
        .optional()
        .map_err(Error::from)
    }

    /// List a user's habits, newest-created first.
    pub fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM habits WHERE user_id = ? ORDER BY created_at DESC")?;

        let habits = stmt
            .query_map([user_id], row_to_habit)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    /// Update a habit's descriptive fields (title/description/icon/colour).
    ///
    /// Streak state is never touched here; only check-ins and the expiration
    /// sweep mutate it.
    pub fn update_habit(&self, id: &str, user_id: &str, update: &HabitUpdate) -> Result<Habit> {
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(Error::validation("title", "title must not be empty"));
            }
        }

        let conn = self.conn.lock().unwrap();
        let affected = conn.execute(
            r#"
            UPDATE habits SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                icon = COALESCE(?3, icon),
                colour = COALESCE(?4, colour)
            WHERE id = ?5 AND user_id = ?6
            "#,
            params![
                update.title,
                update.description,
                update.icon,
                update.colour,
                id,
                user_id,
            ],
        )?;

        if affected == 0 {
            return Err(Error::HabitNotFound(id.to_string()));
        }

        conn.query_row("SELECT * FROM habits WHERE id = ?", [id], row_to_habit)
            .map_err(Error::from)
    }

    /// Delete a habit and (via FK cascade) its ledger entries.
    ///
    /// The owner's aggregate stats are deliberately untouched: lifetime
    /// milestones survive habit deletion.
    pub fn delete_habit(&self, id: &str, user_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute(
            "DELETE FROM habits WHERE id = ? AND user_id = ?",
            [id, user_id],
        )?;

        if affected == 0 {
            return Err(Error::HabitNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Count habits with any check-in history (streak > 0 or a recorded
    /// last check-in), as opposed to never-started ones.
    pub fn count_active_habits(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE user_id = ? AND (streak > 0 OR last_check_in IS NOT NULL)",
            [user_id],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    /// Zero the streak of every habit whose last check-in is older than
    /// `cutoff`. Returns the number of habits reset.
    pub fn reset_expired_streaks(&self, user_id: &str, cutoff: DateTime<Utc>) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute(
            r#"
            UPDATE habits SET streak = 0
            WHERE user_id = ?1
              AND last_check_in IS NOT NULL
              AND last_check_in < ?2
              AND streak > 0
            "#,
            params![user_id, cutoff.to_rfc3339()],
        )?;
        Ok(affected as u64)
    }

    // ============================================
    // Check-in write path
    // ============================================

    /// Persist one successful check-in: habit row, ledger entry, and both
    /// aggregate counters, in a single transaction.
    ///
    /// The caller (the streak engine) has already applied the transition
    /// rule and supplies the new streak value. If another check-in for the
    /// same `(habit, date)` committed since the caller read the habit, the
    /// ledger's unique index rejects the insert, the transaction rolls back,
    /// and this returns [`Error::AlreadyCheckedIn`] with no partial writes.
    pub fn apply_check_in(
        &self,
        habit_id: &str,
        user_id: &str,
        new_streak: i64,
        local_date: NaiveDate,
        image_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Habit> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let affected = tx.execute(
            r#"
            UPDATE habits SET streak = ?1, last_check_in = ?2, image_url = ?3
            WHERE id = ?4 AND user_id = ?5
            "#,
            params![new_streak, now.to_rfc3339(), image_url, habit_id, user_id],
        )?;
        if affected == 0 {
            return Err(Error::HabitNotFound(habit_id.to_string()));
        }

        let entry_id = Uuid::new_v4().to_string();
        let inserted = tx.execute(
            r#"
            INSERT INTO check_ins (id, habit_id, user_id, check_in_date, image_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                entry_id,
                habit_id,
                user_id,
                local_date.to_string(),
                image_url,
                now.to_rfc3339(),
            ],
        );
        if let Err(e) = inserted {
            if is_constraint_violation(&e) {
                // Lost the race for this date; dropping the transaction
                // rolls back the habit update above.
                return Err(Error::AlreadyCheckedIn);
            }
            return Err(e.into());
        }

        // Lazy get-or-create of the aggregate row, then bump both counters.
        tx.execute(
            r#"
            INSERT INTO user_stats (user_id, best_streak, total_check_ins, updated_at)
            VALUES (?1, 0, 0, ?2)
            ON CONFLICT(user_id) DO NOTHING
            "#,
            params![user_id, now.to_rfc3339()],
        )?;
        tx.execute(
            r#"
            UPDATE user_stats SET
                total_check_ins = total_check_ins + 1,
                best_streak = MAX(best_streak, ?1),
                updated_at = ?2
            WHERE user_id = ?3
            "#,
            params![new_streak, now.to_rfc3339(), user_id],
        )?;

        let habit = tx.query_row("SELECT * FROM habits WHERE id = ?", [habit_id], row_to_habit)?;
        tx.commit()?;
        Ok(habit)
    }

    // ============================================
    // Check-in ledger queries
    // ============================================

    /// List a habit's ledger entries, newest date first.
    pub fn list_check_ins(&self, habit_id: &str, user_id: &str) -> Result<Vec<CheckIn>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM check_ins WHERE habit_id = ? AND user_id = ? ORDER BY check_in_date DESC",
        )?;

        let entries = stmt
            .query_map([habit_id, user_id], row_to_check_in)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Get a single ledger entry by habit and calendar date.
    pub fn get_check_in(&self, habit_id: &str, date: NaiveDate) -> Result<Option<CheckIn>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM check_ins WHERE habit_id = ? AND check_in_date = ?",
            params![habit_id, date.to_string()],
            row_to_check_in,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Count all ledger entries for a user across habits.
    ///
    /// Matches `user_stats.total_check_ins` while no habit has been deleted;
    /// after a cascade delete the aggregate row keeps the higher figure.
    pub fn count_user_check_ins(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM check_ins WHERE user_id = ?",
            [user_id],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    /// Replace the image on an existing ledger entry, refreshing the habit's
    /// cached `image_url` when the entry is the habit's most recent check-in.
    ///
    /// This is the only upsert-style path into the ledger: it never creates
    /// an entry, so `total_check_ins` stays in sync with the ledger.
    pub fn set_check_in_image(
        &self,
        habit_id: &str,
        user_id: &str,
        date: NaiveDate,
        image_url: &str,
    ) -> Result<CheckIn> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let affected = tx.execute(
            r#"
            UPDATE check_ins SET image_url = ?1
            WHERE habit_id = ?2 AND user_id = ?3 AND check_in_date = ?4
            "#,
            params![image_url, habit_id, user_id, date.to_string()],
        )?;
        if affected == 0 {
            return Err(Error::CheckInNotFound);
        }

        tx.execute(
            r#"
            UPDATE habits SET image_url = ?1
            WHERE id = ?2 AND user_id = ?3 AND date(last_check_in) = ?4
            "#,
            params![image_url, habit_id, user_id, date.to_string()],
        )?;

        let entry = tx.query_row(
            "SELECT * FROM check_ins WHERE habit_id = ? AND check_in_date = ?",
            params![habit_id, date.to_string()],
            row_to_check_in,
        )?;
        tx.commit()?;
        Ok(entry)
    }

    // ============================================
    // User aggregate stats
    // ============================================

    /// Get a user's aggregate row, creating a zeroed one on first access.
    ///
    /// The conflict-tolerant insert makes concurrent first-time access safe:
    /// both callers end up reading the same row.
    pub fn get_or_create_user_stats(&self, user_id: &str) -> Result<UserStats> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO user_stats (user_id, best_streak, total_check_ins, updated_at)
            VALUES (?1, 0, 0, ?2)
            ON CONFLICT(user_id) DO NOTHING
            "#,
            params![user_id, Utc::now().to_rfc3339()],
        )?;

        conn.query_row(
            "SELECT * FROM user_stats WHERE user_id = ?",
            [user_id],
            row_to_user_stats,
        )
        .map_err(Error::from)
    }

    /// Bump the lifetime check-in counter by one.
    pub fn increment_check_ins(&self, user_id: &str) -> Result<UserStats> {
        // Ensure the row exists first
        drop(self.get_or_create_user_stats(user_id)?);

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            UPDATE user_stats SET
                total_check_ins = total_check_ins + 1,
                updated_at = ?1
            WHERE user_id = ?2
            "#,
            params![Utc::now().to_rfc3339(), user_id],
        )?;

        conn.query_row(
            "SELECT * FROM user_stats WHERE user_id = ?",
            [user_id],
            row_to_user_stats,
        )
        .map_err(Error::from)
    }

    /// Raise `best_streak` to `candidate` if it is a new record; a no-op
    /// write otherwise. The counter never decreases.
    pub fn update_best_streak(&self, user_id: &str, candidate: i64) -> Result<UserStats> {
        drop(self.get_or_create_user_stats(user_id)?);

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            UPDATE user_stats SET
                best_streak = MAX(best_streak, ?1),
                updated_at = ?2
            WHERE user_id = ?3
            "#,
            params![candidate, Utc::now().to_rfc3339(), user_id],
        )?;

        conn.query_row(
            "SELECT * FROM user_stats WHERE user_id = ?",
            [user_id],
            row_to_user_stats,
        )
        .map_err(Error::from)
    }
}

// ============================================
// Row mappers
// ============================================

fn row_to_habit(row: &Row) -> rusqlite::Result<Habit> {
    let created_at_str: String = row.get("created_at")?;
    let last_check_in_str: Option<String> = row.get("last_check_in")?;

    Ok(Habit {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        icon: row.get("icon")?,
        colour: row.get("colour")?,
        streak: row.get("streak")?,
        last_check_in: last_check_in_str
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        image_url: row.get("image_url")?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

fn row_to_check_in(row: &Row) -> rusqlite::Result<CheckIn> {
    let date_str: String = row.get("check_in_date")?;
    let created_at_str: String = row.get("created_at")?;

    Ok(CheckIn {
        id: row.get("id")?,
        habit_id: row.get("habit_id")?,
        user_id: row.get("user_id")?,
        check_in_date: date_str
            .parse()
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        image_url: row.get("image_url")?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

fn row_to_user_stats(row: &Row) -> rusqlite::Result<UserStats> {
    let updated_at_str: String = row.get("updated_at")?;

    Ok(UserStats {
        user_id: row.get("user_id")?,
        best_streak: row.get("best_streak")?,
        total_check_ins: row.get("total_check_ins")?,
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn new_habit(user: &str, title: &str) -> NewHabit {
        NewHabit {
            user_id: user.to_string(),
            title: title.to_string(),
            description: None,
            icon: None,
            colour: None,
        }
    }

    #[test]
    fn create_starts_with_zeroed_streak() {
        let db = test_db();
        let habit = db.create_habit(&new_habit("u1", "Read")).unwrap();

        assert_eq!(habit.streak, 0);
        assert!(habit.last_check_in.is_none());
        assert!(habit.image_url.is_none());
    }

    #[test]
    fn create_rejects_empty_title() {
        let db = test_db();
        let err = db.create_habit(&new_habit("u1", "   ")).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "title"));
    }

    #[test]
    fn list_is_newest_first() {
        let db = test_db();
        let first = db.create_habit(&new_habit("u1", "Read")).unwrap();
        // Force distinct created_at values
        db.connection()
            .execute(
                "UPDATE habits SET created_at = '2026-01-01T00:00:00+00:00' WHERE id = ?",
                [&first.id],
            )
            .unwrap();
        let second = db.create_habit(&new_habit("u1", "Run")).unwrap();

        let habits = db.list_habits("u1").unwrap();
        assert_eq!(habits.len(), 2);
        assert_eq!(habits[0].id, second.id);
        assert_eq!(habits[1].id, first.id);
    }

    #[test]
    fn update_is_scoped_to_owner() {
        let db = test_db();
        let habit = db.create_habit(&new_habit("u1", "Read")).unwrap();

        let update = HabitUpdate {
            title: Some("Read more".to_string()),
            ..Default::default()
        };
        let err = db.update_habit(&habit.id, "someone-else", &update).unwrap_err();
        assert!(matches!(err, Error::HabitNotFound(_)));

        let updated = db.update_habit(&habit.id, "u1", &update).unwrap();
        assert_eq!(updated.title, "Read more");
        // Unset fields keep their values
        assert!(updated.description.is_none());
    }

    #[test]
    fn update_never_touches_streak_state() {
        let db = test_db();
        let habit = db.create_habit(&new_habit("u1", "Read")).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        db.apply_check_in(&habit.id, "u1", 1, date, None, Utc::now())
            .unwrap();

        let update = HabitUpdate {
            colour: Some("teal".to_string()),
            ..Default::default()
        };
        let updated = db.update_habit(&habit.id, "u1", &update).unwrap();
        assert_eq!(updated.streak, 1);
        assert!(updated.last_check_in.is_some());
    }

    #[test]
    fn delete_cascades_ledger_not_stats() {
        let db = test_db();
        let habit = db.create_habit(&new_habit("u1", "Read")).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        db.apply_check_in(&habit.id, "u1", 1, date, None, Utc::now())
            .unwrap();

        db.delete_habit(&habit.id, "u1").unwrap();

        assert_eq!(db.count_user_check_ins("u1").unwrap(), 0);
        let stats = db.get_or_create_user_stats("u1").unwrap();
        assert_eq!(stats.total_check_ins, 1);
        assert_eq!(stats.best_streak, 1);
    }

    #[test]
    fn apply_check_in_writes_all_four_pieces() {
        let db = test_db();
        let habit = db.create_habit(&new_habit("u1", "Read")).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let now = Utc::now();

        let updated = db
            .apply_check_in(&habit.id, "u1", 1, date, Some("https://img/1.png"), now)
            .unwrap();

        assert_eq!(updated.streak, 1);
        assert_eq!(updated.image_url.as_deref(), Some("https://img/1.png"));
        assert!(updated.last_check_in.is_some());

        let entry = db.get_check_in(&habit.id, date).unwrap().unwrap();
        assert_eq!(entry.user_id, "u1");
        assert_eq!(entry.image_url.as_deref(), Some("https://img/1.png"));

        let stats = db.get_or_create_user_stats("u1").unwrap();
        assert_eq!(stats.total_check_ins, 1);
        assert_eq!(stats.best_streak, 1);
    }

    #[test]
    fn apply_check_in_duplicate_date_rolls_back_everything() {
        let db = test_db();
        let habit = db.create_habit(&new_habit("u1", "Read")).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        db.apply_check_in(&habit.id, "u1", 1, date, None, Utc::now())
            .unwrap();
        let err = db
            .apply_check_in(&habit.id, "u1", 2, date, None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyCheckedIn));

        // The losing attempt left no trace: streak and counters unchanged
        let habit = db.get_habit(&habit.id, "u1").unwrap().unwrap();
        assert_eq!(habit.streak, 1);
        let stats = db.get_or_create_user_stats("u1").unwrap();
        assert_eq!(stats.total_check_ins, 1);
    }

    #[test]
    fn best_streak_is_monotonic() {
        let db = test_db();
        db.update_best_streak("u1", 5).unwrap();
        let stats = db.update_best_streak("u1", 3).unwrap();
        assert_eq!(stats.best_streak, 5);
        let stats = db.update_best_streak("u1", 8).unwrap();
        assert_eq!(stats.best_streak, 8);
    }

    #[test]
    fn stats_get_or_create_is_lazy_and_stable() {
        let db = test_db();
        let first = db.get_or_create_user_stats("u1").unwrap();
        assert_eq!(first.best_streak, 0);
        assert_eq!(first.total_check_ins, 0);

        db.increment_check_ins("u1").unwrap();
        let again = db.get_or_create_user_stats("u1").unwrap();
        assert_eq!(again.total_check_ins, 1);
    }

    #[test]
    fn image_attach_replaces_without_new_entry() {
        let db = test_db();
        let habit = db.create_habit(&new_habit("u1", "Read")).unwrap();
        // Date must match last_check_in's calendar day for the habit cache
        // to follow the ledger update
        let date = Utc::now().date_naive();
        db.apply_check_in(&habit.id, "u1", 1, date, None, Utc::now())
            .unwrap();

        let entry = db
            .set_check_in_image(&habit.id, "u1", date, "https://img/late.png")
            .unwrap();
        assert_eq!(entry.image_url.as_deref(), Some("https://img/late.png"));
        assert_eq!(db.count_user_check_ins("u1").unwrap(), 1);

        // Habit cache follows because this is the most recent check-in
        let habit = db.get_habit(&habit.id, "u1").unwrap().unwrap();
        assert_eq!(habit.image_url.as_deref(), Some("https://img/late.png"));
    }

    #[test]
    fn image_attach_requires_existing_entry() {
        let db = test_db();
        let habit = db.create_habit(&new_habit("u1", "Read")).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let err = db
            .set_check_in_image(&habit.id, "u1", date, "https://img/x.png")
            .unwrap_err();
        assert!(matches!(err, Error::CheckInNotFound));
        assert_eq!(db.count_user_check_ins("u1").unwrap(), 0);
    }

    #[test]
    fn reset_expired_streaks_only_touches_stale_rows() {
        let db = test_db();
        let stale = db.create_habit(&new_habit("u1", "Read")).unwrap();
        let fresh = db.create_habit(&new_habit("u1", "Run")).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let now = Utc::now();

        db.apply_check_in(&stale.id, "u1", 3, date, None, now - chrono::Duration::hours(50))
            .unwrap();
        db.apply_check_in(&fresh.id, "u1", 2, date, None, now - chrono::Duration::hours(2))
            .unwrap();

        let cutoff = now - chrono::Duration::hours(48);
        let reset = db.reset_expired_streaks("u1", cutoff).unwrap();
        assert_eq!(reset, 1);

        let stale = db.get_habit(&stale.id, "u1").unwrap().unwrap();
        assert_eq!(stale.streak, 0);
        // last_check_in is preserved: the habit stays "active", not "never started"
        assert!(stale.last_check_in.is_some());

        let fresh = db.get_habit(&fresh.id, "u1").unwrap().unwrap();
        assert_eq!(fresh.streak, 2);
    }
}
