//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    -- ============================================
    -- Habits: one row per tracked habit.
    -- streak/last_check_in/image_url are a denormalized cache of the
    -- ledger below; streak is 0 whenever last_check_in is NULL.
    -- ============================================

    CREATE TABLE IF NOT EXISTS habits (
        id               TEXT PRIMARY KEY,
        user_id          TEXT NOT NULL,
        title            TEXT NOT NULL,
        description      TEXT,
        icon             TEXT,
        colour           TEXT,
        streak           INTEGER NOT NULL DEFAULT 0,
        last_check_in    DATETIME,
        image_url        TEXT,
        created_at       DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id, created_at DESC);

    -- ============================================
    -- Check-in ledger: at most one entry per habit per calendar date.
    -- The UNIQUE index is the arbiter for concurrent same-date check-ins.
    -- Entries cascade with their habit; the user's aggregate counters do not.
    -- ============================================

    CREATE TABLE IF NOT EXISTS check_ins (
        id               TEXT PRIMARY KEY,
        habit_id         TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
        user_id          TEXT NOT NULL,
        check_in_date    TEXT NOT NULL,      -- calendar date, YYYY-MM-DD
        image_url        TEXT,
        created_at       DATETIME NOT NULL,

        UNIQUE(habit_id, check_in_date)
    );

    CREATE INDEX IF NOT EXISTS idx_check_ins_user ON check_ins(user_id);
    CREATE INDEX IF NOT EXISTS idx_check_ins_habit_date ON check_ins(habit_id, check_in_date DESC);

    -- ============================================
    -- Per-user lifetime aggregates, created lazily on first access.
    -- No FK to habits: these survive habit deletion.
    -- ============================================

    CREATE TABLE IF NOT EXISTS user_stats (
        user_id          TEXT PRIMARY KEY,
        best_streak      INTEGER NOT NULL DEFAULT 0,
        total_check_ins  INTEGER NOT NULL DEFAULT 0,
        updated_at       DATETIME NOT NULL
    );
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
