//! Core domain types for habitkit
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Habit** | A recurring activity a user tracks, owned by exactly one user |
//! | **Check-in** | A user action recording habit completion for one calendar date |
//! | **Streak** | Count of consecutive calendar days with a check-in; resets after a >48h gap |
//! | **Ledger** | The append-mostly `check_ins` table, at most one entry per habit per date |
//! | **Aggregate stats** | Per-user lifetime counters that outlive individual habits |
//!
//! The habit row carries a denormalized `streak` cache so reads never scan
//! history; the ledger and the `user_stats` row are the durable sources of
//! truth (the ledger for counts, the aggregate row for lifetime milestones).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Habit
// ============================================

/// A tracked habit with its denormalized streak state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier
    pub id: String,
    /// Owning user (opaque id supplied by the auth boundary)
    pub user_id: String,
    /// Display title (required, non-empty)
    pub title: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Optional icon name
    pub icon: Option<String>,
    /// Optional display colour
    pub colour: Option<String>,
    /// Current consecutive-day streak (cache; zero when `last_check_in` is None)
    pub streak: i64,
    /// UTC instant of the most recent successful check-in
    pub last_check_in: Option<DateTime<Utc>>,
    /// Image attached to the most recent check-in
    pub image_url: Option<String>,
    /// When the habit was created
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a habit. Streak state always starts zeroed.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub colour: Option<String>,
}

/// Partial update for a habit's descriptive fields.
///
/// Streak state is never mutated through updates; only check-ins and the
/// expiration sweep touch `streak`/`last_check_in`.
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub colour: Option<String>,
}

impl HabitUpdate {
    /// True when no field is set (the update would be a no-op write).
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.icon.is_none()
            && self.colour.is_none()
    }
}

// ============================================
// Check-in ledger
// ============================================

/// One ledger entry: a habit completed on a calendar date.
///
/// At most one entry exists per `(habit_id, check_in_date)`; the entry is
/// cascade-deleted with its habit, but its contribution to the user's
/// aggregate counters survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    /// Unique identifier
    pub id: String,
    /// Habit this entry belongs to
    pub habit_id: String,
    /// Owning user, denormalized for per-user queries
    pub user_id: String,
    /// Calendar date as asserted by the caller (no time component)
    pub check_in_date: NaiveDate,
    /// Optional image attached to this check-in
    pub image_url: Option<String>,
    /// When the entry was recorded (server clock, UTC)
    pub created_at: DateTime<Utc>,
}

/// Inbound check-in request.
///
/// `local_date` is "today" in the caller's timezone as a `YYYY-MM-DD`
/// string; the server has no independent timezone knowledge.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckInRequest {
    pub habit_id: String,
    pub user_id: String,
    pub local_date: String,
    pub image_url: Option<String>,
}

// ============================================
// User aggregate stats
// ============================================

/// Per-user lifetime counters, one row per user, created lazily.
///
/// `best_streak` is monotonically non-decreasing and `total_check_ins`
/// monotonically increasing across the user's lifetime; neither is reduced
/// when a habit is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub best_streak: i64,
    pub total_check_ins: i64,
    pub updated_at: DateTime<Utc>,
}

/// Stats response for a user: active habit count plus lifetime aggregates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSummary {
    /// Habits with any check-in history (streak > 0 or a last check-in on
    /// record), as opposed to never-started ones
    pub active_habits: i64,
    /// Highest streak ever achieved by any of the user's habits
    pub best_streak: i64,
    /// Total successful check-ins across all habits, including deleted ones
    pub total_check_ins: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_detected() {
        assert!(HabitUpdate::default().is_empty());
        let update = HabitUpdate {
            title: Some("Read".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
