//! Streak lifecycle engine
//!
//! Owns the rules that decide, on each check-in, whether a habit's streak
//! continues, resets, or starts fresh, plus the lazy expiration sweep that
//! invalidates stale streaks when habits are read.
//!
//! ## Data flow
//!
//! ```text
//! ┌────────────┐     ┌───────────────┐     ┌──────────────────────────┐
//! │  Check-in  │ ──► │ streak engine │ ──► │ Database (one txn:       │
//! │  request   │     │ transition    │     │ habit + ledger + stats)  │
//! └────────────┘     └───────────────┘     └──────────────────────────┘
//! ```
//!
//! Reads are explicit two-phase calls: `sweep` first (best-effort, its own
//! failure is logged and swallowed), then the actual query, so the caller
//! observes swept values within the same request.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::types::{CheckIn, CheckInRequest, Habit, StatsSummary};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// A streak survives at most this long between check-ins.
pub const EXPIRY_HOURS: i64 = 48;

/// Record a check-in for `local_date` ("today" in the caller's timezone).
///
/// Applies the transition rule against the habit's stored state, then
/// persists the habit row, ledger entry, and both aggregate counters in one
/// transaction. Concurrent attempts for the same `(habit, date)` are
/// arbitrated by the ledger's unique index: exactly one succeeds, the other
/// gets [`Error::AlreadyCheckedIn`] with no partial writes.
pub fn check_in(db: &Database, req: &CheckInRequest) -> Result<Habit> {
    let local_date = parse_local_date(&req.local_date)?;

    let habit = db
        .get_habit(&req.habit_id, &req.user_id)?
        .ok_or_else(|| Error::HabitNotFound(req.habit_id.clone()))?;

    let now = Utc::now();
    let new_streak = next_streak(habit.last_check_in, habit.streak, local_date, now)?;

    let updated = db.apply_check_in(
        &req.habit_id,
        &req.user_id,
        new_streak,
        local_date,
        req.image_url.as_deref(),
        now,
    )?;

    tracing::debug!(
        habit_id = %updated.id,
        streak = updated.streak,
        date = %local_date,
        "Check-in recorded"
    );

    Ok(updated)
}

/// The transition rule: what the streak becomes for a check-in on
/// `local_date` given the stored state.
///
/// A >48h wall-clock gap resets the streak and the discovering check-in
/// records 0, not 1. That matches the system this replaces (the check-in
/// that finds the gap does not count as day one of the new streak); see
/// DESIGN.md before changing it.
fn next_streak(
    last_check_in: Option<DateTime<Utc>>,
    current_streak: i64,
    local_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<i64> {
    let Some(last) = last_check_in else {
        // First check-in ever
        return Ok(1);
    };

    let last_date = last.date_naive();
    if last_date == local_date {
        return Err(Error::AlreadyCheckedIn);
    }

    if now - last > Duration::hours(EXPIRY_HOURS) {
        return Ok(0);
    }

    if last_date < local_date {
        return Ok(current_streak + 1);
    }

    // local_date is earlier than the last recorded date. Unreachable for
    // honest clients; refuse rather than silently rewrite history.
    Err(Error::AlreadyCheckedIn)
}

/// Reset the streak of every habit of `user_id` whose last check-in is more
/// than [`EXPIRY_HOURS`] old. Returns the number of habits reset.
pub fn sweep_expired(db: &Database, user_id: &str) -> Result<u64> {
    let cutoff = Utc::now() - Duration::hours(EXPIRY_HOURS);
    let reset = db.reset_expired_streaks(user_id, cutoff)?;
    if reset > 0 {
        tracing::debug!(user_id, reset, "Expired streaks swept");
    }
    Ok(reset)
}

/// Best-effort sweep ahead of a read: a sweep failure must not fail the
/// read it accompanies, so it is logged and swallowed here.
fn sweep_before_read(db: &Database, user_id: &str) {
    if let Err(e) = sweep_expired(db, user_id) {
        tracing::warn!(user_id, error = %e, "Expiration sweep failed; serving read anyway");
    }
}

/// List a user's habits (newest-created first), sweeping expired streaks
/// first so returned values reflect the reset.
pub fn list_habits(db: &Database, user_id: &str) -> Result<Vec<Habit>> {
    sweep_before_read(db, user_id);
    db.list_habits(user_id)
}

/// Fetch one habit by id, sweeping expired streaks first.
pub fn get_habit(db: &Database, user_id: &str, habit_id: &str) -> Result<Habit> {
    sweep_before_read(db, user_id);
    db.get_habit(habit_id, user_id)?
        .ok_or_else(|| Error::HabitNotFound(habit_id.to_string()))
}

/// Per-user stats: active habit count plus lifetime aggregates.
///
/// `best_streak` and `total_check_ins` come from the aggregate row, never
/// from scanning habits: per-habit data dies with deletion, the milestone
/// must not.
pub fn stats(db: &Database, user_id: &str) -> Result<StatsSummary> {
    sweep_before_read(db, user_id);

    let active_habits = db.count_active_habits(user_id)?;
    let aggregates = db.get_or_create_user_stats(user_id)?;

    Ok(StatsSummary {
        active_habits,
        best_streak: aggregates.best_streak,
        total_check_ins: aggregates.total_check_ins,
    })
}

/// Attach or replace the image on an existing check-in entry.
///
/// Never creates a ledger entry (that would desynchronize the lifetime
/// counter); fails with [`Error::CheckInNotFound`] when no entry exists
/// for the date.
pub fn attach_check_in_image(
    db: &Database,
    user_id: &str,
    habit_id: &str,
    local_date: &str,
    image_url: &str,
) -> Result<CheckIn> {
    let date = parse_local_date(local_date)?;
    db.set_check_in_image(habit_id, user_id, date, image_url)
}

fn parse_local_date(raw: &str) -> Result<NaiveDate> {
    if raw.trim().is_empty() {
        return Err(Error::validation("local_date", "local date is required"));
    }
    raw.parse::<NaiveDate>().map_err(|_| {
        Error::validation(
            "local_date",
            format!("expected YYYY-MM-DD, got {:?}", raw),
        )
    })
}
