//! # habitkit-core
//!
//! Core library for habitkit - a habit tracker built around streak lifecycles.
//!
//! This library provides:
//! - Domain types for habits, check-ins, and per-user aggregates
//! - Database storage layer with SQLite
//! - The streak engine: check-in transitions and lazy expiration sweeps
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! State lives in three tables that the streak engine keeps consistent:
//! - **Habits:** one row per habit, carrying the current streak as a cache
//! - **Check-in ledger:** at most one entry per habit per calendar date
//! - **User aggregates:** lifetime counters that outlive habit deletion
//!
//! ## Example
//!
//! ```rust,no_run
//! use habitkit_core::{streak, CheckInRequest, Config, Database};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open database
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let habit = streak::check_in(
//!     &db,
//!     &CheckInRequest {
//!         habit_id: "habit-id".into(),
//!         user_id: "local".into(),
//!         local_date: "2026-08-30".into(),
//!         image_url: None,
//!     },
//! )
//! .expect("check-in failed");
//! println!("streak is now {}", habit.streak);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod streak;
pub mod types;
