//! Database layer for habitkit
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for habit, ledger, and aggregate-stats queries
//! - A single-transaction check-in write path

pub mod repo;
pub mod schema;

pub use repo::Database;
