//! Error types for habitkit-core

use thiserror::Error;

/// Main error type for the habitkit-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller-fixable input error, with the offending field named
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Habit does not exist or is not owned by the caller.
    ///
    /// Deliberately one message for both cases so callers cannot probe
    /// for the existence of other users' habits.
    #[error("habit not found: {0}")]
    HabitNotFound(String),

    /// A check-in already exists for this habit and calendar date
    #[error("already checked in for this date")]
    AlreadyCheckedIn,

    /// No ledger entry exists for this habit and calendar date.
    ///
    /// Also returned when the habit itself is missing or not owned by the
    /// caller, so the message does not reveal which.
    #[error("no check-in found for this date")]
    CheckInNotFound,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] value.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for habitkit-core
pub type Result<T> = std::result::Result<T, Error>;
