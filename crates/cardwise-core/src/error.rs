//! Core error types for cardwise-core.
//!
//! This module defines the error hierarchy using thiserror. Invalid quality
//! grades have no variant here: `QualityGrade` makes them unrepresentable.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cardwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Stored card data that could not be interpreted
    #[error("Card data error: {0}")]
    CardData(#[from] CardDataError),

    /// Review session misuse
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// No card with the given id
    #[error("Card not found: {0}")]
    CardNotFound(String),

    /// An id prefix shared by several cards
    #[error("Card id prefix '{prefix}' is ambiguous ({matches} cards)")]
    AmbiguousId { prefix: String, matches: usize },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to locate the data directory
    #[error("Cannot resolve data directory: {0}")]
    DataDir(String),
}

/// Validation errors for review state values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Ease factor below the SM-2 floor (or not a number)
    #[error("ease factor {value} is below the minimum of {min}")]
    EaseTooLow { value: f64, min: f64 },

    /// Negative or non-finite interval
    #[error("interval {0} must be a finite, non-negative number of days")]
    InvalidInterval(f64),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// A stored card whose fields could not be turned into a review state.
///
/// Owned by the storage collaborator; the due-set selector reports these
/// instead of failing the whole deck.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CardDataError {
    /// The due date column is not a `YYYY-MM-DD` date
    #[error("card {card_id}: malformed due date '{raw}'")]
    MalformedDueDate { card_id: String, raw: String },

    /// The status column is not one of the known statuses
    #[error("card {card_id}: unknown status '{raw}'")]
    UnknownStatus { card_id: String, raw: String },

    /// A numeric field violates the review state invariants
    #[error("card {card_id}: {source}")]
    InvalidState {
        card_id: String,
        #[source]
        source: ValidationError,
    },

    /// The creation timestamp is not RFC 3339
    #[error("card {card_id}: malformed timestamp '{raw}'")]
    MalformedTimestamp { card_id: String, raw: String },
}

impl CardDataError {
    /// Id of the card this error refers to.
    pub fn card_id(&self) -> &str {
        match self {
            CardDataError::MalformedDueDate { card_id, .. }
            | CardDataError::UnknownStatus { card_id, .. }
            | CardDataError::InvalidState { card_id, .. }
            | CardDataError::MalformedTimestamp { card_id, .. } => card_id,
        }
    }
}

/// Errors raised by the review session controller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The session has no card left to grade
    #[error("review session is finished")]
    Finished,

    /// A grade was submitted before the answer was revealed
    #[error("answer must be revealed before grading")]
    AnswerHidden,
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_data_error_reports_card_id() {
        let err = CardDataError::MalformedDueDate {
            card_id: "c1".into(),
            raw: "2024-13-40".into(),
        };
        assert_eq!(err.card_id(), "c1");
        assert_eq!(err.to_string(), "card c1: malformed due date '2024-13-40'");
    }

    #[test]
    fn session_error_converts_into_core_error() {
        let err: CoreError = SessionError::AnswerHidden.into();
        assert!(matches!(err, CoreError::Session(SessionError::AnswerHidden)));
    }

    #[test]
    fn sqlite_no_rows_maps_to_query_failed() {
        let err: DatabaseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
