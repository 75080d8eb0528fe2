//! Unified error types and result handling.
//!
//! Ledger operations never fail; everything here comes from the configuration
//! boundary or the persistence gateway.

use thiserror::Error;

/// Errors raised outside the ledger core.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The backing database rejected an operation
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A persisted document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend failure that is not a database error
    #[error("Storage error: {message}")]
    Storage {
        /// What went wrong
        message: String,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Daily goal was zero, negative, or not a finite number
    #[error("Invalid goal: {value} (must be a positive number of milliliters)")]
    InvalidGoal {
        /// The rejected value
        value: f64,
    },

    /// A string could not be parsed as a `YYYY-MM-DD` day key
    #[error("Invalid day key: {value}")]
    InvalidDayKey {
        /// The rejected input
        value: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
