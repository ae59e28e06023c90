//! Core error types for mindnest-core.
//!
//! Rejections (`Validation`, `NotFound`) are final; storage failures carry
//! enough detail for the caller to decide whether a retry makes sense. A
//! capped reward is not an error at all, see [`crate::rewards::RewardStatus`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mindnest-core.
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

    /// Unknown account or record
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Shorthand for an unknown user account.
    pub fn user_not_found(user_id: &str) -> Self {
        CoreError::NotFound {
            entity: "user",
            id: user_id.to_string(),
        }
    }

    /// Whether the same call may succeed if issued again later.
    ///
    /// Only storage contention and an unreachable database qualify; every
    /// ledger operation is a single transaction, so a retry never double-awards.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Database(DatabaseError::Locked)
                | CoreError::Database(DatabaseError::OpenFailed { .. })
                | CoreError::Io(_)
        )
    }
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

    /// Database is locked or busy past the timeout
    #[error("Database is locked")]
    Locked,

    /// A stored value could not be decoded
    #[error("Corrupt value in column '{column}': {message}")]
    CorruptValue { column: String, message: String },

    /// Another thread panicked while holding the connection
    #[error("Database connection poisoned")]
    Poisoned,
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

    /// Unknown dotted key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home or data directory could not be resolved
    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Coin amounts must be strictly positive
    #[error("Invalid coin amount {amount}: must be greater than zero")]
    NonPositiveAmount { amount: i64 },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
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
    fn busy_maps_to_locked_and_is_retryable() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::Database(DatabaseError::Locked)));
        assert!(core.is_retryable());
    }

    #[test]
    fn rejections_are_not_retryable() {
        let invalid = CoreError::from(ValidationError::NonPositiveAmount { amount: 0 });
        assert!(!invalid.is_retryable());
        assert!(!CoreError::user_not_found("u1").is_retryable());
    }

    #[test]
    fn not_found_message_names_the_entity() {
        let err = CoreError::user_not_found("abc");
        assert_eq!(err.to_string(), "user not found: abc");
    }
}
