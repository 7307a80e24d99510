//! Error taxonomy for the report store.
//!
//! Absence is not an error: point lookups return `Option`, never a
//! not-found variant.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("connection failed: {message}")]
    Connection { message: String },

    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String },

    #[error("query failed: {message}")]
    Query { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Whether the error came from an interrupted statement.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StorageError::Cancelled)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _) => match code.code {
                rusqlite::ErrorCode::OperationInterrupted => StorageError::Cancelled,
                rusqlite::ErrorCode::ConstraintViolation => StorageError::ConstraintViolation {
                    message: err.to_string(),
                },
                rusqlite::ErrorCode::CannotOpen
                | rusqlite::ErrorCode::DatabaseBusy
                | rusqlite::ErrorCode::DatabaseLocked
                | rusqlite::ErrorCode::NotADatabase => StorageError::Connection {
                    message: err.to_string(),
                },
                _ => StorageError::Query {
                    message: err.to_string(),
                },
            },
            _ => StorageError::Query {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_maps_to_cancelled() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_INTERRUPT),
            None,
        );
        assert!(StorageError::from(err).is_cancelled());
    }

    #[test]
    fn constraint_maps_to_violation() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("UNIQUE constraint failed".into()),
        );
        assert!(matches!(
            StorageError::from(err),
            StorageError::ConstraintViolation { .. }
        ));
    }

    #[test]
    fn busy_maps_to_connection() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(
            StorageError::from(err),
            StorageError::Connection { .. }
        ));
    }
}
