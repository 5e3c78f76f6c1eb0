//! Error types for the persistence layer.

use thiserror::Error;

/// Errors related to database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Could not open or initialize the database.
    #[error("Database connection error: {message}")]
    ConnectionError { message: String },

    /// A statement failed.
    #[error("Database query error: {message}")]
    QueryError { message: String },

    /// A stored row could not be decoded.
    #[error("Database row decode error: {message}")]
    DecodeError { message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(e: rusqlite::Error) -> Self {
        DatabaseError::QueryError { message: e.to_string() }
    }
}
