//! Errors shared by the persistence ports.

use thiserror::Error;

/// Persistence failure (read or write).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn database(message: impl Into<String>) -> Self {
        StoreError::Database(message.into())
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        StoreError::Corrupt(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable(message.into())
    }
}
