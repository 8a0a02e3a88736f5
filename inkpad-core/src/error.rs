//! Error types for inkpad operations

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A column with a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueField::Username => "username",
            UniqueField::Email => "email",
        }
    }

    /// Map a Postgres constraint name (e.g. `users_email_key`) to its field.
    pub fn from_constraint(constraint: &str) -> Option<Self> {
        if constraint.contains("username") {
            Some(UniqueField::Username)
        } else if constraint.contains("email") {
            Some(UniqueField::Email)
        } else {
            None
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// A write referenced a user that does not exist.
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: Uuid },

    #[error("Unique constraint violated on {field}")]
    UniqueViolation { field: UniqueField },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    /// No pooled connection became free in time.
    #[error("Timed out waiting for a connection")]
    PoolTimeout,

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
