use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("tenant {0} not found")]
    TenantNotFound(String),
    #[error("tenant {0} already exists")]
    TenantExists(String),
    #[error("guest {0} not found")]
    GuestNotFound(String),
    #[error("invalid rsvp: {0}")]
    InvalidRsvp(String),
    #[error("invalid guest: {0}")]
    InvalidGuest(String),
    #[error("connection poisoned")]
    Poisoned,
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
