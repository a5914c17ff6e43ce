use thiserror::Error;

/// Error for persistence operations shared by every repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// The refresh token row to revoke is missing or no longer active.
    #[error("Refresh token is not active")]
    NotActive,

    #[error("Stored data is corrupt: {0}")]
    CorruptRecord(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
