use thiserror::Error;

/// Errors raised while building core values from untrusted input.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid short id: {0}")]
    InvalidShortId(String),
    #[error("short id length must be between {min} and {max}, got {actual}")]
    InvalidShortIdLength { actual: usize, min: usize, max: usize },
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("command name already exists: {0}")]
    NameConflict(String),
    #[error("short id already exists: {0}")]
    ShortIdConflict(String),
    #[error("command not found: {0}")]
    NotFound(i64),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("schema migration failed: {0}")]
    Migration(String),
}

/// Errors surfaced by the catalog service to its callers.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid API key")]
    Forbidden,
    #[error("{0}")]
    Conflict(String),
    #[error("could not allocate a unique short id after {0} attempts")]
    ShortIdExhausted(u32),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for CatalogError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NameConflict(_) => {
                Self::Conflict("A command with this name already exists".to_string())
            }
            StorageError::NotFound(_) => Self::NotFound("Command not found".to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}
