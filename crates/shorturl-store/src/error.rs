/// Errors from URL store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The code contains characters outside the code alphabet.
    #[error("invalid code: {0}")]
    InvalidCode(String),

    /// No origin is stored under the given code.
    #[error("code not found: {0}")]
    NotFound(String),

    /// The backing storage could not be created or seeded.
    #[error("storage init error: {0}")]
    Init(String),

    /// A read or write against the backing storage failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
