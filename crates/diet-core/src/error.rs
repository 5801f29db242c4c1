use thiserror::Error;

#[derive(Debug, Error)]
pub enum DietError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DietError {
    /// Returns `true` when the persistence layer could not serve the request.
    /// These surface as a generic server error and are never retried.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<rusqlite::Error> for DietError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DietError>;
