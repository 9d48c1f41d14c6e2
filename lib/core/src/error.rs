use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Movie not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid similarity dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Dataset integrity error: {0}")]
    Integrity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Errors that must abort startup rather than be turned into a response.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidDimension { .. } | Error::Integrity(_) | Error::Io(_) | Error::Serialization(_)
        )
    }
}
