//! Error type shared by the bankrev crates

use thiserror::Error;

use crate::normalizer::NormalizeError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure while preparing the database location
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file unreadable, unparsable or out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied data the store or normalizer cannot accept
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Broken internal invariant
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<NormalizeError> for Error {
    fn from(err: NormalizeError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_identifier_is_invalid_input() {
        let err = Error::from(NormalizeError::MissingIdentifier { index: 2 });
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("#2")));
    }
}
