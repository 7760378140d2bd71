//! Process-level error types
//!
//! Request handling uses [`crate::api::ApiError`]; this type covers startup
//! and serving: configuration, database connection and socket I/O.

use thiserror::Error;

use crate::repository::RepositoryError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for service bootstrap and lifecycle
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Store error with operation context
    #[error("{0}")]
    Database(#[from] RepositoryError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(RepositoryError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = Error::from(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "address in use",
        ));
        assert_eq!(err.to_string(), "I/O error: address in use");
    }

    #[test]
    fn test_repository_error_is_transparent() {
        let err = Error::from(RepositoryError::connection_failed("refused"));
        assert_eq!(
            err.to_string(),
            "Repository connection_failed error during connect: refused"
        );
    }

    #[test]
    fn test_figment_error_is_boxed() {
        let err = Error::from(figment::Error::from("missing field `name`".to_string()));
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
