//! Error types and error handling

use std::path::PathBuf;
use thiserror::Error;

/// Generator error type
#[derive(Debug, Error)]
pub enum GenError {
    /// Config file is missing, unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file carries keys the generator does not understand
    ///
    /// Never fatal: callers log it and continue.
    #[error("Unrecognized configuration: {0}")]
    Parse(String),

    /// Required options are missing or inconsistent
    #[error("Invalid options: {0}")]
    Validation(String),

    /// The database could not be reached
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// The requested table has no discoverable schema
    #[error("Table \"{0}\" does not exist")]
    TableNotFound(String),

    /// The schema query failed after the connection was established
    #[error("Schema query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// Template rendering failed
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Filesystem operation failed
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// Path being written or inspected
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_not_found_message() {
        let err = GenError::TableNotFound("user".to_string());
        assert_eq!(err.to_string(), "Table \"user\" does not exist");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = GenError::io(
            "src/dao/user_dao.rs",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("src/dao/user_dao.rs"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_connection_is_distinct_from_table_not_found() {
        let conn = GenError::Connection(sqlx::Error::PoolTimedOut);
        assert!(matches!(conn, GenError::Connection(_)));
        assert!(!matches!(conn, GenError::TableNotFound(_)));
    }
}
