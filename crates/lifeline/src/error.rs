//! Error types for lifeline.
//!
//! This module defines all error types used throughout the lifeline crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lifeline operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Session Errors ===
    /// An operation needs a signed-in user and there is none.
    #[error("not signed in")]
    NotSignedIn,

    /// The given user id is not known to the record store.
    #[error("unknown user: {user_id}")]
    UnknownUser {
        /// The rejected user id.
        user_id: String,
    },

    // === Record Errors ===
    /// A form field failed validation.
    #[error("{field} is required")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A value could not be parsed.
    #[error("invalid {kind}: {value}")]
    InvalidValue {
        /// What was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// The user has no profile row.
    #[error("no profile exists for user {user_id}")]
    ProfileNotFound {
        /// The owning user.
        user_id: String,
    },

    /// The contact does not exist or belongs to another user.
    #[error("contact not found: {contact_id}")]
    ContactNotFound {
        /// The requested contact id.
        contact_id: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for lifeline operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a required-field validation error.
    #[must_use]
    pub fn required(field: &'static str) -> Self {
        Self::Validation { field }
    }

    /// Create a parse error for the given kind of value.
    #[must_use]
    pub fn invalid_value(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            kind,
            value: value.into(),
        }
    }

    /// Check if this error means nobody is signed in.
    #[must_use]
    pub fn is_not_signed_in(&self) -> bool {
        matches!(self, Self::NotSignedIn)
    }

    /// Check if this error is a form validation failure.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidValue { .. })
    }

    /// Check if this error reports a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProfileNotFound { .. } | Self::ContactNotFound { .. } | Self::UnknownUser { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotSignedIn;
        assert_eq!(err.to_string(), "not signed in");

        let err = Error::required("full_name");
        assert_eq!(err.to_string(), "full_name is required");
    }

    #[test]
    fn test_error_is_not_signed_in() {
        assert!(Error::NotSignedIn.is_not_signed_in());
        assert!(!Error::internal("test").is_not_signed_in());
    }

    #[test]
    fn test_error_is_validation_error() {
        assert!(Error::required("phone").is_validation_error());
        assert!(Error::invalid_value("blood type", "C+").is_validation_error());
        assert!(!Error::NotSignedIn.is_validation_error());
    }

    #[test]
    fn test_error_is_not_found() {
        let err = Error::ContactNotFound {
            contact_id: "abc".to_string(),
        };
        assert!(err.is_not_found());
        assert!(Error::ProfileNotFound {
            user_id: "u".to_string()
        }
        .is_not_found());
        assert!(!Error::NotSignedIn.is_not_found());
    }

    #[test]
    fn test_invalid_value_display() {
        let err = Error::invalid_value("blood type", "C+");
        assert_eq!(err.to_string(), "invalid blood type: C+");
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_unknown_user_display() {
        let err = Error::UnknownUser {
            user_id: "1234".to_string(),
        };
        assert!(err.to_string().contains("1234"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "busy_timeout_ms must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("busy_timeout_ms"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
