//! Error types for cfgstore

use crate::types::Type;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cfgstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cfgstore
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid name '{0}': must start with a letter followed by letters, digits or underscores")]
    InvalidName(String),

    #[error("Unsupported value data type")]
    UnsupportedType,

    #[error("Type mismatch for setting '{setting}': expected {expected}, got {actual}")]
    TypeMismatch {
        setting: String,
        expected: Type,
        actual: Type,
    },

    #[error("Invalid {typ} value '{input}': {reason}")]
    InvalidValue {
        typ: Type,
        input: String,
        reason: String,
    },

    #[error("Config '{0}' already exists")]
    ConfigExists(String),

    #[error("Setting '{name}' already exists in config '{config}'")]
    SettingExists { config: String, name: String },

    #[error("Config not found: {0}")]
    ConfigNotFound(String),

    #[error("Setting not found: {0}")]
    SettingNotFound(String),

    // -------------------------------------------------------------------------
    // Integrity Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt row {id} in table '{table}': {reason}")]
    RowCorrupt {
        table: &'static str,
        id: i64,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    #[cfg(feature = "sqlite")]
    #[error("Failed to open database '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[cfg(feature = "sqlite")]
    #[error("Failed to create {table} table: {source}")]
    Bootstrap {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[cfg(feature = "sqlite")]
    #[error("Failed to prepare '{statement}' statement: {source}")]
    Prepare {
        statement: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[cfg(feature = "sqlite")]
    #[error("Failed to {operation}: {source}")]
    Execute {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[cfg(feature = "sqlite")]
    #[error("Failed to scan {entity}: {source}")]
    Scan {
        entity: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Store options error: {0}")]
    Options(String),

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ConfigNotFound(_) | Error::SettingNotFound(_))
    }

    /// Check if the error was caused by the caller's input.
    ///
    /// Retrying such an operation without changing the input fails the same way.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidName(_)
                | Error::UnsupportedType
                | Error::TypeMismatch { .. }
                | Error::InvalidValue { .. }
                | Error::ConfigExists(_)
                | Error::SettingExists { .. }
                | Error::ConfigNotFound(_)
                | Error::SettingNotFound(_)
        )
    }

    /// Check if the error came from the storage backend (open, bootstrap,
    /// prepare, execute or scan phase)
    #[must_use]
    pub fn is_backend_error(&self) -> bool {
        #[cfg(feature = "sqlite")]
        {
            matches!(
                self,
                Error::Open { .. }
                    | Error::Bootstrap { .. }
                    | Error::Prepare { .. }
                    | Error::Execute { .. }
                    | Error::Scan { .. }
            )
        }

        #[cfg(not(feature = "sqlite"))]
        {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message_names_both_types() {
        let err = Error::TypeMismatch {
            setting: "max_retries".into(),
            expected: Type::Int32,
            actual: Type::String,
        };

        assert_eq!(
            err.to_string(),
            "Type mismatch for setting 'max_retries': expected int32, got string"
        );
        assert!(err.is_caller_error());
        assert!(!err.is_backend_error());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(Error::ConfigNotFound("billing".into()).is_not_found());
        assert!(Error::SettingNotFound("7".into()).is_not_found());
        assert!(!Error::UnsupportedType.is_not_found());
    }

    #[test]
    fn test_row_corrupt_is_neither_caller_nor_backend() {
        let err = Error::RowCorrupt {
            table: "settings",
            id: 3,
            reason: "no value column populated".into(),
        };

        assert!(!err.is_caller_error());
        assert!(!err.is_backend_error());
        assert!(err.to_string().contains("settings"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_bootstrap_message_identifies_table() {
        let err = Error::Bootstrap {
            table: "settings",
            source: rusqlite::Error::InvalidQuery,
        };

        assert!(err.to_string().starts_with("Failed to create settings table"));
        assert!(err.is_backend_error());
    }
}
