//! Error types for portal-core

use thiserror::Error;

use portal_domain::{DomainError, ValidationErrors};

use crate::config::ConfigError;

/// Result type alias for portal operations
pub type Result<T> = std::result::Result<T, PortalError>;

/// Main error type for portal operations
///
/// Every variant is terminal for the user action that raised it; nothing is
/// retried.
#[derive(Error, Debug)]
pub enum PortalError {
    /// Operation on a record id that is no longer present
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Field-level validation failures, shown next to the offending fields
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The user declined a destructive operation
    #[error("Operation cancelled")]
    Declined,

    /// Malformed import file
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// Key/value storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Rejected record state change
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PortalError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        PortalError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be decoded
    #[error("Malformed value under {key}: {message}")]
    Malformed { key: String, message: String },

    /// Records could not be encoded
    #[error("Serialization failed: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialize(err.to_string())
    }
}

/// Import-specific errors
#[derive(Error, Debug)]
pub enum ImportError {
    /// File extension is neither `.json` nor `.csv`
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Malformed JSON document
    #[error("Invalid JSON: {0}")]
    Json(String),

    /// Malformed CSV document
    #[error("Invalid CSV: {0}")]
    Csv(String),

    /// JSON document is not an array of flat objects
    #[error("Expected an array of objects")]
    NotAnArray,

    /// Nothing to import
    #[error("No records found in file")]
    Empty,

    /// A row could not be turned into a record
    #[error("Row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    /// A row produced a record that fails validation
    #[error("Row {row}: {errors}")]
    InvalidRecord { row: usize, errors: ValidationErrors },
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Json(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Csv(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = PortalError::not_found("Party", "P042");
        assert_eq!(err.to_string(), "Party not found: P042");
    }

    #[test]
    fn test_validation_wraps_field_errors() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "Title is required");
        let err: PortalError = errors.into();
        assert_eq!(err.to_string(), "Validation failed: title: Title is required");
    }

    #[test]
    fn test_import_row_message() {
        let err = ImportError::InvalidRow {
            row: 3,
            message: "bad value".to_string(),
        };
        assert_eq!(err.to_string(), "Row 3: bad value");
    }
}
