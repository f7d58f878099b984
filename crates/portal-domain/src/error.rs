//! Error types for portal-domain

use thiserror::Error;

/// Result type alias for record operations
pub type Result<T> = std::result::Result<T, DomainError>;

/// Errors raised by record state changes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Ticket status change to the status it already has
    #[error("Ticket {id} is already {status}")]
    UnchangedStatus { id: String, status: String },

    /// Unknown ticket status name
    #[error("Unknown ticket status: {0}")]
    UnknownStatus(String),

    /// Unknown ticket priority name
    #[error("Unknown ticket priority: {0}")]
    UnknownPriority(String),

    /// Signature pad finished without any strokes
    #[error("Signature is empty")]
    EmptySignature,

    /// Comment without text
    #[error("Comment text is required")]
    EmptyComment,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All validation failures for one record, reported next to their fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Messages reported for one field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was reported.
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
