//! Error type for the command line front end.

use std::io;

use thiserror::Error;

use portal_core::{ConfigError, PortalError, StorageError};
use portal_domain::DomainError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("No data directory could be determined; pass --data-dir")]
    NoDataDir,

    #[error("Invalid assignment '{0}', expected FIELD=VALUE")]
    Assignment(String),

    #[error("{entity} records do not support '{command}'")]
    Unsupported {
        entity: &'static str,
        command: &'static str,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Whether the page controller already reported this through its notifier.
    pub fn is_reported(&self) -> bool {
        matches!(self, CliError::Portal(err) if !matches!(err, PortalError::Config(_)))
    }

    /// A declined confirmation is not a failure.
    pub fn is_declined(&self) -> bool {
        matches!(self, CliError::Portal(PortalError::Declined))
    }
}
