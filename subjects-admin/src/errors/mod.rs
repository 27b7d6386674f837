//! Error types for the subjects admin binary.

use subjects_repository::SubjectRepositoryError;
use thiserror::Error;

/// Errors that can occur while configuring or running an admin command.
#[derive(Error, Debug)]
pub enum AdminError {
    /// Missing or malformed environment configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The command line could not be understood.
    #[error("Usage error: {0}")]
    UsageError(String),

    /// A knowledge-graph file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A knowledge-graph file or command output could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The subject store rejected or failed the operation.
    #[error("Repository error: {0}")]
    Repository(#[from] SubjectRepositoryError),
}

impl AdminError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::UsageError(msg.into())
    }
}
