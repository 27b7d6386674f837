//! Subject repository error types.
//!
//! Every backend failure is classified into one of a small set of kinds so the
//! caller can decide how to surface it (client error, server error, retry) without
//! knowing which backend produced it.

use thiserror::Error;
use tracing::warn;

/// Classification of a [`SubjectRepositoryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    StoreUnavailable,
    Cancelled,
    Internal,
}

/// Unified errors from subject and relation store operations.
///
/// Used by every store trait, the query engine and the service facade.
#[derive(Debug, Clone, Error)]
pub enum SubjectRepositoryError {
    /// Malformed or empty input. Never retried.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A referenced subject does not exist in the requested scope.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A create would violate a uniqueness rule.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend could not be reached or did not answer in time.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The caller cancelled the operation before it completed.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// The backend answered with something the store did not expect.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SubjectRepositoryError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a store unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create a cancelled error.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationError(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may retry the whole operation.
    ///
    /// Only transient backend failures qualify. The stores themselves never retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Whether the failure is the caller's fault (bad input, missing or duplicate entity).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::NotFound(_) | Self::Conflict(_)
        )
    }
}

impl From<sqlx::Error> for SubjectRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Self::NotFound(db_err.message().to_string())
            }
            // Class 22 covers data exceptions such as an over-long value.
            sqlx::Error::Database(db_err)
                if db_err.is_check_violation()
                    || db_err.code().is_some_and(|code| code.starts_with("22")) =>
            {
                Self::ValidationError(db_err.message().to_string())
            }
            sqlx::Error::RowNotFound => Self::NotFound(err.to_string()),
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => {
                warn!(error = %err, "PostgreSQL unavailable");
                Self::StoreUnavailable(err.to_string())
            }
            _ => {
                warn!(error = %err, "Unexpected PostgreSQL error");
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<sqlx::migrate::MigrateError> for SubjectRepositoryError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Internal(format!("migration failed: {}", err))
    }
}

impl From<neo4rs::Error> for SubjectRepositoryError {
    fn from(err: neo4rs::Error) -> Self {
        let message = err.to_string();
        match err {
            neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError => {
                warn!(error = %message, "Neo4j unavailable");
                Self::StoreUnavailable(message)
            }
            _ if message.contains("ConstraintValidationFailed") => Self::Conflict(message),
            _ if message.contains("ServiceUnavailable") || message.contains("TransientError") => {
                warn!(error = %message, "Neo4j unavailable");
                Self::StoreUnavailable(message)
            }
            _ => {
                warn!(error = %message, "Unexpected Neo4j error");
                Self::Internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_retryability() {
        let err = SubjectRepositoryError::unavailable("pool timed out");
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert!(err.is_retryable());
        assert!(!err.is_client_error());

        let err = SubjectRepositoryError::conflict("duplicate");
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(!err.is_retryable());
        assert!(err.is_client_error());

        assert!(!SubjectRepositoryError::internal("missing property").is_client_error());
        assert!(!SubjectRepositoryError::cancelled("caller gave up").is_retryable());
    }

    #[test]
    fn test_sqlx_classification() {
        assert_eq!(
            SubjectRepositoryError::from(sqlx::Error::RowNotFound).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            SubjectRepositoryError::from(sqlx::Error::PoolTimedOut).kind(),
            ErrorKind::StoreUnavailable
        );
        assert_eq!(
            SubjectRepositoryError::from(sqlx::Error::ColumnNotFound("uuid".into())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_display_keeps_message() {
        let err = SubjectRepositoryError::not_found("subject id=42");
        assert_eq!(err.to_string(), "Not found: subject id=42");
    }
}
