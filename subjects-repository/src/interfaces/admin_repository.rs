use async_trait::async_trait;

use crate::errors::SubjectRepositoryError;

/// Full-store administrative access, for environment setup and test isolation.
///
/// This is the only component allowed to touch both subject and relation storage.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Creates the backend schema if it is missing. Safe to call repeatedly.
    async fn ensure_schema(&self) -> Result<(), SubjectRepositoryError>;

    /// Deletes every subject and every relation, in every scope.
    ///
    /// Relations are removed together with (never after) the subjects they point at,
    /// so a concurrent reader never observes a dangling edge. Succeeds on an empty store.
    async fn reset_all(&self) -> Result<(), SubjectRepositoryError>;
}
