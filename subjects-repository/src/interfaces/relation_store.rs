use async_trait::async_trait;
use subjects_shared::{Scope, SubjectId, SubjectRelation};

use crate::errors::SubjectRepositoryError;

/// Trait for creating and traversing directed relations between subjects.
///
/// Implementations must evaluate endpoint existence, relation uniqueness and the
/// insert as one backend operation, so two concurrent creates of the same pair
/// cannot both succeed.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Creates the directed relation `subject_id -> related_subject_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(SubjectRelation)` - The persisted edge
    /// * `Err(SubjectRepositoryError::ValidationError)` - If both ids are the same subject
    /// * `Err(SubjectRepositoryError::NotFound)` - If either endpoint is missing from `scope`
    /// * `Err(SubjectRepositoryError::Conflict)` - If the ordered pair already exists
    async fn create_relation(
        &self,
        subject_id: &SubjectId,
        related_subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<SubjectRelation, SubjectRepositoryError>;

    /// Ids of the subjects `subject_id` relates to (outgoing edges), in backend order.
    async fn related_to(
        &self,
        subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Vec<SubjectId>, SubjectRepositoryError>;

    /// Ids of the subjects that relate to `subject_id` (incoming edges), in backend order.
    async fn related_from(
        &self,
        subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Vec<SubjectId>, SubjectRepositoryError>;
}
