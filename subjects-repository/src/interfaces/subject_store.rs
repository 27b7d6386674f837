//! This module defines the `SubjectStore` trait, which abstracts creation and
//! lookup of subjects over the underlying backend.

use async_trait::async_trait;
use subjects_shared::{CreatePolicy, Scope, Subject, SubjectId};

use crate::errors::SubjectRepositoryError;

/// A trait that defines the interface for storing and fetching subjects.
///
/// Implementations own the subject rows/nodes of their backend. Each call acquires
/// its own connection or session and releases it before returning; nothing is
/// cached between calls.
///
/// Names are unique per scope. What happens when a create hits an existing name is
/// decided by the store's configured [`CreatePolicy`].
#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// The creation policy this store was configured with.
    fn create_policy(&self) -> CreatePolicy;

    /// Creates a subject named `name` in `scope`.
    ///
    /// # Returns
    ///
    /// * `Ok(Subject)` - The new subject, or the existing one under the merge policy
    /// * `Err(SubjectRepositoryError::ValidationError)` - If `name` is empty
    /// * `Err(SubjectRepositoryError::Conflict)` - If the name is taken under the strict policy
    async fn create_subject(
        &self,
        name: &str,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError>;

    /// Fetches a subject by its identifier.
    ///
    /// An id that does not exist, belongs to another scope, or is not even a
    /// well-formed token for this backend yields `NotFound`.
    async fn fetch_subject_by_id(
        &self,
        id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError>;

    /// Fetches a subject by name.
    ///
    /// # Returns
    ///
    /// * `Ok(Subject)` - The subject with that name in `scope`
    /// * `Err(SubjectRepositoryError::ValidationError)` - If `name` is empty
    /// * `Err(SubjectRepositoryError::NotFound)` - If no such subject exists
    async fn fetch_subject_by_name(
        &self,
        name: &str,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError>;

    /// Fetches every subject whose id is in `ids`. Unknown ids are skipped.
    async fn fetch_subjects_by_ids(
        &self,
        ids: &[SubjectId],
        scope: Option<&Scope>,
    ) -> Result<Vec<Subject>, SubjectRepositoryError>;
}
