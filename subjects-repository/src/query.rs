//! Read-side composition of subjects and their relations.

use std::sync::Arc;

use subjects_shared::{Scope, Subject, SubjectLookup, SubjectView};
use tracing::debug;

use crate::errors::SubjectRepositoryError;
use crate::interfaces::{RelationStore, SubjectStore};

/// Builds [`SubjectView`]s out of a subject store and a relation store.
///
/// # Consistency
///
/// A view is assembled from three independent backend reads (the subject, its
/// outgoing edges, its incoming edges) with no transaction spanning them. A
/// relation created or a reset run concurrently may show up in one list and not
/// the other, and the neighbour ids may refer to subjects that no longer exist by
/// the time the caller reads them. Views are best-effort composites.
#[derive(Clone)]
pub struct GraphQueryEngine {
    subjects: Arc<dyn SubjectStore>,
    relations: Arc<dyn RelationStore>,
}

impl GraphQueryEngine {
    pub fn new(subjects: Arc<dyn SubjectStore>, relations: Arc<dyn RelationStore>) -> Self {
        Self {
            subjects,
            relations,
        }
    }

    /// Resolves a lookup to the subject it names.
    pub async fn resolve(
        &self,
        lookup: &SubjectLookup,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        match lookup {
            SubjectLookup::Id(id) => self.subjects.fetch_subject_by_id(id, scope).await,
            SubjectLookup::Name(name) => self.subjects.fetch_subject_by_name(name, scope).await,
        }
    }

    /// Returns the subject together with the ids it relates to and from.
    ///
    /// # Returns
    ///
    /// * `Ok(SubjectView)` - The subject and both neighbour lists
    /// * `Err(SubjectRepositoryError::NotFound)` - If the subject does not exist in `scope`
    pub async fn get_with_relations(
        &self,
        lookup: &SubjectLookup,
        scope: Option<&Scope>,
    ) -> Result<SubjectView, SubjectRepositoryError> {
        let subject = self.resolve(lookup, scope).await?;
        let related_to = self.relations.related_to(&subject.id, scope).await?;
        let related_from = self.relations.related_from(&subject.id, scope).await?;

        debug!(
            subject_id = %subject.id,
            related_to = related_to.len(),
            related_from = related_from.len(),
            "Composed subject view"
        );

        Ok(SubjectView {
            subject,
            related_to,
            related_from,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::memory::InMemorySubjectGraph;
    use subjects_shared::SubjectId;

    fn engine(graph: &InMemorySubjectGraph) -> GraphQueryEngine {
        GraphQueryEngine::new(Arc::new(graph.clone()), Arc::new(graph.clone()))
    }

    #[tokio::test]
    async fn test_view_reports_both_directions() {
        let graph = InMemorySubjectGraph::default();
        let a = graph.create_subject("A", None).await.unwrap();
        let b = graph.create_subject("B", None).await.unwrap();
        graph.create_relation(&a.id, &b.id, None).await.unwrap();

        let engine = engine(&graph);
        let view_a = engine
            .get_with_relations(&SubjectLookup::from(&a.id), None)
            .await
            .unwrap();
        assert_eq!(view_a.subject, a);
        assert_eq!(view_a.related_to, vec![b.id.clone()]);
        assert!(view_a.related_from.is_empty());

        let view_b = engine
            .get_with_relations(&SubjectLookup::Name("B".to_string()), None)
            .await
            .unwrap();
        assert!(view_b.related_to.is_empty());
        assert_eq!(view_b.related_from, vec![a.id.clone()]);
    }

    #[tokio::test]
    async fn test_unknown_subject_is_not_found() {
        let graph = InMemorySubjectGraph::default();
        let engine = engine(&graph);

        let err = engine
            .get_with_relations(&SubjectLookup::Id(SubjectId::new("42")), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = engine
            .get_with_relations(&SubjectLookup::Name("Missing".to_string()), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_view_is_scoped() {
        let graph = InMemorySubjectGraph::default();
        let v1 = Scope::new("v1");
        let a = graph.create_subject("A", Some(&v1)).await.unwrap();

        let engine = engine(&graph);
        let err = engine
            .get_with_relations(&SubjectLookup::Name("A".to_string()), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let view = engine
            .get_with_relations(&SubjectLookup::Name("A".to_string()), Some(&v1))
            .await
            .unwrap();
        assert_eq!(view.subject.id, a.id);
    }
}
