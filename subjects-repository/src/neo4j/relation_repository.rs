use async_trait::async_trait;
use neo4rs::{Graph, Query};
use subjects_shared::{Scope, SubjectId, SubjectRelation};
use tracing::{debug, info};
use uuid::Uuid;

use super::{column, timestamp_from_millis};
use crate::errors::SubjectRepositoryError;
use crate::interfaces::RelationStore;
use crate::utils::{scope_key, validate_relation_endpoints};

/// Neo4j-backed relation store over `RELATED_TO` edges.
///
/// Both endpoints are matched and the edge merged in one statement, so a concurrent
/// reset either happens before (no row, not found) or after the edge exists.
pub struct Neo4jRelationRepository {
    graph: Graph,
}

impl Neo4jRelationRepository {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    async fn neighbours(
        &self,
        cypher: &str,
        subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Vec<SubjectId>, SubjectRepositoryError> {
        let kg_version = scope_key(scope)?;
        let query = Query::new(cypher.to_string())
            .param("id", subject_id.as_str())
            .param("kg_version", kg_version);

        let mut result = self.graph.execute(query).await?;
        let mut ids = Vec::new();
        while let Some(row) = result.next().await? {
            ids.push(SubjectId::new(column::<String>(&row, "id")?));
        }
        Ok(ids)
    }
}

#[async_trait]
impl RelationStore for Neo4jRelationRepository {
    async fn create_relation(
        &self,
        subject_id: &SubjectId,
        related_subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<SubjectRelation, SubjectRepositoryError> {
        validate_relation_endpoints(subject_id, related_subject_id)?;
        let kg_version = scope_key(scope)?;

        let query = Query::new(
            "MATCH (a:Subject) WHERE elementId(a) = $subject_id AND a.kg_version = $kg_version \
             MATCH (b:Subject) WHERE elementId(b) = $related_subject_id AND b.kg_version = $kg_version \
             MERGE (a)-[r:RELATED_TO]->(b) \
             ON CREATE SET r.uuid = $uuid, r.created_at = timestamp() \
             RETURN r.uuid = $uuid AS created, r.created_at AS created_at"
                .to_string(),
        )
        .param("subject_id", subject_id.as_str())
        .param("related_subject_id", related_subject_id.as_str())
        .param("kg_version", kg_version)
        .param("uuid", Uuid::new_v4().to_string());

        let mut result = self.graph.execute(query).await?;
        let Some(row) = result.next().await? else {
            debug!(
                subject_id = %subject_id,
                related_subject_id = %related_subject_id,
                "Relation endpoints not found"
            );
            return Err(SubjectRepositoryError::not_found(format!(
                "subject id={} or id={}",
                subject_id, related_subject_id
            )));
        };

        if !column::<bool>(&row, "created")? {
            return Err(SubjectRepositoryError::conflict(format!(
                "relation {} -> {} already exists",
                subject_id, related_subject_id
            )));
        }

        info!(
            subject_id = %subject_id,
            related_subject_id = %related_subject_id,
            "RELATED_TO edge created"
        );

        Ok(SubjectRelation {
            id: None,
            subject_id: subject_id.clone(),
            related_subject_id: related_subject_id.clone(),
            scope: scope.cloned(),
            created_at: timestamp_from_millis(column(&row, "created_at")?)?,
        })
    }

    async fn related_to(
        &self,
        subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Vec<SubjectId>, SubjectRepositoryError> {
        self.neighbours(
            "MATCH (a:Subject)-[r:RELATED_TO]->(b:Subject) \
             WHERE elementId(a) = $id AND a.kg_version = $kg_version \
             RETURN elementId(b) AS id ORDER BY r.created_at",
            subject_id,
            scope,
        )
        .await
    }

    async fn related_from(
        &self,
        subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Vec<SubjectId>, SubjectRepositoryError> {
        self.neighbours(
            "MATCH (a:Subject)-[r:RELATED_TO]->(b:Subject) \
             WHERE elementId(b) = $id AND b.kg_version = $kg_version \
             RETURN elementId(a) AS id ORDER BY r.created_at",
            subject_id,
            scope,
        )
        .await
    }
}
