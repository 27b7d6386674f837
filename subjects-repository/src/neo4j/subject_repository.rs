use async_trait::async_trait;
use neo4rs::{Graph, Query};
use subjects_shared::{CreatePolicy, Scope, Subject, SubjectId};
use tracing::{debug, info};
use uuid::Uuid;

use super::{SUBJECT_PROJECTION, column, subject_from_row};
use crate::config::SubjectStoreConfig;
use crate::errors::SubjectRepositoryError;
use crate::interfaces::SubjectStore;
use crate::utils::{scope_key, validate_name};

/// Neo4j-backed subject store.
///
/// Strict inserts rely on the `(kg_version, name)` uniqueness constraint created by
/// `Neo4jAdminRepository::ensure_schema` to stay strict under concurrent creates;
/// the guarded `CREATE` alone only covers the sequential case.
pub struct Neo4jSubjectRepository {
    graph: Graph,
    config: SubjectStoreConfig,
}

impl Neo4jSubjectRepository {
    pub fn new(graph: Graph, config: SubjectStoreConfig) -> Self {
        Self { graph, config }
    }

    /// Runs a query expected to yield at most one subject.
    async fn fetch_one(&self, query: Query) -> Result<Option<Subject>, SubjectRepositoryError> {
        let mut result = self.graph.execute(query).await?;
        match result.next().await? {
            Some(row) => Ok(Some(subject_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert_subject(
        &self,
        name: &str,
        kg_version: &str,
    ) -> Result<Subject, SubjectRepositoryError> {
        let query = Query::new(format!(
            "OPTIONAL MATCH (existing:Subject {{name: $name, kg_version: $kg_version}}) \
             WITH existing WHERE existing IS NULL \
             CREATE (n:Subject {{name: $name, kg_version: $kg_version, uuid: $uuid, created_at: timestamp()}}) \
             RETURN {}",
            SUBJECT_PROJECTION
        ))
        .param("name", name)
        .param("kg_version", kg_version)
        .param("uuid", Uuid::new_v4().to_string());

        let conflict =
            || SubjectRepositoryError::conflict(format!("subject '{}' already exists", name));

        let subject = self
            .fetch_one(query)
            .await
            .map_err(|e| match e {
                SubjectRepositoryError::Conflict(_) => conflict(),
                other => other,
            })?
            .ok_or_else(conflict)?;

        info!(subject_id = %subject.id, name = %name, scope = %kg_version, "Subject node created");
        Ok(subject)
    }

    async fn merge_subject(
        &self,
        name: &str,
        kg_version: &str,
    ) -> Result<Subject, SubjectRepositoryError> {
        let uuid = Uuid::new_v4().to_string();
        let query = Query::new(format!(
            "MERGE (n:Subject {{name: $name, kg_version: $kg_version}}) \
             ON CREATE SET n.uuid = $uuid, n.created_at = timestamp() \
             RETURN {}, n.uuid = $uuid AS created",
            SUBJECT_PROJECTION
        ))
        .param("name", name)
        .param("kg_version", kg_version)
        .param("uuid", uuid);

        let mut result = self.graph.execute(query).await?;
        let row = result.next().await?.ok_or_else(|| {
            SubjectRepositoryError::internal(format!("MERGE of subject '{}' returned no record", name))
        })?;
        let subject = subject_from_row(&row)?;

        if column::<bool>(&row, "created")? {
            info!(subject_id = %subject.id, name = %name, scope = %kg_version, "Subject node created");
        } else {
            debug!(subject_id = %subject.id, name = %name, "Subject already exists, returning it");
        }
        Ok(subject)
    }
}

#[async_trait]
impl SubjectStore for Neo4jSubjectRepository {
    fn create_policy(&self) -> CreatePolicy {
        self.config.create_policy
    }

    async fn create_subject(
        &self,
        name: &str,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        validate_name(name)?;
        let kg_version = scope_key(scope)?;

        match self.config.create_policy {
            CreatePolicy::StrictInsert => self.insert_subject(name, kg_version).await,
            CreatePolicy::IdempotentMerge => self.merge_subject(name, kg_version).await,
        }
    }

    async fn fetch_subject_by_id(
        &self,
        id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        let kg_version = scope_key(scope)?;
        let query = Query::new(format!(
            "MATCH (n:Subject) WHERE elementId(n) = $id AND n.kg_version = $kg_version RETURN {}",
            SUBJECT_PROJECTION
        ))
        .param("id", id.as_str())
        .param("kg_version", kg_version);

        let subject = self.fetch_one(query).await?;
        debug!(subject_id = %id, found = subject.is_some(), "Fetched subject by id");
        subject.ok_or_else(|| SubjectRepositoryError::not_found(format!("subject id={}", id)))
    }

    async fn fetch_subject_by_name(
        &self,
        name: &str,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        validate_name(name)?;
        let kg_version = scope_key(scope)?;
        let query = Query::new(format!(
            "MATCH (n:Subject {{name: $name, kg_version: $kg_version}}) RETURN {}",
            SUBJECT_PROJECTION
        ))
        .param("name", name)
        .param("kg_version", kg_version);

        let subject = self.fetch_one(query).await?;
        debug!(name = %name, found = subject.is_some(), "Fetched subject by name");
        subject.ok_or_else(|| SubjectRepositoryError::not_found(format!("subject name={}", name)))
    }

    async fn fetch_subjects_by_ids(
        &self,
        ids: &[SubjectId],
        scope: Option<&Scope>,
    ) -> Result<Vec<Subject>, SubjectRepositoryError> {
        let kg_version = scope_key(scope)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let element_ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let query = Query::new(format!(
            "MATCH (n:Subject) WHERE elementId(n) IN $ids AND n.kg_version = $kg_version RETURN {}",
            SUBJECT_PROJECTION
        ))
        .param("ids", element_ids)
        .param("kg_version", kg_version);

        let mut result = self.graph.execute(query).await?;
        let mut subjects = Vec::with_capacity(ids.len());
        while let Some(row) = result.next().await? {
            subjects.push(subject_from_row(&row)?);
        }
        Ok(subjects)
    }
}
