//! Subject graph service implementation.
//!
//! This module provides the facade application code uses to work with subjects
//! and relations. Every operation takes an [`OperationContext`] and is bounded by
//! its deadline (or the configured default) and its cancellation signal.

use std::collections::HashMap;
use std::sync::Arc;

use subjects_shared::{
    CreatePolicy, KnowledgeGraph, KnowledgeGraphNode, Scope, Subject, SubjectId, SubjectLookup,
    SubjectRelation, SubjectView,
};
use tracing::{debug, info};

use crate::config::{SubjectGraphServiceConfig, SubjectStoreConfig};
use crate::context::OperationContext;
use crate::errors::SubjectRepositoryError;
use crate::interfaces::{AdminRepository, RelationStore, SubjectStore};
use crate::memory::InMemorySubjectGraph;
use crate::neo4j::{Neo4jAdminRepository, Neo4jRelationRepository, Neo4jSubjectRepository};
use crate::postgres::{PostgresAdminRepository, PostgresRelationRepository, PostgresSubjectRepository};
use crate::query::GraphQueryEngine;
use crate::types::ImportSummary;
use crate::utils::{scope_key, validate_name};

/// The main service for interacting with the subject graph.
///
/// Wraps one backend's three stores and the query engine built on them. Calls are
/// independent: each store call acquires and releases its own connection or
/// session, and nothing is shared between calls besides the pools.
///
/// # Example
///
/// ```no_run
/// use subjects_repository::{OperationContext, SubjectGraphService, SubjectStoreConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = SubjectGraphService::in_memory(SubjectStoreConfig::default());
/// let ctx = OperationContext::new();
///
/// let physics = service.create_subject(&ctx, "Physics", None).await?;
/// let maths = service.create_subject(&ctx, "Mathematics", None).await?;
/// service.create_relation(&ctx, &physics.id, &maths.id, None).await?;
/// # Ok(())
/// # }
/// ```
pub struct SubjectGraphService {
    subjects: Arc<dyn SubjectStore>,
    relations: Arc<dyn RelationStore>,
    admin: Arc<dyn AdminRepository>,
    query: GraphQueryEngine,
    config: SubjectGraphServiceConfig,
}

impl SubjectGraphService {
    /// Create a new SubjectGraphService with default configuration.
    ///
    /// The default configuration bounds every operation to 30 seconds.
    pub fn new(
        subjects: Arc<dyn SubjectStore>,
        relations: Arc<dyn RelationStore>,
        admin: Arc<dyn AdminRepository>,
    ) -> Self {
        Self::with_config(
            subjects,
            relations,
            admin,
            SubjectGraphServiceConfig::default(),
        )
    }

    /// Create a new SubjectGraphService with custom configuration.
    pub fn with_config(
        subjects: Arc<dyn SubjectStore>,
        relations: Arc<dyn RelationStore>,
        admin: Arc<dyn AdminRepository>,
        config: SubjectGraphServiceConfig,
    ) -> Self {
        let query = GraphQueryEngine::new(subjects.clone(), relations.clone());
        Self {
            subjects,
            relations,
            admin,
            query,
            config,
        }
    }

    /// Service over a fresh in-memory graph.
    pub fn in_memory(store_config: SubjectStoreConfig) -> Self {
        let graph = Arc::new(InMemorySubjectGraph::new(store_config));
        Self::new(graph.clone(), graph.clone(), graph)
    }

    /// Service over a PostgreSQL pool.
    pub async fn postgres(
        pool: sqlx::PgPool,
        store_config: SubjectStoreConfig,
        config: SubjectGraphServiceConfig,
    ) -> Result<Self, SubjectRepositoryError> {
        let subjects = PostgresSubjectRepository::new(pool.clone(), store_config).await?;
        let relations = PostgresRelationRepository::new(pool.clone()).await?;
        let admin = PostgresAdminRepository::new(pool).await?;
        Ok(Self::with_config(
            Arc::new(subjects),
            Arc::new(relations),
            Arc::new(admin),
            config,
        ))
    }

    /// Service over a Neo4j connection pool.
    pub fn neo4j(
        graph: neo4rs::Graph,
        store_config: SubjectStoreConfig,
        config: SubjectGraphServiceConfig,
    ) -> Self {
        Self::with_config(
            Arc::new(Neo4jSubjectRepository::new(graph.clone(), store_config)),
            Arc::new(Neo4jRelationRepository::new(graph.clone())),
            Arc::new(Neo4jAdminRepository::new(graph)),
            config,
        )
    }

    pub fn create_policy(&self) -> CreatePolicy {
        self.subjects.create_policy()
    }

    pub fn query_engine(&self) -> &GraphQueryEngine {
        &self.query
    }

    /// Create a subject. What a duplicate name does depends on the store's [`CreatePolicy`].
    ///
    /// # Returns
    ///
    /// * `Ok(Subject)` - The created subject (or the existing one under the merge policy)
    /// * `Err(SubjectRepositoryError::ValidationError)` - If the name is empty
    /// * `Err(SubjectRepositoryError::Conflict)` - If the name is taken under the strict policy
    pub async fn create_subject(
        &self,
        ctx: &OperationContext,
        name: &str,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        ctx.run(
            self.config.default_timeout,
            self.subjects.create_subject(name, scope),
        )
        .await
    }

    pub async fn fetch_subject_by_id(
        &self,
        ctx: &OperationContext,
        id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        ctx.run(
            self.config.default_timeout,
            self.subjects.fetch_subject_by_id(id, scope),
        )
        .await
    }

    pub async fn fetch_subject_by_name(
        &self,
        ctx: &OperationContext,
        name: &str,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        ctx.run(
            self.config.default_timeout,
            self.subjects.fetch_subject_by_name(name, scope),
        )
        .await
    }

    /// Fetch every subject in `ids` that exists in `scope`; unknown ids are left out.
    pub async fn fetch_subjects_by_ids(
        &self,
        ctx: &OperationContext,
        ids: &[SubjectId],
        scope: Option<&Scope>,
    ) -> Result<Vec<Subject>, SubjectRepositoryError> {
        ctx.run(
            self.config.default_timeout,
            self.subjects.fetch_subjects_by_ids(ids, scope),
        )
        .await
    }

    /// Return the subject named `name`, creating it first if it does not exist.
    ///
    /// Behaves the same under both create policies.
    pub async fn fetch_or_create(
        &self,
        ctx: &OperationContext,
        name: &str,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        ctx.run(
            self.config.default_timeout,
            self.fetch_or_create_subject(name, scope),
        )
        .await
        .map(|(subject, _)| subject)
    }

    /// Create the directed relation `subject_id -> related_subject_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(SubjectRelation)` - The created relation
    /// * `Err(SubjectRepositoryError::ValidationError)` - If both ids are the same
    /// * `Err(SubjectRepositoryError::NotFound)` - If either subject is missing from `scope`
    /// * `Err(SubjectRepositoryError::Conflict)` - If the relation already exists
    pub async fn create_relation(
        &self,
        ctx: &OperationContext,
        subject_id: &SubjectId,
        related_subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<SubjectRelation, SubjectRepositoryError> {
        ctx.run(
            self.config.default_timeout,
            self.relations
                .create_relation(subject_id, related_subject_id, scope),
        )
        .await
    }

    /// Return a subject with the ids it relates to and from.
    ///
    /// The view is a best-effort composite; see [`GraphQueryEngine`].
    pub async fn get_with_relations(
        &self,
        ctx: &OperationContext,
        lookup: &SubjectLookup,
        scope: Option<&Scope>,
    ) -> Result<SubjectView, SubjectRepositoryError> {
        ctx.run(
            self.config.default_timeout,
            self.query.get_with_relations(lookup, scope),
        )
        .await
    }

    /// Return the subgraph made of a subject and its direct neighbours, by name.
    ///
    /// Each node lists the names of the nodes it relates to, restricted to the
    /// returned node set. Built from the same non-transactional reads as
    /// [`Self::get_with_relations`].
    pub async fn knowledge_graph_for(
        &self,
        ctx: &OperationContext,
        lookup: &SubjectLookup,
        scope: Option<&Scope>,
    ) -> Result<KnowledgeGraph, SubjectRepositoryError> {
        ctx.run(
            self.config.default_timeout,
            self.neighbourhood(lookup, scope),
        )
        .await
    }

    /// Populate the graph from a name-based document.
    ///
    /// Every name is validated before anything is written. Subjects are
    /// fetched-or-created, then every relation is created; relations that already
    /// exist are skipped. The whole import shares one deadline; a deadline or a
    /// cancellation in the middle leaves the steps already done in place.
    pub async fn import_knowledge_graph(
        &self,
        ctx: &OperationContext,
        graph: &KnowledgeGraph,
        scope: Option<&Scope>,
    ) -> Result<ImportSummary, SubjectRepositoryError> {
        ctx.run(self.config.default_timeout, self.import(graph, scope))
            .await
    }

    /// Delete every subject and relation in every scope.
    pub async fn reset_all(&self, ctx: &OperationContext) -> Result<(), SubjectRepositoryError> {
        ctx.run(self.config.default_timeout, self.admin.reset_all())
            .await
    }

    /// Create the backend schema if it is missing.
    pub async fn ensure_schema(&self, ctx: &OperationContext) -> Result<(), SubjectRepositoryError> {
        ctx.run(self.config.default_timeout, self.admin.ensure_schema())
            .await
    }

    /// Returns the subject and whether this call created it.
    async fn fetch_or_create_subject(
        &self,
        name: &str,
        scope: Option<&Scope>,
    ) -> Result<(Subject, bool), SubjectRepositoryError> {
        match self.subjects.fetch_subject_by_name(name, scope).await {
            Ok(subject) => return Ok((subject, false)),
            Err(SubjectRepositoryError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        match self.subjects.create_subject(name, scope).await {
            Ok(subject) => Ok((subject, true)),
            // A concurrent create won the name.
            Err(SubjectRepositoryError::Conflict(_)) => {
                let subject = self.subjects.fetch_subject_by_name(name, scope).await?;
                Ok((subject, false))
            }
            Err(e) => Err(e),
        }
    }

    async fn import(
        &self,
        graph: &KnowledgeGraph,
        scope: Option<&Scope>,
    ) -> Result<ImportSummary, SubjectRepositoryError> {
        scope_key(scope)?;
        let names = graph.subject_names();
        for name in &names {
            validate_name(name)?;
        }

        let mut summary = ImportSummary::default();
        let mut ids: HashMap<&str, SubjectId> = HashMap::with_capacity(names.len());
        for name in names {
            let (subject, created) = self.fetch_or_create_subject(name, scope).await?;
            if created {
                summary.subjects_created += 1;
            } else {
                summary.subjects_existing += 1;
            }
            ids.insert(name, subject.id);
        }

        for (name, related) in graph.relation_pairs() {
            let (Some(source), Some(target)) = (ids.get(name), ids.get(related)) else {
                return Err(SubjectRepositoryError::internal(format!(
                    "subject '{}' or '{}' was not resolved during import",
                    name, related
                )));
            };
            if source == target {
                debug!(name = %name, "Skipping self-reference in knowledge graph");
                summary.relations_skipped += 1;
                continue;
            }

            match self.relations.create_relation(source, target, scope).await {
                Ok(_) => summary.relations_created += 1,
                Err(SubjectRepositoryError::Conflict(_)) => {
                    debug!(name = %name, related = %related, "Relation already exists, skipping");
                    summary.relations_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            subjects_created = summary.subjects_created,
            subjects_existing = summary.subjects_existing,
            relations_created = summary.relations_created,
            relations_skipped = summary.relations_skipped,
            "Knowledge graph imported"
        );
        Ok(summary)
    }

    async fn neighbourhood(
        &self,
        lookup: &SubjectLookup,
        scope: Option<&Scope>,
    ) -> Result<KnowledgeGraph, SubjectRepositoryError> {
        let view = self.query.get_with_relations(lookup, scope).await?;

        let mut node_ids = vec![view.subject.id.clone()];
        for id in view.related_to.iter().chain(view.related_from.iter()) {
            if !node_ids.contains(id) {
                node_ids.push(id.clone());
            }
        }

        let mut names: HashMap<SubjectId, String> = HashMap::with_capacity(node_ids.len());
        names.insert(view.subject.id.clone(), view.subject.name.clone());
        for neighbour in self
            .subjects
            .fetch_subjects_by_ids(&node_ids[1..], scope)
            .await?
        {
            names.insert(neighbour.id, neighbour.name);
        }

        let mut subjects = Vec::with_capacity(node_ids.len());
        for id in &node_ids {
            // Gone since the view was read.
            let Some(name) = names.get(id) else {
                continue;
            };
            let outgoing = if id == &view.subject.id {
                view.related_to.clone()
            } else {
                self.relations.related_to(id, scope).await?
            };
            let related_subjects = outgoing
                .iter()
                .filter_map(|target| names.get(target).cloned())
                .collect();
            subjects.push(KnowledgeGraphNode::new(name.clone(), related_subjects));
        }

        Ok(KnowledgeGraph { subjects })
    }
}
