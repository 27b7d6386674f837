//! In-process implementation of every store trait.
//!
//! Backs unit tests and the `memory` backend of the admin binary. All state lives
//! behind one `RwLock`, so each operation is atomic with respect to the others,
//! including `reset_all`. Ids are decimal counters that keep increasing across
//! resets, so an id handed out before a reset never resolves to a later subject.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use subjects_shared::{CreatePolicy, RelationId, Scope, Subject, SubjectId, SubjectRelation};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SubjectStoreConfig;
use crate::errors::SubjectRepositoryError;
use crate::interfaces::{AdminRepository, RelationStore, SubjectStore};
use crate::utils::{scope_key, validate_name, validate_relation_endpoints};

#[derive(Default)]
struct GraphState {
    next_subject_id: u64,
    next_relation_id: u64,
    subjects: HashMap<SubjectId, Subject>,
    /// `(scope key, name)` to id.
    names: HashMap<(String, String), SubjectId>,
    /// Relations in creation order.
    relations: Vec<SubjectRelation>,
    pairs: HashSet<(SubjectId, SubjectId)>,
}

impl GraphState {
    fn subject_in_scope(&self, id: &SubjectId, kg_version: &str) -> Option<&Subject> {
        self.subjects
            .get(id)
            .filter(|subject| Scope::key(subject.scope.as_ref()) == kg_version)
    }
}

/// A subject graph held entirely in memory.
///
/// Cloning yields another handle on the same graph.
#[derive(Clone, Default)]
pub struct InMemorySubjectGraph {
    state: Arc<RwLock<GraphState>>,
    config: SubjectStoreConfig,
}

impl InMemorySubjectGraph {
    pub fn new(config: SubjectStoreConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(GraphState::default())),
            config,
        }
    }

    /// Number of subjects across all scopes.
    pub async fn subject_count(&self) -> usize {
        self.state.read().await.subjects.len()
    }

    /// Number of relations across all scopes.
    pub async fn relation_count(&self) -> usize {
        self.state.read().await.relations.len()
    }
}

#[async_trait]
impl SubjectStore for InMemorySubjectGraph {
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
        let mut state = self.state.write().await;

        let name_key = (kg_version.to_string(), name.to_string());
        if let Some(existing) = state.names.get(&name_key) {
            return match self.config.create_policy {
                CreatePolicy::StrictInsert => Err(SubjectRepositoryError::conflict(format!(
                    "subject '{}' already exists",
                    name
                ))),
                CreatePolicy::IdempotentMerge => {
                    debug!(subject_id = %existing, name = %name, "Subject already exists, returning it");
                    state.subjects.get(existing).cloned().ok_or_else(|| {
                        SubjectRepositoryError::internal(format!(
                            "name index points at missing subject {}",
                            existing
                        ))
                    })
                }
            };
        }

        state.next_subject_id += 1;
        let subject = Subject {
            id: SubjectId::new(state.next_subject_id.to_string()),
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            scope: scope.cloned(),
            created_at: Utc::now(),
        };
        state.names.insert(name_key, subject.id.clone());
        state.subjects.insert(subject.id.clone(), subject.clone());

        info!(subject_id = %subject.id, name = %name, scope = %kg_version, "Subject stored in memory");
        Ok(subject)
    }

    async fn fetch_subject_by_id(
        &self,
        id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        let kg_version = scope_key(scope)?;
        let state = self.state.read().await;
        state
            .subject_in_scope(id, kg_version)
            .cloned()
            .ok_or_else(|| SubjectRepositoryError::not_found(format!("subject id={}", id)))
    }

    async fn fetch_subject_by_name(
        &self,
        name: &str,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        validate_name(name)?;
        let kg_version = scope_key(scope)?;
        let state = self.state.read().await;
        state
            .names
            .get(&(kg_version.to_string(), name.to_string()))
            .and_then(|id| state.subjects.get(id))
            .cloned()
            .ok_or_else(|| SubjectRepositoryError::not_found(format!("subject name={}", name)))
    }

    async fn fetch_subjects_by_ids(
        &self,
        ids: &[SubjectId],
        scope: Option<&Scope>,
    ) -> Result<Vec<Subject>, SubjectRepositoryError> {
        let kg_version = scope_key(scope)?;
        let state = self.state.read().await;
        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| state.subject_in_scope(id, kg_version).cloned())
            .collect())
    }
}

#[async_trait]
impl RelationStore for InMemorySubjectGraph {
    async fn create_relation(
        &self,
        subject_id: &SubjectId,
        related_subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<SubjectRelation, SubjectRepositoryError> {
        validate_relation_endpoints(subject_id, related_subject_id)?;
        let kg_version = scope_key(scope)?;
        let mut state = self.state.write().await;

        let missing: Vec<String> = [subject_id, related_subject_id]
            .into_iter()
            .filter(|id| state.subject_in_scope(id, kg_version).is_none())
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SubjectRepositoryError::not_found(format!(
                "subject id={}",
                missing.join(", ")
            )));
        }

        let pair = (subject_id.clone(), related_subject_id.clone());
        if state.pairs.contains(&pair) {
            return Err(SubjectRepositoryError::conflict(format!(
                "relation {} -> {} already exists",
                subject_id, related_subject_id
            )));
        }

        state.next_relation_id += 1;
        let relation = SubjectRelation {
            id: Some(RelationId::new(state.next_relation_id.to_string())),
            subject_id: subject_id.clone(),
            related_subject_id: related_subject_id.clone(),
            scope: scope.cloned(),
            created_at: Utc::now(),
        };
        state.pairs.insert(pair);
        state.relations.push(relation.clone());

        info!(
            subject_id = %subject_id,
            related_subject_id = %related_subject_id,
            "Subject relation stored in memory"
        );
        Ok(relation)
    }

    async fn related_to(
        &self,
        subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Vec<SubjectId>, SubjectRepositoryError> {
        let kg_version = scope_key(scope)?;
        let state = self.state.read().await;
        if state.subject_in_scope(subject_id, kg_version).is_none() {
            return Ok(Vec::new());
        }
        Ok(state
            .relations
            .iter()
            .filter(|relation| &relation.subject_id == subject_id)
            .map(|relation| relation.related_subject_id.clone())
            .collect())
    }

    async fn related_from(
        &self,
        subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Vec<SubjectId>, SubjectRepositoryError> {
        let kg_version = scope_key(scope)?;
        let state = self.state.read().await;
        if state.subject_in_scope(subject_id, kg_version).is_none() {
            return Ok(Vec::new());
        }
        Ok(state
            .relations
            .iter()
            .filter(|relation| &relation.related_subject_id == subject_id)
            .map(|relation| relation.subject_id.clone())
            .collect())
    }
}

#[async_trait]
impl AdminRepository for InMemorySubjectGraph {
    async fn ensure_schema(&self) -> Result<(), SubjectRepositoryError> {
        Ok(())
    }

    async fn reset_all(&self) -> Result<(), SubjectRepositoryError> {
        let mut state = self.state.write().await;
        let subjects = state.subjects.len();
        let relations = state.relations.len();
        state.subjects.clear();
        state.names.clear();
        state.relations.clear();
        state.pairs.clear();
        info!(subjects, relations, "Cleared in-memory subject graph");
        Ok(())
    }
}
