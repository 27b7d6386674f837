//! PostgreSQL implementation of the `SubjectStore`.

use async_trait::async_trait;
use subjects_shared::{CreatePolicy, Scope, Subject, SubjectId};
use tracing::{debug, info};
use uuid::Uuid;

use super::{SubjectRow, surrogate_key};
use crate::config::SubjectStoreConfig;
use crate::errors::SubjectRepositoryError;
use crate::interfaces::SubjectStore;
use crate::utils::{scope_key, validate_name};

/// PostgreSQL-backed subject store.
///
/// Every statement runs directly on the pool, so a connection is held only for
/// the duration of one statement.
pub struct PostgresSubjectRepository {
    pool: sqlx::PgPool,
    config: SubjectStoreConfig,
}

impl PostgresSubjectRepository {
    /// Creates a new PostgreSQL subject repository.
    ///
    /// # Arguments
    ///
    /// * `pool` - Connection pool on a database with the `subject` table migrated
    /// * `config` - Store configuration, notably the create policy
    pub async fn new(
        pool: sqlx::PgPool,
        config: SubjectStoreConfig,
    ) -> Result<Self, SubjectRepositoryError> {
        Ok(Self { pool, config })
    }

    /// Plain insert; the `(kg_version, name)` constraint turns a duplicate into a conflict.
    async fn insert_subject(
        &self,
        name: &str,
        kg_version: &str,
    ) -> Result<Subject, SubjectRepositoryError> {
        let row = sqlx::query_as::<_, SubjectRow>(
            r#"
            INSERT INTO subject (uuid, name, kg_version)
            VALUES ($1, $2, $3)
            RETURNING id, uuid, name, kg_version, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(kg_version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match SubjectRepositoryError::from(e) {
            SubjectRepositoryError::Conflict(_) => SubjectRepositoryError::conflict(format!(
                "subject '{}' already exists",
                name
            )),
            other => other,
        })?;

        info!(subject_id = row.id, name = %row.name, scope = %kg_version, "Subject record inserted");
        Ok(row.into())
    }

    /// Insert-or-return. `ON CONFLICT DO NOTHING` decides atomically; the follow-up
    /// read only runs when another writer already owns the name.
    async fn merge_subject(
        &self,
        name: &str,
        kg_version: &str,
    ) -> Result<Subject, SubjectRepositoryError> {
        let inserted = sqlx::query_as::<_, SubjectRow>(
            r#"
            INSERT INTO subject (uuid, name, kg_version)
            VALUES ($1, $2, $3)
            ON CONFLICT (kg_version, name) DO NOTHING
            RETURNING id, uuid, name, kg_version, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(kg_version)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            info!(subject_id = row.id, name = %row.name, scope = %kg_version, "Subject record inserted");
            return Ok(row.into());
        }

        match self.select_by_name(name, kg_version).await? {
            Some(existing) => {
                debug!(subject_id = %existing.id, name = %name, "Subject already exists, returning it");
                Ok(existing)
            }
            // Only a concurrent reset can remove the row between the two statements.
            None => Err(SubjectRepositoryError::conflict(format!(
                "subject '{}' was removed while being merged",
                name
            ))),
        }
    }

    async fn select_by_name(
        &self,
        name: &str,
        kg_version: &str,
    ) -> Result<Option<Subject>, SubjectRepositoryError> {
        let row = sqlx::query_as::<_, SubjectRow>(
            "SELECT id, uuid, name, kg_version, created_at FROM subject WHERE kg_version = $1 AND name = $2",
        )
        .bind(kg_version)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Subject::from))
    }
}

#[async_trait]
impl SubjectStore for PostgresSubjectRepository {
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
        let not_found = || SubjectRepositoryError::not_found(format!("subject id={}", id));
        let key = surrogate_key(id).ok_or_else(not_found)?;

        let row = sqlx::query_as::<_, SubjectRow>(
            "SELECT id, uuid, name, kg_version, created_at FROM subject WHERE id = $1 AND kg_version = $2",
        )
        .bind(key)
        .bind(kg_version)
        .fetch_optional(&self.pool)
        .await?;

        debug!(subject_id = %id, found = row.is_some(), "Fetched subject by id");
        row.map(Subject::from).ok_or_else(not_found)
    }

    async fn fetch_subject_by_name(
        &self,
        name: &str,
        scope: Option<&Scope>,
    ) -> Result<Subject, SubjectRepositoryError> {
        validate_name(name)?;
        let kg_version = scope_key(scope)?;

        let subject = self.select_by_name(name, kg_version).await?;
        debug!(name = %name, found = subject.is_some(), "Fetched subject by name");
        subject.ok_or_else(|| SubjectRepositoryError::not_found(format!("subject name={}", name)))
    }

    async fn fetch_subjects_by_ids(
        &self,
        ids: &[SubjectId],
        scope: Option<&Scope>,
    ) -> Result<Vec<Subject>, SubjectRepositoryError> {
        let kg_version = scope_key(scope)?;
        let keys: Vec<i32> = ids.iter().filter_map(surrogate_key).collect();
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, SubjectRow>(
            r#"
            SELECT id, uuid, name, kg_version, created_at
            FROM subject
            WHERE id = ANY($1) AND kg_version = $2
            "#,
        )
        .bind(&keys)
        .bind(kg_version)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Subject::from).collect())
    }
}
