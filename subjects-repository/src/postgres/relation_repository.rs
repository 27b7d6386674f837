//! PostgreSQL implementation of the `RelationStore`.

use async_trait::async_trait;
use subjects_shared::{Scope, SubjectId, SubjectRelation};
use tracing::{debug, info};

use super::{RelationRow, surrogate_key};
use crate::errors::SubjectRepositoryError;
use crate::interfaces::RelationStore;
use crate::utils::{scope_key, validate_relation_endpoints};

/// PostgreSQL-backed relation store.
///
/// Endpoint existence, scope agreement and uniqueness are folded into a single
/// `INSERT ... SELECT ... ON CONFLICT DO NOTHING`, so the decision is atomic. The
/// statements that follow an empty insert only classify the failure.
pub struct PostgresRelationRepository {
    pool: sqlx::PgPool,
}

impl PostgresRelationRepository {
    /// Creates a new PostgreSQL relation repository.
    ///
    /// # Arguments
    ///
    /// * `pool` - Connection pool on a database with `subject` and `subject_relation` migrated
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, SubjectRepositoryError> {
        Ok(Self { pool })
    }

    /// Explains why nothing was inserted: an endpoint is missing from the scope or the pair exists.
    ///
    /// Endpoints are checked first so a pair stored in another scope never surfaces as a conflict.
    async fn classify_rejected_insert(
        &self,
        subject_key: i32,
        related_key: i32,
        kg_version: &str,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<SubjectRepositoryError, SubjectRepositoryError> {
        let found: Vec<i32> =
            sqlx::query_scalar("SELECT id FROM subject WHERE id = ANY($1) AND kg_version = $2")
                .bind(vec![subject_key, related_key])
                .bind(kg_version)
                .fetch_all(&mut **tx)
                .await?;

        let missing: Vec<String> = [subject_key, related_key]
            .iter()
            .filter(|key| !found.contains(key))
            .map(|key| key.to_string())
            .collect();

        if !missing.is_empty() {
            return Ok(SubjectRepositoryError::not_found(format!(
                "subject id={}",
                missing.join(", ")
            )));
        }

        Ok(SubjectRepositoryError::conflict(format!(
            "relation {} -> {} already exists",
            subject_key, related_key
        )))
    }

    async fn neighbours(
        &self,
        sql: &str,
        subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Vec<SubjectId>, SubjectRepositoryError> {
        let kg_version = scope_key(scope)?;
        let Some(key) = surrogate_key(subject_id) else {
            return Ok(Vec::new());
        };

        let ids: Vec<i32> = sqlx::query_scalar(sql)
            .bind(key)
            .bind(kg_version)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids
            .into_iter()
            .map(|id| SubjectId::new(id.to_string()))
            .collect())
    }
}

#[async_trait]
impl RelationStore for PostgresRelationRepository {
    async fn create_relation(
        &self,
        subject_id: &SubjectId,
        related_subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<SubjectRelation, SubjectRepositoryError> {
        validate_relation_endpoints(subject_id, related_subject_id)?;
        let kg_version = scope_key(scope)?;

        let (Some(subject_key), Some(related_key)) =
            (surrogate_key(subject_id), surrogate_key(related_subject_id))
        else {
            return Err(SubjectRepositoryError::not_found(format!(
                "subject id={} or id={}",
                subject_id, related_subject_id
            )));
        };

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, RelationRow>(
            r#"
            INSERT INTO subject_relation (subject_id, related_subject_id)
            SELECT s.id, r.id
            FROM subject s
            JOIN subject r ON r.id = $2 AND r.kg_version = $3
            WHERE s.id = $1 AND s.kg_version = $3
            ON CONFLICT (subject_id, related_subject_id) DO NOTHING
            RETURNING id, subject_id, related_subject_id, created_at
            "#,
        )
        .bind(subject_key)
        .bind(related_key)
        .bind(kg_version)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = inserted else {
            let rejection = self
                .classify_rejected_insert(subject_key, related_key, kg_version, &mut tx)
                .await?;
            tx.rollback().await?;
            debug!(error = %rejection, "Subject relation rejected");
            return Err(rejection);
        };

        tx.commit().await?;

        info!(
            relation_id = row.id,
            subject_id = row.subject_id,
            related_subject_id = row.related_subject_id,
            "Subject relation created"
        );
        Ok(row.into_relation(scope))
    }

    async fn related_to(
        &self,
        subject_id: &SubjectId,
        scope: Option<&Scope>,
    ) -> Result<Vec<SubjectId>, SubjectRepositoryError> {
        self.neighbours(
            r#"
            SELECT rel.related_subject_id
            FROM subject_relation rel
            JOIN subject s ON s.id = rel.subject_id
            WHERE rel.subject_id = $1 AND s.kg_version = $2
            ORDER BY rel.id
            "#,
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
            r#"
            SELECT rel.subject_id
            FROM subject_relation rel
            JOIN subject s ON s.id = rel.related_subject_id
            WHERE rel.related_subject_id = $1 AND s.kg_version = $2
            ORDER BY rel.id
            "#,
            subject_id,
            scope,
        )
        .await
    }
}
