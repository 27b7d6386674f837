//! PostgreSQL implementation of the `AdminRepository`.

use async_trait::async_trait;
use tracing::info;

use crate::errors::SubjectRepositoryError;
use crate::interfaces::AdminRepository;

/// PostgreSQL-backed administrative operations.
pub struct PostgresAdminRepository {
    pool: sqlx::PgPool,
}

impl PostgresAdminRepository {
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, SubjectRepositoryError> {
        Ok(Self { pool })
    }
}

#[async_trait]
impl AdminRepository for PostgresAdminRepository {
    /// Applies the embedded migrations under `src/postgres/migrations`.
    async fn ensure_schema(&self) -> Result<(), SubjectRepositoryError> {
        sqlx::migrate!("src/postgres/migrations")
            .run(&self.pool)
            .await?;
        info!("PostgreSQL schema is up to date");
        Ok(())
    }

    /// Truncates both tables in one statement, so the relation rows disappear in
    /// the same instant as the subjects they reference.
    async fn reset_all(&self) -> Result<(), SubjectRepositoryError> {
        sqlx::query("TRUNCATE TABLE subject_relation, subject")
            .execute(&self.pool)
            .await?;
        info!("Truncated subject and subject_relation tables");
        Ok(())
    }
}
