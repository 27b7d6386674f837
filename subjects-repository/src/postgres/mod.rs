//! PostgreSQL implementation of the subject repositories.
//!
//! Subjects carry a `SERIAL` surrogate key (rendered as the opaque `SubjectId`)
//! and a separately generated UUID. Uniqueness is enforced by table constraints
//! and detected through insert-conflict handling, never by a read-then-write.
//!
//! ## Database Tables
//!
//! - `subject`: one row per subject, unique on `(kg_version, name)`
//! - `subject_relation`: one row per directed edge, unique on `(subject_id, related_subject_id)`
mod admin_repository;
mod relation_repository;
mod subject_repository;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use subjects_shared::{RelationId, Scope, Subject, SubjectId, SubjectRelation};
use uuid::Uuid;

use crate::errors::SubjectRepositoryError;

pub use admin_repository::PostgresAdminRepository;
pub use relation_repository::PostgresRelationRepository;
pub use subject_repository::PostgresSubjectRepository;

#[derive(sqlx::FromRow)]
struct SubjectRow {
    id: i32,
    uuid: Uuid,
    name: String,
    kg_version: String,
    created_at: DateTime<Utc>,
}

impl From<SubjectRow> for Subject {
    fn from(row: SubjectRow) -> Self {
        Subject {
            id: SubjectId::new(row.id.to_string()),
            uuid: row.uuid,
            name: row.name,
            scope: Scope::from_key(row.kg_version),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RelationRow {
    id: i32,
    subject_id: i32,
    related_subject_id: i32,
    created_at: DateTime<Utc>,
}

impl RelationRow {
    fn into_relation(self, scope: Option<&Scope>) -> SubjectRelation {
        SubjectRelation {
            id: Some(RelationId::new(self.id.to_string())),
            subject_id: SubjectId::new(self.subject_id.to_string()),
            related_subject_id: SubjectId::new(self.related_subject_id.to_string()),
            scope: scope.cloned(),
            created_at: self.created_at,
        }
    }
}

/// Surrogate key behind a subject id, if the token is one this backend could have issued.
fn surrogate_key(id: &SubjectId) -> Option<i32> {
    id.as_str().parse::<i32>().ok().filter(|key| *key > 0)
}

/// Connect to PostgreSQL and return a connection pool shared by the repositories.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
) -> Result<sqlx::PgPool, SubjectRepositoryError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}
