//! Neo4j implementation of the subject repositories.
//!
//! Subjects are `(:Subject {name, kg_version, uuid, created_at})` nodes identified
//! by `elementId(n)`; relations are `[:RELATED_TO {uuid, created_at}]` edges with
//! no identity of their own. Every query is parameterized and runs as a single
//! auto-commit statement on a pooled connection.
mod admin_repository;
mod relation_repository;
mod subject_repository;

use chrono::{DateTime, Utc};
use neo4rs::{Graph, Row};
use subjects_shared::{Scope, Subject, SubjectId};
use uuid::Uuid;

use crate::errors::SubjectRepositoryError;

pub use admin_repository::Neo4jAdminRepository;
pub use relation_repository::Neo4jRelationRepository;
pub use subject_repository::Neo4jSubjectRepository;

/// Projection every subject query returns, bound to the node variable `n`.
const SUBJECT_PROJECTION: &str = "elementId(n) AS id, n.uuid AS uuid, n.name AS name, \
     n.kg_version AS kg_version, n.created_at AS created_at";

/// Connect to Neo4j and return a pooled `Graph` handle shared by the repositories.
pub fn connect(uri: &str, user: &str, password: &str) -> Result<Graph, SubjectRepositoryError> {
    let graph = Graph::new(uri, user, password)?;
    Ok(graph)
}

fn column<T: serde::de::DeserializeOwned>(
    row: &Row,
    key: &str,
) -> Result<T, SubjectRepositoryError> {
    row.get::<T>(key).map_err(|e| {
        SubjectRepositoryError::internal(format!("record is missing property '{}': {}", key, e))
    })
}

fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>, SubjectRepositoryError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| SubjectRepositoryError::internal(format!("invalid timestamp {}", millis)))
}

/// Converts a row produced with [`SUBJECT_PROJECTION`] into a `Subject`.
fn subject_from_row(row: &Row) -> Result<Subject, SubjectRepositoryError> {
    let id: String = column(row, "id")?;
    let uuid: String = column(row, "uuid")?;
    let uuid = Uuid::parse_str(&uuid).map_err(|e| {
        SubjectRepositoryError::internal(format!("subject {} has an invalid uuid: {}", id, e))
    })?;

    Ok(Subject {
        id: SubjectId::new(id),
        uuid,
        name: column(row, "name")?,
        scope: Scope::from_key(column::<String>(row, "kg_version")?),
        created_at: timestamp_from_millis(column(row, "created_at")?)?,
    })
}
