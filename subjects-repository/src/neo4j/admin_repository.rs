use async_trait::async_trait;
use neo4rs::{Graph, Query};
use tracing::info;

use crate::errors::SubjectRepositoryError;
use crate::interfaces::AdminRepository;

const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE CONSTRAINT subject_name_unique IF NOT EXISTS \
     FOR (s:Subject) REQUIRE (s.kg_version, s.name) IS UNIQUE",
];

/// Neo4j-backed administrative operations.
pub struct Neo4jAdminRepository {
    graph: Graph,
}

impl Neo4jAdminRepository {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl AdminRepository for Neo4jAdminRepository {
    async fn ensure_schema(&self) -> Result<(), SubjectRepositoryError> {
        for statement in SCHEMA_STATEMENTS {
            self.graph.run(Query::new(statement.to_string())).await?;
        }
        info!(statements = SCHEMA_STATEMENTS.len(), "Neo4j constraints are in place");
        Ok(())
    }

    /// `DETACH DELETE` removes every subject node together with its edges in a
    /// single transaction.
    async fn reset_all(&self) -> Result<(), SubjectRepositoryError> {
        self.graph
            .run(Query::new("MATCH (n:Subject) DETACH DELETE n".to_string()))
            .await?;
        info!("Deleted all Subject nodes and RELATED_TO edges");
        Ok(())
    }
}
