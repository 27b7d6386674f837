//! Dependency initialization and wiring for the subjects admin binary.

use std::sync::Arc;

use subjects_repository::{
    InMemorySubjectGraph, SubjectGraphService, SubjectGraphServiceConfig, SubjectStoreConfig,
    neo4j, postgres,
};
use subjects_shared::Scope;
use tracing::info;

use super::{AdminConfig, Backend};
use crate::AdminError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The service wired to the configured backend.
    pub service: SubjectGraphService,
    /// Scope every command runs in.
    pub scope: Option<Scope>,
}

impl Dependencies {
    /// Connect to the configured backend and build the service on top of it.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AdminError::Repository)` - If the backend cannot be reached
    pub async fn new(config: AdminConfig) -> Result<Self, AdminError> {
        info!(
            backend = config.backend.name(),
            create_policy = %config.create_policy,
            scope = ?config.scope,
            operation_timeout = ?config.operation_timeout,
            "Initializing dependencies"
        );

        let store_config = SubjectStoreConfig {
            create_policy: config.create_policy,
        };
        let service_config = SubjectGraphServiceConfig {
            default_timeout: config.operation_timeout,
        };

        let service = match config.backend {
            Backend::Postgres {
                database_url,
                max_connections,
            } => {
                let pool = postgres::connect(&database_url, max_connections).await?;
                info!(max_connections, "PostgreSQL connection pool established");
                SubjectGraphService::postgres(pool, store_config, service_config).await?
            }
            Backend::Neo4j {
                uri,
                user,
                password,
            } => {
                let graph = neo4j::connect(&uri, &user, &password)?;
                info!(uri = %uri, "Neo4j connection established");
                SubjectGraphService::neo4j(graph, store_config, service_config)
            }
            Backend::Memory => {
                let graph = Arc::new(InMemorySubjectGraph::new(store_config));
                SubjectGraphService::with_config(
                    graph.clone(),
                    graph.clone(),
                    graph,
                    service_config,
                )
            }
        };

        Ok(Self {
            service,
            scope: config.scope,
        })
    }
}
