//! Environment-driven settings.

use std::env;
use std::time::Duration;

use subjects_shared::{CreatePolicy, Scope};
use tracing::warn;

use crate::AdminError;

/// Default PostgreSQL pool size.
const DEFAULT_PG_MAX_CONNECTIONS: u32 = 5;

/// Default per-operation timeout in seconds.
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30;

/// Default Neo4j user.
const DEFAULT_NEO4J_USER: &str = "neo4j";

/// Which store the admin commands run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Neo4j {
        uri: String,
        user: String,
        password: String,
    },
    /// Process-local graph, gone when the command exits.
    Memory,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Neo4j { .. } => "neo4j",
            Self::Memory => "memory",
        }
    }
}

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub backend: Backend,
    pub create_policy: CreatePolicy,
    /// Knowledge-graph version every command is scoped to.
    pub scope: Option<Scope>,
    /// `None` when `OPERATION_TIMEOUT_SECS=0`.
    pub operation_timeout: Option<Duration>,
}

impl AdminConfig {
    /// Read the settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SUBJECTS_BACKEND`: `postgres`, `neo4j` or `memory` (default: postgres)
    /// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
    /// - `PG_MAX_CONNECTIONS`: PostgreSQL pool size (default: 5)
    /// - `NEO4J_URI`: Neo4j bolt URI (required for neo4j)
    /// - `NEO4J_USER` / `NEO4J_PASSWORD`: Neo4j credentials (default: neo4j / empty)
    /// - `SUBJECT_CREATE_POLICY`: `strict` or `merge` (default: strict)
    /// - `KG_VERSION`: scope for every command (default: unscoped)
    /// - `OPERATION_TIMEOUT_SECS`: per-operation timeout, 0 disables it (default: 30)
    pub fn from_env() -> Result<Self, AdminError> {
        let backend = match env::var("SUBJECTS_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => Backend::Postgres {
                database_url: required("DATABASE_URL")?,
                max_connections: parsed_or("PG_MAX_CONNECTIONS", DEFAULT_PG_MAX_CONNECTIONS),
            },
            "neo4j" => Backend::Neo4j {
                uri: required("NEO4J_URI")?,
                user: env::var("NEO4J_USER").unwrap_or_else(|_| DEFAULT_NEO4J_USER.to_string()),
                password: env::var("NEO4J_PASSWORD").unwrap_or_default(),
            },
            "memory" => Backend::Memory,
            other => {
                return Err(AdminError::config(format!(
                    "unknown SUBJECTS_BACKEND '{}', expected postgres, neo4j or memory",
                    other
                )));
            }
        };

        let create_policy = match env::var("SUBJECT_CREATE_POLICY") {
            Ok(value) => value.parse::<CreatePolicy>().map_err(AdminError::config)?,
            Err(_) => CreatePolicy::default(),
        };

        let scope = env::var("KG_VERSION")
            .ok()
            .filter(|version| !version.trim().is_empty())
            .map(Scope::new);

        let timeout_secs = parsed_or("OPERATION_TIMEOUT_SECS", DEFAULT_OPERATION_TIMEOUT_SECS);
        let operation_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        Ok(Self {
            backend,
            create_policy,
            scope,
            operation_timeout,
        })
    }
}

fn required(key: &str) -> Result<String, AdminError> {
    env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AdminError::config(format!("{} must be set", key)))
}

fn parsed_or<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!(key = %key, value = %raw, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
