//! # Subjects Repository
//! This crate provides the storage core of the knowledge graph: subjects,
//! directed relations between them, bidirectional traversal and an
//! administrative reset. It includes definitions for errors, interfaces, and
//! concrete implementations for PostgreSQL, Neo4j and an in-memory graph.
pub mod config;
pub mod context;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod neo4j;
pub mod postgres;
pub mod query;
pub mod service;
pub mod types;
mod utils;

pub use config::{SubjectGraphServiceConfig, SubjectStoreConfig};
pub use context::OperationContext;
pub use errors::{ErrorKind, SubjectRepositoryError};
pub use interfaces::{AdminRepository, RelationStore, SubjectStore};
pub use memory::InMemorySubjectGraph;
pub use query::GraphQueryEngine;
pub use service::SubjectGraphService;
pub use types::ImportSummary;
