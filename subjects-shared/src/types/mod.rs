//! This module defines the core data structures used across the subject repositories.
//! It re-exports the identifier, subject, relation and knowledge-graph types.

pub mod identifiers;
pub mod knowledge_graph;
pub mod policy;
pub mod relation;
pub mod subject;

pub use identifiers::{RelationId, Scope, SubjectId};
pub use knowledge_graph::{KnowledgeGraph, KnowledgeGraphNode};
pub use policy::CreatePolicy;
pub use relation::SubjectRelation;
pub use subject::{Subject, SubjectLookup, SubjectView};
