//! # Subjects Shared
//!
//! This crate defines the data structures shared by the subject knowledge-graph
//! repositories and their callers: subjects, directed relations between them,
//! the composed subject view and the knowledge-graph import/export document.

pub mod types;

pub use types::{
    CreatePolicy, KnowledgeGraph, KnowledgeGraphNode, RelationId, Scope, Subject, SubjectId,
    SubjectLookup, SubjectRelation, SubjectView,
};
