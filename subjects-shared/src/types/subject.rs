//! Subject entity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identifiers::{Scope, SubjectId};

/// A named node in the knowledge graph.
///
/// # Fields
///
/// - `id`: Backend-assigned opaque identifier, never changes after creation
/// - `uuid`: Separately generated UUID, assigned once at creation
/// - `name`: Non-empty name, unique within `scope`
/// - `scope`: Optional knowledge-graph version the subject belongs to
/// - `created_at`: Creation timestamp, immutable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub uuid: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub created_at: DateTime<Utc>,
}

/// How a caller identifies the subject it wants to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectLookup {
    Id(SubjectId),
    Name(String),
}

impl From<SubjectId> for SubjectLookup {
    fn from(id: SubjectId) -> Self {
        Self::Id(id)
    }
}

impl From<&SubjectId> for SubjectLookup {
    fn from(id: &SubjectId) -> Self {
        Self::Id(id.clone())
    }
}

/// A subject together with the ids of the subjects it relates to and from.
///
/// `related_to` holds the targets of edges leaving this subject and
/// `related_from` the sources of edges arriving at it, both in the order the
/// backend yielded them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectView {
    pub subject: Subject,
    pub related_to: Vec<SubjectId>,
    pub related_from: Vec<SubjectId>,
}
