//! Directed relation between two subjects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::{RelationId, Scope, SubjectId};

/// A directed edge `subject_id -> related_subject_id`.
///
/// The ordered pair is unique within its scope. Graph backends identify edges by
/// their endpoints only, in which case `id` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRelation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RelationId>,
    pub subject_id: SubjectId,
    pub related_subject_id: SubjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub created_at: DateTime<Utc>,
}
