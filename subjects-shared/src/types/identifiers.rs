//! Identifier types for subjects, relations and knowledge-graph scopes.
//!
//! Identifiers are opaque tokens: each backend decides how to render its own
//! identity (a surrogate key, an element id) and callers only compare and echo
//! them back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a subject.
///
/// Two ids are equal only if they were produced by the same backend for the same
/// subject. Callers must not parse or construct ids other than from values a
/// store has returned (or from untrusted input that will simply fail to match).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SubjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Opaque identifier of a relation, only assigned by backends that give edges
/// an identity of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(String);

impl RelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A knowledge-graph version tag.
///
/// When a scope is supplied, name uniqueness and relation validity are evaluated
/// only among subjects of the same scope. Unscoped subjects form their own
/// partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key of an optional scope. Unscoped data lives under `""`.
    pub fn key(scope: Option<&Scope>) -> &str {
        scope.map(Scope::as_str).unwrap_or("")
    }

    /// Inverse of [`Scope::key`].
    pub fn from_key(key: impl Into<String>) -> Option<Scope> {
        let key = key.into();
        if key.is_empty() {
            None
        } else {
            Some(Scope(key))
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_key_round_trip() {
        let v1 = Scope::new("v1");
        assert_eq!(Scope::key(Some(&v1)), "v1");
        assert_eq!(Scope::key(None), "");
        assert_eq!(Scope::from_key("v1"), Some(v1));
        assert_eq!(Scope::from_key(""), None);
    }

    #[test]
    fn test_subject_id_is_transparent_in_json() {
        let id = SubjectId::new("4:abc:12");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"4:abc:12\"");
    }
}
