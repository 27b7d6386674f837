//! Subject creation policies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a store reacts to a create request for a name that already exists in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatePolicy {
    /// Fail with a conflict when the name is taken.
    #[default]
    StrictInsert,
    /// Return the existing subject unchanged when the name is taken.
    IdempotentMerge,
}

impl fmt::Display for CreatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrictInsert => f.write_str("strict"),
            Self::IdempotentMerge => f.write_str("merge"),
        }
    }
}

impl FromStr for CreatePolicy {
    type Err = String;

    /// Accepts "strict" / "merge" and a few spelling variants (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" | "strict-insert" | "strict_insert" | "insert" => Ok(Self::StrictInsert),
            "merge" | "idempotent" | "idempotent-merge" | "idempotent_merge" => {
                Ok(Self::IdempotentMerge)
            }
            other => Err(format!("unknown create policy '{}'", other)),
        }
    }
}
