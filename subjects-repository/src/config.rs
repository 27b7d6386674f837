//! Configuration types for the subject stores and the service facade.

use std::time::Duration;

use subjects_shared::CreatePolicy;

/// Default per-operation timeout applied by the service facade.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration shared by every `SubjectStore` backend.
#[derive(Debug, Clone, Default)]
pub struct SubjectStoreConfig {
    /// What `create_subject` does when the name already exists in scope.
    pub create_policy: CreatePolicy,
}

impl SubjectStoreConfig {
    /// Create-or-fail semantics.
    pub fn strict() -> Self {
        Self {
            create_policy: CreatePolicy::StrictInsert,
        }
    }

    /// Create-or-return-existing semantics.
    pub fn merge() -> Self {
        Self {
            create_policy: CreatePolicy::IdempotentMerge,
        }
    }
}

/// Configuration for the `SubjectGraphService`.
#[derive(Debug, Clone)]
pub struct SubjectGraphServiceConfig {
    /// Deadline applied to an operation whose context carries none.
    ///
    /// Set to `None` to let operations run until the backend answers.
    pub default_timeout: Option<Duration>,
}

impl Default for SubjectGraphServiceConfig {
    fn default() -> Self {
        Self {
            default_timeout: Some(DEFAULT_OPERATION_TIMEOUT),
        }
    }
}

impl SubjectGraphServiceConfig {
    /// Create a config with a custom default timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: Some(timeout),
        }
    }

    /// Create a config without any default timeout.
    pub fn unbounded() -> Self {
        Self {
            default_timeout: None,
        }
    }
}
