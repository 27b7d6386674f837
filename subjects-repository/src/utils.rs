//! Input checks shared by every backend.

use subjects_shared::{Scope, SubjectId};

use crate::errors::SubjectRepositoryError;

/// Longest accepted subject name, in characters. Matches the `subject.name` column.
pub const MAX_NAME_LENGTH: usize = 255;

/// Rejects empty (or whitespace-only) and over-long subject names.
pub fn validate_name(name: &str) -> Result<(), SubjectRepositoryError> {
    if name.trim().is_empty() {
        return Err(SubjectRepositoryError::validation("subject name is required"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(SubjectRepositoryError::validation(format!(
            "subject name exceeds {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Storage key of `scope`, rejecting an explicitly empty scope.
///
/// An empty scope string would alias the unscoped partition.
pub fn scope_key(scope: Option<&Scope>) -> Result<&str, SubjectRepositoryError> {
    match scope {
        Some(scope) if scope.as_str().is_empty() => Err(SubjectRepositoryError::validation(
            "knowledge-graph version must not be empty",
        )),
        _ => Ok(Scope::key(scope)),
    }
}

/// Rejects self-relations.
pub fn validate_relation_endpoints(
    subject_id: &SubjectId,
    related_subject_id: &SubjectId,
) -> Result<(), SubjectRepositoryError> {
    if subject_id == related_subject_id {
        return Err(SubjectRepositoryError::validation(format!(
            "subject {} cannot relate to itself",
            subject_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Physics").is_ok());
        assert_eq!(validate_name("").unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(validate_name("   ").unwrap_err().kind(), ErrorKind::Validation);
        assert!(validate_name(&"é".repeat(MAX_NAME_LENGTH)).is_ok());
        assert_eq!(
            validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_scope_key() {
        assert_eq!(scope_key(None).unwrap(), "");
        assert_eq!(scope_key(Some(&Scope::new("v2"))).unwrap(), "v2");
        assert!(scope_key(Some(&Scope::new(""))).is_err());
    }

    #[test]
    fn test_self_relation_rejected() {
        let a = SubjectId::new("1");
        let b = SubjectId::new("2");
        assert!(validate_relation_endpoints(&a, &b).is_ok());
        assert_eq!(
            validate_relation_endpoints(&a, &a).unwrap_err().kind(),
            ErrorKind::Validation
        );
    }
}
