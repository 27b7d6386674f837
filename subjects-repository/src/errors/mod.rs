//! Error types for the subject repository.
//! Consolidates and re-exports the error taxonomy shared by every store.
mod subject_repository;

pub use subject_repository::{ErrorKind, SubjectRepositoryError};
