//! This module defines and re-exports the store interfaces.
//! Every backend implements the same traits so callers never see backend concepts.
mod admin_repository;
mod relation_store;
mod subject_store;

pub use admin_repository::AdminRepository;
pub use relation_store::RelationStore;
pub use subject_store::SubjectStore;
