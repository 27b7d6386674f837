//! Result types produced by the service facade.

use serde::Serialize;

/// Outcome of importing a knowledge-graph document.
///
/// Subjects that already existed are reused, never duplicated. Relations that
/// already existed and self-references in the document are counted in
/// `relations_skipped` instead of failing the import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Subjects created by this import.
    pub subjects_created: usize,
    /// Subjects that were already present and were reused.
    pub subjects_existing: usize,
    /// Relations created by this import.
    pub relations_created: usize,
    /// Relations left out because they already existed or pointed at their own source.
    pub relations_skipped: usize,
}
