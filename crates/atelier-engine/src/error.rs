//! Error types for the workflow engine
//!
//! Only failures that block computing a correct response surface here:
//! missing projects, malformed input, and storage read/write failures on
//! the primary path. Side-channel failures (label-cache refresh, audit
//! writes) are logged and swallowed at their call sites and never appear
//! in this taxonomy.

use atelier_domain::{FieldError, ProjectId};
use atelier_store::StoreError;

/// Main workflow engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Referenced project does not exist
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Project id already registered
    #[error("duplicate project: {0}")]
    DuplicateProject(ProjectId),

    /// Malformed stage-update input
    #[error("invalid stage update: {0}")]
    Field(#[from] FieldError),

    /// Storage failure on the primary path
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => EngineError::ProjectNotFound(id),
            StoreError::DuplicateProject(id) => EngineError::DuplicateProject(id),
            other => EngineError::Store(other),
        }
    }
}

impl EngineError {
    /// Whether the error names a missing project
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProjectNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_project_not_found() {
        let err: EngineError = StoreError::NotFound("PRG404".into()).into();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("PRG404"));
    }

    #[test]
    fn backend_errors_stay_storage_errors() {
        let err: EngineError = StoreError::Backend("connection reset".to_string()).into();
        assert!(matches!(err, EngineError::Store(_)));
    }
}
