//! Storage and audit seams for atelier
//!
//! Defines the collaborator traits the engine depends on:
//! - [`ProjectStore`] - persistence of projects, stage records, and the
//!   cached current-stage label
//! - [`AuditSink`] - fire-and-forget audit trail
//!
//! Plus reference in-memory implementations ([`InMemoryStore`],
//! [`MemoryAuditSink`]) used by the demo binary and the test suites.

pub mod audit;
pub mod memory;

pub use audit::{AuditAction, AuditEvent, AuditEventId, MemoryAuditSink};
pub use memory::InMemoryStore;

use atelier_domain::{
    ProjectId, ProjectMeta, ProjectSnapshot, StageFieldWrite, StageLabel, StageRecord,
};

/// Storage failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Referenced project does not exist
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// Project id already registered
    #[error("duplicate project: {0}")]
    DuplicateProject(ProjectId),

    /// Write targets a field the type's schema does not have
    #[error("unknown field for this project type: {key}")]
    UnknownField {
        /// Offending wire key
        key: String,
    },

    /// Backend-specific failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence seam for projects and stage records
///
/// Stage records exist 1:1 with projects; implementations must treat
/// `create_record` as "ensure exists" so concurrent callers never error.
/// The cached label written through `write_stage_label` is a
/// read-optimization only and is always recomputable from the record.
#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    /// Fetch a project with its stage record
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the project does not exist.
    async fn project(&self, id: &ProjectId) -> Result<ProjectSnapshot, StoreError>;

    /// Insert a new project row
    ///
    /// # Errors
    /// [`StoreError::DuplicateProject`] if the id is already registered.
    async fn insert_project(&self, meta: ProjectMeta) -> Result<(), StoreError>;

    /// Ensure the stage record exists, creating it empty if needed
    ///
    /// Idempotent: a second call returns the existing record unchanged.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the parent project does not exist.
    async fn create_record(&self, id: &ProjectId) -> Result<StageRecord, StoreError>;

    /// Apply field writes to the stage record, creating it if needed
    ///
    /// Last write wins at field granularity; no concurrency token exists.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the project does not exist;
    /// [`StoreError::UnknownField`] if a write targets a field the type's
    /// schema does not have.
    async fn upsert_record(
        &self,
        id: &ProjectId,
        writes: &[StageFieldWrite],
    ) -> Result<StageRecord, StoreError>;

    /// Write the cached current-stage label
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the project does not exist.
    async fn write_stage_label(
        &self,
        id: &ProjectId,
        label: StageLabel,
    ) -> Result<(), StoreError>;

    /// List every project with its stage record
    ///
    /// # Errors
    /// [`StoreError::Backend`] on backend failure.
    async fn list_projects(&self) -> Result<Vec<ProjectSnapshot>, StoreError>;
}

/// Audit trail seam
///
/// Consumers treat this as fire-and-forget: a failed audit write must never
/// abort the operation that produced the event.
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one audit event
    ///
    /// # Errors
    /// [`StoreError::Backend`] on sink failure; callers log and continue.
    async fn record(&self, event: AuditEvent) -> Result<(), StoreError>;
}
