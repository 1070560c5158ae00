//! Atelier domain model
//!
//! Pure data types for the workflow stage engine:
//! - Project identity and metadata
//! - Stage records and per-stage field values
//! - The two fixed six-stage catalogs (program, manual)
//! - The per-type field schema and the wire key grammar
//!
//! Nothing in this crate performs I/O; storage and orchestration live in
//! `atelier-store` and `atelier-engine`.

pub mod catalog;
pub mod fields;
pub mod project;
pub mod stage;

// Re-exports for convenience
pub use catalog::{stages_for, StageDef, StageLabel, MANUAL_STAGES, PROGRAM_STAGES};
pub use fields::{
    FieldError, FieldKey, FieldKind, FieldValue, StageFieldSet, StageFieldWrite, StageUpdate,
};
pub use project::{
    NewProject, Priority, ProjectId, ProjectMeta, ProjectSnapshot, ProjectStatus, ProjectType,
};
pub use stage::{StageOrdinal, StageRecord, StageSlot, StageStatus};
