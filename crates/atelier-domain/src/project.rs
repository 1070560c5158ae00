//! Project identity and metadata
//!
//! Defines the project-level types:
//! - [`ProjectId`] - opaque human-readable identifier (e.g. `PRG001`)
//! - [`ProjectType`] - the two supported workflow templates
//! - [`ProjectMeta`] - denormalized project row, including the cached stage label
//! - [`ProjectSnapshot`] - a project together with its stage record

use crate::stage::StageRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque project identifier
///
/// Identifiers are externally generated human codes (`PRG001`, `MAN014`);
/// this crate treats them as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Create a project id from any string-like value
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Project type, fixed at creation
///
/// Determines which stage catalog and field schema apply. There is no
/// migration path between types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectType {
    /// Study program ("Programme d'Etudes")
    Program,
    /// Training manual ("Manuel")
    Manual,
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectType::Program => write!(f, "Program"),
            ProjectType::Manual => write!(f, "Manual"),
        }
    }
}

/// Administrative project status
///
/// Orthogonal to the workflow stage: an `OnHold` project still has a
/// current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    /// In active production
    Active,
    /// Paused
    OnHold,
    /// Archived, kept for reporting only
    Archived,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Active
    }
}

/// Project priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    /// Low priority
    Low,
    /// Default priority
    Medium,
    /// High priority
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Denormalized project row
///
/// `current_stage` is a cache of the derived stage label, never the source
/// of truth; derivation always runs against the stage record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// Project identifier
    pub id: ProjectId,
    /// Workflow template
    pub project_type: ProjectType,
    /// Human title
    pub title: String,
    /// Administrative status
    pub status: ProjectStatus,
    /// Priority
    pub priority: Priority,
    /// Production start date
    pub started_on: DateTime<Utc>,
    /// Planned completion date
    pub due_on: Option<DateTime<Utc>>,
    /// Cached current-stage label (a catalog name or `"Done"`)
    pub current_stage: String,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for registering a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    /// Project identifier (externally generated)
    pub id: ProjectId,
    /// Workflow template
    pub project_type: ProjectType,
    /// Human title
    pub title: String,
    /// Administrative status
    pub status: ProjectStatus,
    /// Priority
    pub priority: Priority,
    /// Production start date
    pub started_on: DateTime<Utc>,
    /// Planned completion date
    pub due_on: Option<DateTime<Utc>>,
}

impl NewProject {
    /// Create a new project input with default status and priority
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<ProjectId>,
        project_type: ProjectType,
        title: impl Into<String>,
        started_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            project_type,
            title: title.into(),
            status: ProjectStatus::default(),
            priority: Priority::default(),
            started_on,
            due_on: None,
        }
    }

    /// With administrative status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    /// With priority
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// With planned completion date
    #[inline]
    #[must_use]
    pub fn with_due_on(mut self, due_on: DateTime<Utc>) -> Self {
        self.due_on = Some(due_on);
        self
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A project together with its stage record
///
/// The record is optional at this seam: listings tolerate projects whose
/// record has not been materialized yet and derive the first-stage label
/// for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Project row
    pub meta: ProjectMeta,
    /// Stage record, if materialized
    pub record: Option<StageRecord>,
}
