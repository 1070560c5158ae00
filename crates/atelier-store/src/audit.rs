//! Audit events and the in-memory sink

use crate::{AuditSink, StoreError};
use atelier_domain::ProjectId;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique audit event identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuditEventId(pub Ulid);

impl AuditEventId {
    /// Generate new event ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for AuditEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AuditEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// A project was registered
    ProjectRegistered,
    /// Stage dates or statuses were modified
    StagesUpdated,
}

/// One audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier
    pub id: AuditEventId,
    /// Subject project, if any
    pub project_id: Option<ProjectId>,
    /// What happened
    pub action: AuditAction,
    /// Who did it
    pub actor: String,
    /// Free-form detail sentence
    pub details: Option<String>,
    /// When it happened
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    /// Create an event with the default actor
    #[inline]
    #[must_use]
    pub fn new(action: AuditAction) -> Self {
        Self {
            id: AuditEventId::new(),
            project_id: None,
            action,
            actor: "system".to_string(),
            details: None,
            at: Utc::now(),
        }
    }

    /// With subject project
    #[inline]
    #[must_use]
    pub fn with_project(mut self, id: ProjectId) -> Self {
        self.project_id = Some(id);
        self
    }

    /// With actor
    #[inline]
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// With detail sentence
    #[inline]
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// In-memory audit sink
///
/// Collects events in a mutex-guarded vector; test suites assert against
/// [`MemoryAuditSink::events`].
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    /// Create an empty sink
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no event was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[async_trait::async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), StoreError> {
        tracing::debug!(event_id = %event.id, action = ?event.action, "audit event recorded");
        self.events.lock().push(event);
        Ok(())
    }
}
