//! Workflow engine facade
//!
//! The central coordinator that:
//! - Registers projects together with their empty stage record
//! - Validates and applies stage updates, then reconciles the label cache
//! - Serves listings with freshly derived labels
//! - Computes workflow statistics
//!
//! Storage and the audit trail are injected collaborators; audit and
//! label-cache failures degrade silently while primary-path failures
//! surface as [`EngineError`].

use crate::error::EngineError;
use crate::reconciler::{ListedProject, StageReconciler};
use crate::stats::WorkflowStats;
use crate::validator::filter_update;
use atelier_domain::{
    FieldKind, NewProject, ProjectId, ProjectMeta, StageLabel, StageRecord, StageUpdate,
};
use atelier_store::{AuditAction, AuditEvent, AuditSink, ProjectStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Await batch drift writes instead of detaching them
    pub synchronous_reconciliation: bool,
    /// Actor recorded on audit events
    pub actor: String,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With synchronous batch reconciliation
    #[inline]
    #[must_use]
    pub fn with_synchronous_reconciliation(mut self, synchronous: bool) -> Self {
        self.synchronous_reconciliation = synchronous;
        self
    }

    /// With audit actor
    #[inline]
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            synchronous_reconciliation: false,
            actor: "system".to_string(),
        }
    }
}

/// Result of a stage update
#[derive(Debug, Clone, Serialize)]
pub struct StageUpdateOutcome {
    /// Stage record after the writes
    pub record: StageRecord,
    /// Freshly derived current-stage label
    pub current_stage: StageLabel,
}

/// The workflow engine
///
/// Owns no state of its own; everything lives behind the injected store.
#[derive(Clone)]
pub struct WorkflowEngine {
    config: EngineConfig,
    store: Arc<dyn ProjectStore>,
    audit: Arc<dyn AuditSink>,
    reconciler: StageReconciler,
}

impl WorkflowEngine {
    /// Create an engine over a store and an audit sink
    #[must_use]
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn ProjectStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let reconciler = StageReconciler::new(Arc::clone(&store))
            .with_synchronous_writes(config.synchronous_reconciliation);
        Self {
            config,
            store,
            audit,
            reconciler,
        }
    }

    /// Register a new project with its empty stage record
    ///
    /// The project row is inserted with the first stage's label already
    /// cached, the stage record is created in the same call, and a
    /// registration audit event is emitted.
    ///
    /// # Errors
    /// [`EngineError::DuplicateProject`] if the id is taken; storage
    /// failures surface.
    pub async fn register_project(&self, new: NewProject) -> Result<ProjectMeta, EngineError> {
        tracing::info!(project = %new.id, project_type = %new.project_type, "registering project");

        let meta = ProjectMeta {
            id: new.id.clone(),
            project_type: new.project_type,
            title: new.title,
            status: new.status,
            priority: new.priority,
            started_on: new.started_on,
            due_on: new.due_on,
            current_stage: StageLabel::first(new.project_type).as_str().to_string(),
            created_at: Utc::now(),
        };
        self.store.insert_project(meta.clone()).await?;
        self.store.create_record(&meta.id).await?;

        self.emit_audit(
            AuditEvent::new(AuditAction::ProjectRegistered)
                .with_project(meta.id.clone())
                .with_actor(self.config.actor.clone())
                .with_details(format!(
                    "Project {} - {} ({}) registered",
                    meta.id, meta.title, meta.project_type
                )),
        )
        .await;

        Ok(meta)
    }

    /// Fetch the stage record, materializing it if needed
    ///
    /// Idempotent "ensure exists": concurrent callers all get the same
    /// record and no duplicate is created.
    ///
    /// # Errors
    /// [`EngineError::ProjectNotFound`] if the project does not exist.
    pub async fn stage_record(&self, id: &ProjectId) -> Result<StageRecord, EngineError> {
        let record = self.store.create_record(id).await?;
        Ok(record)
    }

    /// Validate and apply a stage update, then reconcile the label
    ///
    /// Note fields the type's schema lacks are silently dropped before the
    /// typed parse; unrecognized keys and malformed values surface. An
    /// audit event is emitted only when at least one date or status field
    /// was written. The label reconciliation is awaited, so the returned
    /// label is already cached unless its write failed - in which case the
    /// update still reports success and the next read self-heals.
    ///
    /// # Errors
    /// [`EngineError::ProjectNotFound`], [`EngineError::Field`], or a
    /// storage failure on the primary path.
    pub async fn update_stages(
        &self,
        id: &ProjectId,
        raw: StageUpdate,
    ) -> Result<StageUpdateOutcome, EngineError> {
        let snapshot = self.store.project(id).await?;
        let project_type = snapshot.meta.project_type;

        let cleaned = filter_update(project_type, &raw);
        let writes = cleaned.parse()?;
        tracing::info!(
            project = %id,
            submitted = raw.len(),
            applied = writes.len(),
            "applying stage update"
        );

        let record = self.store.upsert_record(id, &writes).await?;

        // Note-only edits are not audited
        let touches_progress = writes
            .iter()
            .any(|w| w.key.kind != FieldKind::ValidationNote);
        if touches_progress {
            self.emit_audit(
                AuditEvent::new(AuditAction::StagesUpdated)
                    .with_project(id.clone())
                    .with_actor(self.config.actor.clone())
                    .with_details(format!("Stages of project {id} modified")),
            )
            .await;
        }

        let current_stage = self.reconciler.reconcile_one(id).await?;
        Ok(StageUpdateOutcome {
            record,
            current_stage,
        })
    }

    /// List every project with freshly derived labels
    ///
    /// Drifted cached labels get best-effort background repairs; the
    /// returned payload never depends on them.
    ///
    /// # Errors
    /// Storage read failures surface.
    pub async fn list_projects(&self) -> Result<Vec<ListedProject>, EngineError> {
        let snapshots = self.store.list_projects().await?;
        Ok(self.reconciler.reconcile_many(snapshots).await)
    }

    /// Derive the current-stage label of one project, repairing its cache
    ///
    /// # Errors
    /// [`EngineError::ProjectNotFound`] if the project does not exist.
    pub async fn current_stage(&self, id: &ProjectId) -> Result<StageLabel, EngineError> {
        self.reconciler.reconcile_one(id).await
    }

    /// Compute workflow statistics over fresh derivations
    ///
    /// # Errors
    /// Storage read failures surface.
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<WorkflowStats, EngineError> {
        let snapshots = self.store.list_projects().await?;
        Ok(WorkflowStats::compute(&snapshots, now))
    }

    /// Fire-and-forget audit write
    async fn emit_audit(&self, event: AuditEvent) {
        if let Err(err) = self.audit.record(event).await {
            tracing::warn!(error = %err, "audit write failed");
        }
    }
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
