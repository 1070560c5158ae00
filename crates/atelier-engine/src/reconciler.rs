//! Label-cache reconciliation
//!
//! Keeps the persisted current-stage label consistent with the stage
//! record without letting secondary writes block primary request latency:
//! - [`StageReconciler::reconcile_one`] awaits its drift write, so a caller
//!   editing one project sees the updated label immediately
//! - [`StageReconciler::reconcile_many`] derives fresh labels inline for
//!   the returned payload and dispatches drift writes as detached tasks
//!
//! In both entry points the returned value is the freshly derived label,
//! never the possibly-stale persisted one. A failed drift write is logged
//! and swallowed: the label stays stale until the next read re-derives and
//! re-schedules it.

use crate::deriver::derive_current_stage;
use crate::error::EngineError;
use atelier_domain::{ProjectId, ProjectMeta, ProjectSnapshot, StageLabel, StageRecord};
use atelier_store::ProjectStore;
use serde::Serialize;
use std::sync::Arc;

/// One listing entry with its freshly derived label
///
/// `current_stage` is always the derived value, and `meta.current_stage`
/// is overwritten to match it in the payload, so callers never observe the
/// stale cache even before a drift write settles.
#[derive(Debug, Clone, Serialize)]
pub struct ListedProject {
    /// Project row as stored
    pub meta: ProjectMeta,
    /// Stage record, if materialized
    pub record: Option<StageRecord>,
    /// Freshly derived current-stage label
    pub current_stage: StageLabel,
}

/// Reconciles the persisted stage label against fresh derivation
#[derive(Clone)]
pub struct StageReconciler {
    store: Arc<dyn ProjectStore>,
    synchronous_writes: bool,
}

impl StageReconciler {
    /// Create a reconciler over a store
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self {
            store,
            synchronous_writes: false,
        }
    }

    /// Await batch drift writes instead of detaching them
    ///
    /// Failures are still swallowed. Intended for deterministic tests.
    #[inline]
    #[must_use]
    pub fn with_synchronous_writes(mut self, synchronous: bool) -> Self {
        self.synchronous_writes = synchronous;
        self
    }

    /// Reconcile a single project, awaiting the drift write
    ///
    /// Returns the freshly derived label. The drift write is awaited so the
    /// caller observes the updated cache on its next read; its failure is
    /// logged and swallowed.
    ///
    /// # Errors
    /// Surfaces read failures, including a missing project.
    pub async fn reconcile_one(&self, id: &ProjectId) -> Result<StageLabel, EngineError> {
        let snapshot = self.store.project(id).await?;
        let label = derive_current_stage(snapshot.record.as_ref(), snapshot.meta.project_type);

        if snapshot.meta.current_stage != label.as_str() {
            tracing::debug!(
                project = %id,
                cached = %snapshot.meta.current_stage,
                derived = %label,
                "stage label drift detected"
            );
            if let Err(err) = self.store.write_stage_label(id, label).await {
                tracing::warn!(project = %id, error = %err, "stage label write failed");
            }
        }

        Ok(label)
    }

    /// Reconcile a batch, deriving labels inline and detaching drift writes
    ///
    /// The returned entries always carry the freshly derived label; drifted
    /// projects get a best-effort cache write that the caller never waits
    /// for. Write failures are logged inside each task's own error boundary
    /// and never reach the caller.
    pub async fn reconcile_many(&self, snapshots: Vec<ProjectSnapshot>) -> Vec<ListedProject> {
        let mut listed = Vec::with_capacity(snapshots.len());
        let mut drifted: Vec<(ProjectId, StageLabel)> = Vec::new();

        for mut snapshot in snapshots {
            let label = derive_current_stage(snapshot.record.as_ref(), snapshot.meta.project_type);
            if snapshot.meta.current_stage != label.as_str() {
                drifted.push((snapshot.meta.id.clone(), label));
                // The payload never exposes the stale cache
                snapshot.meta.current_stage = label.as_str().to_string();
            }
            listed.push(ListedProject {
                meta: snapshot.meta,
                record: snapshot.record,
                current_stage: label,
            });
        }

        if !drifted.is_empty() {
            tracing::debug!(count = drifted.len(), "scheduling stage label drift writes");
        }

        if self.synchronous_writes {
            let writes = drifted
                .into_iter()
                .map(|(id, label)| Self::write_label(Arc::clone(&self.store), id, label));
            futures::future::join_all(writes).await;
        } else {
            for (id, label) in drifted {
                tokio::spawn(Self::write_label(Arc::clone(&self.store), id, label));
            }
        }

        listed
    }

    /// Best-effort label write with its own error boundary
    async fn write_label(store: Arc<dyn ProjectStore>, id: ProjectId, label: StageLabel) {
        if let Err(err) = store.write_stage_label(&id, label).await {
            tracing::warn!(project = %id, error = %err, "background stage label write failed");
        }
    }
}

impl std::fmt::Debug for StageReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageReconciler")
            .field("synchronous_writes", &self.synchronous_writes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_domain::{
        Priority, ProjectStatus, ProjectType, StageFieldWrite, StageOrdinal, StageStatus,
    };
    use atelier_store::{InMemoryStore, StoreError};
    use chrono::Utc;
    use mockall::mock;

    fn meta(id: &str, project_type: ProjectType, cached: &str) -> ProjectMeta {
        ProjectMeta {
            id: id.into(),
            project_type,
            title: format!("project {id}"),
            status: ProjectStatus::Active,
            priority: Priority::Medium,
            started_on: Utc::now(),
            due_on: None,
            current_stage: cached.to_string(),
            created_at: Utc::now(),
        }
    }

    fn completed_through(n: u8) -> StageRecord {
        let mut record = StageRecord::empty();
        for ordinal in StageOrdinal::ALL.iter().take(usize::from(n)) {
            record.slot_mut(*ordinal).status = Some(StageStatus::Completed);
        }
        record
    }

    #[tokio::test]
    async fn reconcile_one_writes_drifted_label() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_project(meta("MAN001", ProjectType::Manual, "Data Collection"))
            .await
            .unwrap();
        let update = atelier_domain::StageUpdate::new()
            .with("stage1_status", serde_json::json!("Completed"))
            .with("stage2_status", serde_json::json!("Completed"));
        store
            .upsert_record(&"MAN001".into(), &update.parse().unwrap())
            .await
            .unwrap();

        let reconciler = StageReconciler::new(Arc::clone(&store) as Arc<dyn ProjectStore>);
        let label = reconciler.reconcile_one(&"MAN001".into()).await.unwrap();
        assert_eq!(label, *"Formatting");

        let persisted = store.project(&"MAN001".into()).await.unwrap();
        assert_eq!(persisted.meta.current_stage, "Formatting");
    }

    #[tokio::test]
    async fn reconcile_one_surfaces_missing_project() {
        let store = Arc::new(InMemoryStore::new());
        let reconciler = StageReconciler::new(store as Arc<dyn ProjectStore>);
        let err = reconciler.reconcile_one(&"PRG404".into()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn reconcile_many_returns_fresh_labels_and_repairs_cache() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_project(meta("PRG001", ProjectType::Program, "Data Collection"))
            .await
            .unwrap();
        store
            .insert_project(meta("MAN001", ProjectType::Manual, "Data Collection"))
            .await
            .unwrap();
        let update = atelier_domain::StageUpdate::new()
            .with("stage1_status", serde_json::json!("Completed"));
        store
            .upsert_record(&"PRG001".into(), &update.parse().unwrap())
            .await
            .unwrap();

        let reconciler = StageReconciler::new(Arc::clone(&store) as Arc<dyn ProjectStore>)
            .with_synchronous_writes(true);
        let snapshots = store.list_projects().await.unwrap();
        let listed = reconciler.reconcile_many(snapshots).await;

        let prg = listed.iter().find(|p| p.meta.id.as_str() == "PRG001").unwrap();
        assert_eq!(prg.current_stage, *"AST");
        assert_eq!(prg.meta.current_stage, "AST");
        let man = listed.iter().find(|p| p.meta.id.as_str() == "MAN001").unwrap();
        assert_eq!(man.current_stage, *"Data Collection");

        // Drifted cache was repaired; the undrifted one was left alone
        let persisted = store.project(&"PRG001".into()).await.unwrap();
        assert_eq!(persisted.meta.current_stage, "AST");
    }

    #[tokio::test]
    async fn fully_completed_project_lists_as_done() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_project(meta("MAN002", ProjectType::Manual, "Publication"))
            .await
            .unwrap();
        let mut update = atelier_domain::StageUpdate::new();
        for n in 1..=6 {
            update = update.with(format!("stage{n}_status"), serde_json::json!("Completed"));
        }
        store
            .upsert_record(&"MAN002".into(), &update.parse().unwrap())
            .await
            .unwrap();

        let reconciler = StageReconciler::new(Arc::clone(&store) as Arc<dyn ProjectStore>)
            .with_synchronous_writes(true);
        let listed = reconciler.reconcile_many(store.list_projects().await.unwrap()).await;
        assert!(listed[0].current_stage.is_done());
        let persisted = store.project(&"MAN002".into()).await.unwrap();
        assert_eq!(persisted.meta.current_stage, "Done");
    }

    mock! {
        Store {}

        #[async_trait::async_trait]
        impl ProjectStore for Store {
            async fn project(&self, id: &ProjectId) -> Result<ProjectSnapshot, StoreError>;
            async fn insert_project(&self, meta: ProjectMeta) -> Result<(), StoreError>;
            async fn create_record(&self, id: &ProjectId) -> Result<StageRecord, StoreError>;
            async fn upsert_record(
                &self,
                id: &ProjectId,
                writes: &[StageFieldWrite],
            ) -> Result<StageRecord, StoreError>;
            async fn write_stage_label(
                &self,
                id: &ProjectId,
                label: StageLabel,
            ) -> Result<(), StoreError>;
            async fn list_projects(&self) -> Result<Vec<ProjectSnapshot>, StoreError>;
        }
    }

    #[tokio::test]
    async fn failed_drift_write_never_reaches_the_caller() {
        let mut store = MockStore::new();
        store
            .expect_write_stage_label()
            .returning(|_, _| Err(StoreError::Backend("disk full".to_string())));

        let snapshot = ProjectSnapshot {
            meta: meta("MAN003", ProjectType::Manual, "Data Collection"),
            record: Some(completed_through(2)),
        };

        let reconciler = StageReconciler::new(Arc::new(store) as Arc<dyn ProjectStore>)
            .with_synchronous_writes(true);
        let listed = reconciler.reconcile_many(vec![snapshot]).await;

        // The payload still carries the fresh label despite the failed write
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].current_stage, *"Formatting");
        assert_eq!(listed[0].meta.current_stage, "Formatting");
    }

    #[tokio::test]
    async fn detached_drift_writes_eventually_converge() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_project(meta("PRG009", ProjectType::Program, "Data Collection"))
            .await
            .unwrap();
        let update = atelier_domain::StageUpdate::new()
            .with("stage1_status", serde_json::json!("Completed"));
        store
            .upsert_record(&"PRG009".into(), &update.parse().unwrap())
            .await
            .unwrap();

        // Default mode: drift writes are detached, not awaited
        let reconciler = StageReconciler::new(Arc::clone(&store) as Arc<dyn ProjectStore>);
        let listed = reconciler.reconcile_many(store.list_projects().await.unwrap()).await;
        assert_eq!(listed[0].current_stage, *"AST");

        // The cache converges without the caller ever awaiting the write
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let persisted = store.project(&"PRG009".into()).await.unwrap();
            if persisted.meta.current_stage == "AST" {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "detached label write did not settle"
            );
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn failed_drift_write_inside_reconcile_one_still_returns_label() {
        let mut store = MockStore::new();
        let snapshot = ProjectSnapshot {
            meta: meta("PRG007", ProjectType::Program, "Data Collection"),
            record: Some(completed_through(1)),
        };
        store.expect_project().returning(move |_| Ok(snapshot.clone()));
        store
            .expect_write_stage_label()
            .returning(|_, _| Err(StoreError::Backend("disk full".to_string())));

        let reconciler = StageReconciler::new(Arc::new(store) as Arc<dyn ProjectStore>);
        let label = reconciler.reconcile_one(&"PRG007".into()).await.unwrap();
        assert_eq!(label, *"AST");
    }
}
