//! In-memory project store
//!
//! DashMap-backed reference implementation of [`ProjectStore`]. Serves the
//! demo binary and the test suites; a relational backend would implement
//! the same trait against its own schema.

use crate::{ProjectStore, StoreError};
use atelier_domain::{
    FieldKind, FieldValue, ProjectId, ProjectMeta, ProjectSnapshot, StageFieldSet,
    StageFieldWrite, StageLabel, StageRecord,
};
use dashmap::DashMap;

/// One stored project row
#[derive(Debug, Clone)]
struct ProjectRow {
    meta: ProjectMeta,
    record: Option<StageRecord>,
}

/// In-memory [`ProjectStore`]
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: DashMap<ProjectId, ProjectRow>,
}

impl InMemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored projects
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no projects
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn apply_write(
        meta: &ProjectMeta,
        record: &mut StageRecord,
        write: &StageFieldWrite,
    ) -> Result<(), StoreError> {
        // Schema-level guard: the manual tables have no note columns, and
        // ordinal 1 has none for either type.
        if !StageFieldSet::is_allowed(meta.project_type, write.key) {
            return Err(StoreError::UnknownField {
                key: write.key.to_string(),
            });
        }

        let slot = record.slot_mut(write.key.ordinal);
        match (write.key.kind, &write.value) {
            (FieldKind::StartDate, FieldValue::Date(ts)) => slot.start_date = Some(*ts),
            (FieldKind::StartDate, FieldValue::Clear) => slot.start_date = None,
            (FieldKind::EndDate, FieldValue::Date(ts)) => slot.end_date = Some(*ts),
            (FieldKind::EndDate, FieldValue::Clear) => slot.end_date = None,
            (FieldKind::Status, FieldValue::Status(status)) => slot.status = Some(*status),
            (FieldKind::Status, FieldValue::Clear) => slot.status = None,
            (FieldKind::ValidationNote, FieldValue::Note(note)) => {
                slot.validation_note = Some(note.clone());
            }
            (FieldKind::ValidationNote, FieldValue::Clear) => slot.validation_note = None,
            (kind, value) => {
                return Err(StoreError::Backend(format!(
                    "value {value:?} does not fit field kind {kind:?}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectStore for InMemoryStore {
    async fn project(&self, id: &ProjectId) -> Result<ProjectSnapshot, StoreError> {
        let row = self
            .rows
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(ProjectSnapshot {
            meta: row.meta.clone(),
            record: row.record.clone(),
        })
    }

    async fn insert_project(&self, meta: ProjectMeta) -> Result<(), StoreError> {
        let id = meta.id.clone();
        match self.rows.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StoreError::DuplicateProject(id))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(ProjectRow { meta, record: None });
                Ok(())
            }
        }
    }

    async fn create_record(&self, id: &ProjectId) -> Result<StageRecord, StoreError> {
        let mut row = self
            .rows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let record = row.record.get_or_insert_with(StageRecord::empty);
        Ok(record.clone())
    }

    async fn upsert_record(
        &self,
        id: &ProjectId,
        writes: &[StageFieldWrite],
    ) -> Result<StageRecord, StoreError> {
        let mut row = self
            .rows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let meta = row.meta.clone();
        // Apply to a scratch copy so a rejected write commits nothing
        let mut record = row.record.clone().unwrap_or_default();
        for write in writes {
            Self::apply_write(&meta, &mut record, write)?;
        }
        row.record = Some(record.clone());
        Ok(record)
    }

    async fn write_stage_label(
        &self,
        id: &ProjectId,
        label: StageLabel,
    ) -> Result<(), StoreError> {
        let mut row = self
            .rows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        tracing::debug!(project = %id, label = %label, "stage label written");
        row.meta.current_stage = label.as_str().to_string();
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSnapshot>, StoreError> {
        let mut snapshots: Vec<ProjectSnapshot> = self
            .rows
            .iter()
            .map(|row| ProjectSnapshot {
                meta: row.meta.clone(),
                record: row.record.clone(),
            })
            .collect();
        // Newest first
        snapshots.sort_by(|a, b| b.meta.created_at.cmp(&a.meta.created_at));
        Ok(snapshots)
    }
}
