//! Testing utilities for the atelier workspace
//!
//! Shared fixtures: seeded engines, project inputs, and stage records.

#![allow(missing_docs)]

use atelier_domain::{
    NewProject, ProjectType, StageOrdinal, StageRecord, StageStatus, StageUpdate,
};
use atelier_engine::{EngineConfig, WorkflowEngine};
use atelier_store::{AuditSink, InMemoryStore, MemoryAuditSink, ProjectStore};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

/// Engine wired to fresh in-memory collaborators, with handles to both.
/// Batch reconciliation is synchronous so tests observe cache writes
/// deterministically.
pub fn setup_test_engine() -> (WorkflowEngine, Arc<InMemoryStore>, Arc<MemoryAuditSink>) {
    let store = Arc::new(InMemoryStore::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let engine = WorkflowEngine::new(
        EngineConfig::new().with_synchronous_reconciliation(true),
        Arc::clone(&store) as Arc<dyn ProjectStore>,
        Arc::clone(&audit) as Arc<dyn AuditSink>,
    );
    (engine, store, audit)
}

pub fn sample_program(id: &str) -> NewProject {
    NewProject::new(id, ProjectType::Program, format!("Program {id}"), Utc::now())
}

pub fn sample_manual(id: &str) -> NewProject {
    NewProject::new(id, ProjectType::Manual, format!("Manual {id}"), Utc::now())
}

/// Record with the first `n` stages completed.
pub fn record_completed_through(n: u8) -> StageRecord {
    let mut record = StageRecord::empty();
    for ordinal in StageOrdinal::ALL.iter().take(usize::from(n)) {
        record.slot_mut(*ordinal).status = Some(StageStatus::Completed);
    }
    record
}

/// Update marking stages `1..=n` completed.
pub fn update_completing_through(n: u8) -> StageUpdate {
    let mut update = StageUpdate::new();
    for i in 1..=n {
        update = update.with(format!("stage{i}_status"), json!("Completed"));
    }
    update
}
