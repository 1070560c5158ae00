//! End-to-end engine flow: registration, stage editing, listing, stats

use atelier_domain::{StageOrdinal, StageStatus, StageUpdate};
use atelier_engine::EngineError;
use atelier_store::AuditAction;
use atelier_test_utils::{
    sample_manual, sample_program, setup_test_engine, update_completing_through,
};
use chrono::Utc;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn full_project_lifecycle() {
    let (engine, store, audit) = setup_test_engine();

    // Registration seeds the row, the record, and the first-stage label
    let meta = engine.register_project(sample_manual("MAN001")).await.unwrap();
    assert_eq!(meta.current_stage, "Data Collection");

    // Drafting begins
    let update = StageUpdate::new()
        .with("stage1_status", json!("Completed"))
        .with("stage2_start_date", json!("2026-02-01"))
        .with("stage2_status", json!("InProgress"));
    let outcome = engine.update_stages(&"MAN001".into(), update).await.unwrap();
    assert_eq!(outcome.current_stage.as_str(), "Drafting");

    // Drafting completes: the label moves to Formatting and the cache follows
    let update = StageUpdate::new()
        .with("stage2_end_date", json!("2026-03-01"))
        .with("stage2_status", json!("Completed"));
    let outcome = engine.update_stages(&"MAN001".into(), update).await.unwrap();
    assert_eq!(outcome.current_stage.as_str(), "Formatting");

    use atelier_store::ProjectStore;
    let persisted = store.project(&"MAN001".into()).await.unwrap();
    assert_eq!(persisted.meta.current_stage, "Formatting");

    // Finish everything
    engine
        .update_stages(&"MAN001".into(), update_completing_through(6))
        .await
        .unwrap();
    let listed = engine.list_projects().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].current_stage.is_done());

    // One registration event plus one per progress-touching update
    let actions: Vec<AuditAction> = audit.events().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::ProjectRegistered,
            AuditAction::StagesUpdated,
            AuditAction::StagesUpdated,
            AuditAction::StagesUpdated,
        ]
    );
}

#[tokio::test]
async fn listing_repairs_stale_labels_without_failing_the_read() {
    let (engine, store, _) = setup_test_engine();
    engine.register_project(sample_program("PRG001")).await.unwrap();

    // Mutate the record behind the engine's back so the cache drifts
    use atelier_store::ProjectStore;
    let update = update_completing_through(2);
    store
        .upsert_record(&"PRG001".into(), &update.parse().unwrap())
        .await
        .unwrap();
    let stale = store.project(&"PRG001".into()).await.unwrap();
    assert_eq!(stale.meta.current_stage, "Data Collection");

    // The listing carries the fresh label and repairs the cache
    let listed = engine.list_projects().await.unwrap();
    assert_eq!(listed[0].current_stage.as_str(), "RAP+RC");
    let repaired = store.project(&"PRG001".into()).await.unwrap();
    assert_eq!(repaired.meta.current_stage, "RAP+RC");
}

#[tokio::test]
async fn program_and_manual_share_dates_but_not_notes() {
    let (engine, _, _) = setup_test_engine();
    engine.register_project(sample_program("PRG001")).await.unwrap();
    engine.register_project(sample_manual("MAN001")).await.unwrap();

    let note_update = StageUpdate::new()
        .with("stage3_validation_note", json!("committee sign-off"))
        .with("stage3_start_date", json!("2026-04-01"));
    let third = StageOrdinal::new(3).unwrap();

    // The program keeps the note
    let outcome = engine
        .update_stages(&"PRG001".into(), note_update.clone())
        .await
        .unwrap();
    assert_eq!(
        outcome.record.slot(third).validation_note.as_deref(),
        Some("committee sign-off")
    );

    // The manual drops it but keeps the date
    let outcome = engine
        .update_stages(&"MAN001".into(), note_update)
        .await
        .unwrap();
    assert!(outcome.record.slot(third).validation_note.is_none());
    assert!(outcome.record.slot(third).start_date.is_some());
}

#[tokio::test]
async fn clearing_a_status_reopens_the_stage() {
    let (engine, _, _) = setup_test_engine();
    engine.register_project(sample_manual("MAN001")).await.unwrap();

    engine
        .update_stages(&"MAN001".into(), update_completing_through(3))
        .await
        .unwrap();
    let label = engine.current_stage(&"MAN001".into()).await.unwrap();
    assert_eq!(label.as_str(), "Internal Validation");

    // Clearing stage 2 makes it the bottleneck again
    let update = StageUpdate::new().with("stage2_status", serde_json::Value::Null);
    let outcome = engine.update_stages(&"MAN001".into(), update).await.unwrap();
    assert_eq!(outcome.current_stage.as_str(), "Drafting");
    assert_eq!(
        outcome.record.status(StageOrdinal::new(2).unwrap()),
        StageStatus::NotStarted
    );
}

#[tokio::test]
async fn stats_over_a_mixed_portfolio() {
    let (engine, _, _) = setup_test_engine();
    engine.register_project(sample_program("PRG001")).await.unwrap();
    engine.register_project(sample_program("PRG002")).await.unwrap();
    engine.register_project(sample_manual("MAN001")).await.unwrap();

    engine
        .update_stages(&"PRG001".into(), update_completing_through(6))
        .await
        .unwrap();
    engine
        .update_stages(&"MAN001".into(), update_completing_through(1))
        .await
        .unwrap();

    let stats = engine.stats(Utc::now()).await.unwrap();
    assert_eq!(stats.done, 1);
    assert_eq!(stats.in_progress, 2);
    assert_eq!(stats.overdue, 0);
}

#[tokio::test]
async fn missing_project_errors_are_distinct() {
    let (engine, _, _) = setup_test_engine();
    let err = engine.stage_record(&"PRG404".into()).await.unwrap_err();
    assert!(matches!(err, EngineError::ProjectNotFound(_)));
}
