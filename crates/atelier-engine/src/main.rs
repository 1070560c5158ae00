//! Demo driver for the atelier workflow engine
//!
//! Seeds an in-memory store, applies stage updates, and prints the derived
//! listing and workflow statistics.

use anyhow::Context;
use atelier_domain::{NewProject, ProjectType, StageUpdate};
use atelier_engine::{EngineConfig, WorkflowEngine};
use atelier_store::{AuditSink, InMemoryStore, MemoryAuditSink, ProjectStore};
use chrono::{Duration, Utc};
use clap::{Arg, ArgAction, Command};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Command::new("atelier")
        .version("0.1.0")
        .about("Atelier workflow stage engine")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("demo")
                .about("Seed an in-memory store and walk projects through the workflow")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the listing and statistics as JSON"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("demo", matches)) => run_demo(matches.get_flag("json")).await,
        _ => unreachable!("subcommand required"),
    }
}

async fn run_demo(as_json: bool) -> anyhow::Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let engine = WorkflowEngine::new(
        EngineConfig::new().with_synchronous_reconciliation(true),
        Arc::clone(&store) as Arc<dyn ProjectStore>,
        Arc::clone(&audit) as Arc<dyn AuditSink>,
    );

    let now = Utc::now();
    engine
        .register_project(
            NewProject::new("PRG001", ProjectType::Program, "Industrial welding program", now)
                .with_due_on(now + Duration::days(120)),
        )
        .await
        .context("registering PRG001")?;
    engine
        .register_project(
            NewProject::new("MAN001", ProjectType::Manual, "Welding safety manual", now)
                .with_due_on(now - Duration::days(3)),
        )
        .await
        .context("registering MAN001")?;

    // Walk the program through its first two stages
    let update = StageUpdate::new()
        .with("stage1_start_date", json!("2026-01-05"))
        .with("stage1_end_date", json!("2026-02-10"))
        .with("stage1_status", json!("Completed"))
        .with("stage2_status", json!("InProgress"))
        .with("stage2_validation_note", json!("AST reviewed by committee"));
    let outcome = engine
        .update_stages(&"PRG001".into(), update)
        .await
        .context("updating PRG001 stages")?;
    tracing::info!(label = %outcome.current_stage, "program advanced");

    // The manual only gets its first stage started
    let update = StageUpdate::new().with("stage1_status", json!("InProgress"));
    engine
        .update_stages(&"MAN001".into(), update)
        .await
        .context("updating MAN001 stages")?;

    let listed = engine.list_projects().await?;
    let stats = engine.stats(Utc::now()).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        for project in &listed {
            println!(
                "{:<8} {:<10} {:<32} stage: {}",
                project.meta.id,
                project.meta.project_type.to_string(),
                project.meta.title,
                project.current_stage
            );
        }
        println!(
            "in progress: {}, done: {}, overdue: {}",
            stats.in_progress, stats.done, stats.overdue
        );
        println!("audit events: {}", audit.len());
    }

    Ok(())
}
