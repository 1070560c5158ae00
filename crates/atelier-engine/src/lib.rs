//! Atelier engine - workflow stage derivation and reconciliation
//!
//! The coordinating crate of the atelier workspace:
//! - Derives a project's current stage from its sparse stage record
//! - Validates stage updates against the per-type field schema
//! - Keeps the cached current-stage label reconciled with derivation
//! - Exposes the [`WorkflowEngine`] facade used by callers
//!
//! # Example
//!
//! ```rust,ignore
//! use atelier_engine::{EngineConfig, WorkflowEngine};
//! use atelier_store::{InMemoryStore, MemoryAuditSink};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = WorkflowEngine::new(
//!     EngineConfig::new(),
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(MemoryAuditSink::new()),
//! );
//! let listed = engine.list_projects().await?;
//! println!("{} projects", listed.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod deriver;
pub mod error;
pub mod reconciler;
pub mod stats;
pub mod validator;
pub mod workflow;

// Re-exports for convenience
pub use deriver::derive_current_stage;
pub use error::EngineError;
pub use reconciler::{ListedProject, StageReconciler};
pub use stats::WorkflowStats;
pub use validator::filter_update;
pub use workflow::{EngineConfig, StageUpdateOutcome, WorkflowEngine};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the atelier engine
    pub use crate::{
        derive_current_stage, EngineConfig, EngineError, ListedProject, StageReconciler,
        StageUpdateOutcome, WorkflowEngine, WorkflowStats,
    };
}
