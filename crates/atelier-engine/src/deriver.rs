//! Current-stage derivation
//!
//! The single pure function mapping a stage record to its current-stage
//! label. Every call site in the engine depends on this one function; the
//! persisted label on the project row is only ever a cache of its result.

use atelier_domain::{stages_for, ProjectType, StageLabel, StageRecord};

/// Derive the current-stage label for a project
///
/// Rules, in order:
/// 1. No record yet: the workflow has not begun, the first stage's name is
///    still owed.
/// 2. Every stage completed: the terminal `Done` label.
/// 3. Otherwise the first stage, in ordinal order, whose status is not
///    `Completed` - an absent status counts as not completed, so an
///    untouched record yields the first stage's name.
///
/// Ordinal order is semantically meaningful: the first incomplete stage is
/// the workflow's current bottleneck.
#[must_use]
pub fn derive_current_stage(
    record: Option<&StageRecord>,
    project_type: ProjectType,
) -> StageLabel {
    let catalog = stages_for(project_type);

    let Some(record) = record else {
        return StageLabel::Stage(catalog[0].name);
    };

    if record.all_completed() {
        return StageLabel::Done;
    }

    for def in catalog {
        if !record.status(def.ordinal).is_completed() {
            return StageLabel::Stage(def.name);
        }
    }

    // Unreachable: an incomplete record always has a first incomplete stage
    StageLabel::Stage(catalog[0].name)
}
