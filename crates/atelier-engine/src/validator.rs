//! Stage-update validation
//!
//! Filters incoming raw updates before they are parsed and persisted.
//! Validation-note keys the project type's schema lacks are silently
//! dropped rather than rejected, tolerating legacy callers that submit the
//! full program-shaped form for every project. Every other key passes
//! through untouched, including explicit nulls ("clear this field");
//! unrecognized keys are left for the typed parse step to reject.

use atelier_domain::{FieldKey, ProjectType, StageFieldSet, StageUpdate};
use std::str::FromStr;

/// Drop validation-note fields the project type does not permit
///
/// Veto-only: this function never adds, renames, or reorders fields, and
/// it does not whitelist-enforce. Dropped keys are logged at debug.
#[must_use]
pub fn filter_update(project_type: ProjectType, raw: &StageUpdate) -> StageUpdate {
    let mut cleaned = StageUpdate::new();
    for (key, value) in raw.iter() {
        if let Ok(parsed) = FieldKey::from_str(key) {
            if !StageFieldSet::is_allowed(project_type, parsed) {
                tracing::debug!(
                    %project_type,
                    field = key,
                    "dropped field not in this type's schema"
                );
                continue;
            }
        }
        cleaned = cleaned.with(key, value.clone());
    }
    cleaned
}
