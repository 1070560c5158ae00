//! Stage field schema and wire grammar
//!
//! Provides the typed view of raw stage updates:
//! - [`FieldKey`] - wire keys of the form `stage{N}_{kind}`
//! - [`StageFieldSet`] - which keys each project type permits
//! - [`StageUpdate`] - raw, ordered key/value update as submitted
//! - [`StageFieldWrite`] - one parsed, type-checked field write
//!
//! Date-valued inputs given as date-only strings (`YYYY-MM-DD`) are coerced
//! to midnight-UTC timestamps at parse time, before they reach any store.

use crate::project::ProjectType;
use crate::stage::{StageOrdinal, StageStatus};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of a per-stage field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Stage start date
    StartDate,
    /// Stage end date
    EndDate,
    /// Stage progress status
    Status,
    /// Validation annotation
    ValidationNote,
}

impl FieldKind {
    /// Wire suffix of this kind (`stage{N}_<suffix>`)
    #[inline]
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            FieldKind::StartDate => "start_date",
            FieldKind::EndDate => "end_date",
            FieldKind::Status => "status",
            FieldKind::ValidationNote => "validation_note",
        }
    }

    /// Whether the field carries a date value
    #[inline]
    #[must_use]
    pub fn is_date(self) -> bool {
        matches!(self, FieldKind::StartDate | FieldKind::EndDate)
    }
}

/// Key of one per-stage field, e.g. `stage3_validation_note`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey {
    /// Stage this field belongs to
    pub ordinal: StageOrdinal,
    /// Field kind
    pub kind: FieldKind,
}

impl FieldKey {
    /// Create a key
    #[inline]
    #[must_use]
    pub fn new(ordinal: StageOrdinal, kind: FieldKind) -> Self {
        Self { ordinal, kind }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stage{}_{}", self.ordinal, self.kind.suffix())
    }
}

impl FromStr for FieldKey {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("stage")
            .ok_or_else(|| FieldError::UnknownKey(s.to_string()))?;
        let (digit, suffix) = rest
            .split_once('_')
            .ok_or_else(|| FieldError::UnknownKey(s.to_string()))?;
        let ordinal = digit
            .parse::<u8>()
            .ok()
            .and_then(StageOrdinal::new)
            .ok_or_else(|| FieldError::UnknownKey(s.to_string()))?;
        let kind = match suffix {
            "start_date" => FieldKind::StartDate,
            "end_date" => FieldKind::EndDate,
            "status" => FieldKind::Status,
            "validation_note" => FieldKind::ValidationNote,
            _ => return Err(FieldError::UnknownKey(s.to_string())),
        };
        Ok(Self { ordinal, kind })
    }
}

/// Per-type field schema
///
/// Date and status fields exist for both types on all six ordinals.
/// Validation notes exist only for the program type on ordinals 2..=6;
/// the manual tables have no note columns at all, and ordinal 1 has none
/// for either type. This asymmetry is schema-level.
#[derive(Debug, Clone, Copy)]
pub struct StageFieldSet;

impl StageFieldSet {
    /// Whether a key exists in the schema of a project type
    #[inline]
    #[must_use]
    pub fn is_allowed(project_type: ProjectType, key: FieldKey) -> bool {
        match key.kind {
            FieldKind::ValidationNote => {
                project_type == ProjectType::Program && key.ordinal > StageOrdinal::FIRST
            }
            _ => true,
        }
    }

    /// All keys permitted for a project type, in ordinal order
    #[inline]
    #[must_use]
    pub fn allowed_keys(project_type: ProjectType) -> &'static [FieldKey] {
        static PROGRAM_KEYS: Lazy<Vec<FieldKey>> =
            Lazy::new(|| StageFieldSet::build_keys(ProjectType::Program));
        static MANUAL_KEYS: Lazy<Vec<FieldKey>> =
            Lazy::new(|| StageFieldSet::build_keys(ProjectType::Manual));
        match project_type {
            ProjectType::Program => &PROGRAM_KEYS,
            ProjectType::Manual => &MANUAL_KEYS,
        }
    }

    fn build_keys(project_type: ProjectType) -> Vec<FieldKey> {
        let kinds = [
            FieldKind::StartDate,
            FieldKind::EndDate,
            FieldKind::Status,
            FieldKind::ValidationNote,
        ];
        StageOrdinal::ALL
            .iter()
            .flat_map(|&ordinal| kinds.iter().map(move |&kind| FieldKey::new(ordinal, kind)))
            .filter(|&key| Self::is_allowed(project_type, key))
            .collect()
    }
}

/// Raw stage update as submitted by a caller
///
/// Keys are wire strings, values raw JSON. Insertion order is preserved so
/// writes apply in submission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageUpdate(pub IndexMap<String, serde_json::Value>);

impl StageUpdate {
    /// Create an empty update
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Whether the update carries no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate key/value pairs in submission order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether a key is present
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Parse every field into a typed write, in submission order
    ///
    /// # Errors
    /// Returns [`FieldError`] on an unrecognized key or a value that does
    /// not fit the field's type.
    pub fn parse(&self) -> Result<Vec<StageFieldWrite>, FieldError> {
        self.iter()
            .map(|(key, value)| {
                let key = FieldKey::from_str(key)?;
                StageFieldWrite::parse(key, value)
            })
            .collect()
    }
}

impl From<IndexMap<String, serde_json::Value>> for StageUpdate {
    fn from(map: IndexMap<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

/// Typed value of one field write
///
/// `Clear` corresponds to an explicit JSON null: it erases the field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Set a date field
    Date(DateTime<Utc>),
    /// Set the status field
    Status(StageStatus),
    /// Set the validation note
    Note(String),
    /// Erase the field
    Clear,
}

/// One parsed, type-checked field write
#[derive(Debug, Clone, PartialEq)]
pub struct StageFieldWrite {
    /// Target field
    pub key: FieldKey,
    /// Value to write
    pub value: FieldValue,
}

impl StageFieldWrite {
    /// Parse a raw JSON value against a field key
    ///
    /// # Errors
    /// Returns [`FieldError`] when the value does not fit the field's type.
    pub fn parse(key: FieldKey, value: &serde_json::Value) -> Result<Self, FieldError> {
        if value.is_null() {
            return Ok(Self { key, value: FieldValue::Clear });
        }
        let value = match key.kind {
            FieldKind::StartDate | FieldKind::EndDate => {
                let s = value.as_str().ok_or_else(|| FieldError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
                FieldValue::Date(parse_date(key, s)?)
            }
            FieldKind::Status => {
                let status: StageStatus = serde_json::from_value(value.clone()).map_err(|_| {
                    FieldError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    }
                })?;
                FieldValue::Status(status)
            }
            FieldKind::ValidationNote => {
                let s = value.as_str().ok_or_else(|| FieldError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
                FieldValue::Note(s.to_string())
            }
        };
        Ok(Self { key, value })
    }
}

/// Coerce a date string to an absolute timestamp
///
/// Accepts either a full RFC 3339 timestamp or a date-only `YYYY-MM-DD`
/// string, which maps to midnight UTC.
fn parse_date(key: FieldKey, s: &str) -> Result<DateTime<Utc>, FieldError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
        .map_err(|_| FieldError::InvalidDate {
            key: key.to_string(),
            value: s.to_string(),
        })
}

/// Malformed stage-update input
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// Key does not match the wire grammar
    #[error("unknown field key: {0}")]
    UnknownKey(String),

    /// Date value could not be coerced
    #[error("invalid date for {key}: {value}")]
    InvalidDate {
        /// Offending key
        key: String,
        /// Submitted value
        value: String,
    },

    /// Value does not fit the field's type
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Offending key
        key: String,
        /// Submitted value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(s: &str) -> FieldKey {
        FieldKey::from_str(s).unwrap()
    }

    #[test]
    fn field_key_round_trips() {
        for s in ["stage1_start_date", "stage3_status", "stage6_validation_note"] {
            assert_eq!(key(s).to_string(), s);
        }
    }

    #[test]
    fn field_key_rejects_bad_keys() {
        for s in ["stage0_status", "stage7_status", "stage3_colour", "etape3_statut", "stage_status"] {
            assert!(FieldKey::from_str(s).is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn note_fields_are_program_only_and_never_ordinal_one() {
        assert!(StageFieldSet::is_allowed(ProjectType::Program, key("stage2_validation_note")));
        assert!(StageFieldSet::is_allowed(ProjectType::Program, key("stage6_validation_note")));
        assert!(!StageFieldSet::is_allowed(ProjectType::Program, key("stage1_validation_note")));
        for n in 1..=6 {
            let k = key(&format!("stage{n}_validation_note"));
            assert!(!StageFieldSet::is_allowed(ProjectType::Manual, k));
        }
    }

    #[test]
    fn date_and_status_fields_allowed_for_both_types() {
        for ty in [ProjectType::Program, ProjectType::Manual] {
            for n in 1..=6 {
                assert!(StageFieldSet::is_allowed(ty, key(&format!("stage{n}_start_date"))));
                assert!(StageFieldSet::is_allowed(ty, key(&format!("stage{n}_end_date"))));
                assert!(StageFieldSet::is_allowed(ty, key(&format!("stage{n}_status"))));
            }
        }
    }

    #[test]
    fn allowed_key_counts() {
        // Program: 6 * 3 scalar fields + 5 note fields
        assert_eq!(StageFieldSet::allowed_keys(ProjectType::Program).len(), 23);
        // Manual: 6 * 3, no notes
        assert_eq!(StageFieldSet::allowed_keys(ProjectType::Manual).len(), 18);
    }

    #[test]
    fn date_only_strings_coerce_to_midnight_utc() {
        let write = StageFieldWrite::parse(key("stage1_start_date"), &json!("2026-03-05")).unwrap();
        match write.value {
            FieldValue::Date(ts) => assert_eq!(ts.to_rfc3339(), "2026-03-05T00:00:00+00:00"),
            other => panic!("expected date, got {other:?}"),
        }
    }

    #[test]
    fn rfc3339_timestamps_pass_through() {
        let write =
            StageFieldWrite::parse(key("stage2_end_date"), &json!("2026-03-05T14:30:00+01:00"))
                .unwrap();
        match write.value {
            FieldValue::Date(ts) => assert_eq!(ts.to_rfc3339(), "2026-03-05T13:30:00+00:00"),
            other => panic!("expected date, got {other:?}"),
        }
    }

    #[test]
    fn null_means_clear() {
        let write = StageFieldWrite::parse(key("stage4_status"), &serde_json::Value::Null).unwrap();
        assert_eq!(write.value, FieldValue::Clear);
    }

    #[test]
    fn bad_date_surfaces() {
        let err = StageFieldWrite::parse(key("stage1_start_date"), &json!("soon")).unwrap_err();
        assert!(matches!(err, FieldError::InvalidDate { .. }));
    }

    #[test]
    fn status_parses_enum_names() {
        let write = StageFieldWrite::parse(key("stage3_status"), &json!("InProgress")).unwrap();
        assert_eq!(write.value, FieldValue::Status(StageStatus::InProgress));

        let err = StageFieldWrite::parse(key("stage3_status"), &json!("Finished")).unwrap_err();
        assert!(matches!(err, FieldError::InvalidValue { .. }));
    }

    #[test]
    fn update_parse_preserves_submission_order() {
        let update = StageUpdate::new()
            .with("stage2_status", json!("Completed"))
            .with("stage1_status", json!("Completed"));
        let writes = update.parse().unwrap();
        assert_eq!(writes[0].key, key("stage2_status"));
        assert_eq!(writes[1].key, key("stage1_status"));
    }

    #[test]
    fn update_parse_rejects_unknown_keys() {
        let update = StageUpdate::new().with("stage3_colour", json!("blue"));
        let err = update.parse().unwrap_err();
        assert!(matches!(err, FieldError::UnknownKey(_)));
    }
}
