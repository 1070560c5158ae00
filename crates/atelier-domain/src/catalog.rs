//! Stage catalogs
//!
//! The two fixed workflow templates, six ordered stages each, and the
//! [`StageLabel`] type covering catalog names plus the terminal `"Done"`
//! sentinel. Catalogs are process-wide immutable data.

use crate::project::ProjectType;
use crate::stage::StageOrdinal;
use serde::{Serialize, Serializer};

/// One entry of a stage catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDef {
    /// Position within the catalog, 1..=6
    pub ordinal: StageOrdinal,
    /// Stage name, unique within its catalog
    pub name: &'static str,
}

/// Program workflow: study programs
pub const PROGRAM_STAGES: [StageDef; StageOrdinal::COUNT] = [
    StageDef { ordinal: StageOrdinal::ALL[0], name: "Data Collection" },
    StageDef { ordinal: StageOrdinal::ALL[1], name: "AST" },
    StageDef { ordinal: StageOrdinal::ALL[2], name: "RAP+RC" },
    StageDef { ordinal: StageOrdinal::ALL[3], name: "PE" },
    StageDef { ordinal: StageOrdinal::ALL[4], name: "Equipment Plan" },
    StageDef { ordinal: StageOrdinal::ALL[5], name: "Publication" },
];

/// Manual workflow: training manuals
pub const MANUAL_STAGES: [StageDef; StageOrdinal::COUNT] = [
    StageDef { ordinal: StageOrdinal::ALL[0], name: "Data Collection" },
    StageDef { ordinal: StageOrdinal::ALL[1], name: "Drafting" },
    StageDef { ordinal: StageOrdinal::ALL[2], name: "Formatting" },
    StageDef { ordinal: StageOrdinal::ALL[3], name: "Internal Validation" },
    StageDef { ordinal: StageOrdinal::ALL[4], name: "Final Validation" },
    StageDef { ordinal: StageOrdinal::ALL[5], name: "Publication" },
];

/// Catalog for a project type, in ordinal order
#[inline]
#[must_use]
pub fn stages_for(project_type: ProjectType) -> &'static [StageDef; StageOrdinal::COUNT] {
    match project_type {
        ProjectType::Program => &PROGRAM_STAGES,
        ProjectType::Manual => &MANUAL_STAGES,
    }
}

/// Derived current-stage label
///
/// Either a catalog stage name or the terminal sentinel, which is distinct
/// from every catalog name. Serializes as its display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageLabel {
    /// Named catalog stage
    Stage(&'static str),
    /// All six stages completed
    Done,
}

impl StageLabel {
    /// Label of the first stage of a project type
    #[inline]
    #[must_use]
    pub fn first(project_type: ProjectType) -> Self {
        StageLabel::Stage(stages_for(project_type)[0].name)
    }

    /// The label as a string
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StageLabel::Stage(name) => name,
            StageLabel::Done => "Done",
        }
    }

    /// Whether this is the terminal label
    #[inline]
    #[must_use]
    pub fn is_done(self) -> bool {
        matches!(self, StageLabel::Done)
    }
}

impl std::fmt::Display for StageLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PartialEq<str> for StageLabel {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl Serialize for StageLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
