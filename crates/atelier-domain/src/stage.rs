//! Stage records
//!
//! The per-project aggregate of per-stage field values:
//! - [`StageOrdinal`] - position 1..=6 within a catalog
//! - [`StageStatus`] - per-stage progress status
//! - [`StageSlot`] - the field values of one stage
//! - [`StageRecord`] - all six slots of one project

use serde::{Deserialize, Serialize};

/// Position of a stage within a catalog, 1..=6
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageOrdinal(u8);

impl StageOrdinal {
    /// Number of stages in every catalog
    pub const COUNT: usize = 6;

    /// All ordinals in catalog order
    pub const ALL: [StageOrdinal; Self::COUNT] = [
        StageOrdinal(1),
        StageOrdinal(2),
        StageOrdinal(3),
        StageOrdinal(4),
        StageOrdinal(5),
        StageOrdinal(6),
    ];

    /// First stage of every catalog
    pub const FIRST: StageOrdinal = StageOrdinal(1);

    /// Create an ordinal, if within 1..=6
    #[inline]
    #[must_use]
    pub fn new(n: u8) -> Option<Self> {
        (1..=Self::COUNT as u8).contains(&n).then_some(Self(n))
    }

    /// Numeric value, 1..=6
    #[inline]
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index for slot arrays
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }
}

impl std::fmt::Display for StageOrdinal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Progress status of a single stage
///
/// A stage with no recorded status is treated everywhere as `NotStarted`;
/// only `Completed` is terminal for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageStatus {
    /// No work recorded yet (equivalent to an absent value)
    NotStarted,
    /// Waiting on an external party
    Pending,
    /// Actively being worked
    InProgress,
    /// Finished
    Completed,
}

impl StageStatus {
    /// Whether this status closes the stage
    #[inline]
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, StageStatus::Completed)
    }
}

/// Field values of one stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageSlot {
    /// When work on the stage started
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    /// When work on the stage ended
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    /// Progress status (`None` is equivalent to `NotStarted`)
    pub status: Option<StageStatus>,
    /// Validation annotation (program type, ordinals 2..=6 only)
    pub validation_note: Option<String>,
}

impl StageSlot {
    /// Effective status, mapping an absent value to `NotStarted`
    #[inline]
    #[must_use]
    pub fn effective_status(&self) -> StageStatus {
        self.status.unwrap_or(StageStatus::NotStarted)
    }

    /// Whether the stage is completed
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.effective_status().is_completed()
    }

    /// Whether no field of this slot holds a value
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.status.is_none()
            && self.validation_note.is_none()
    }
}

/// Per-project stage record: one slot per catalog ordinal
///
/// Exists 1:1 with its parent project, created empty alongside it. The
/// record is the source of truth for stage derivation; the project row's
/// cached label is derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    slots: [StageSlot; StageOrdinal::COUNT],
}

impl StageRecord {
    /// Create an empty record (all stages untouched)
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Slot for an ordinal
    #[inline]
    #[must_use]
    pub fn slot(&self, ordinal: StageOrdinal) -> &StageSlot {
        &self.slots[ordinal.index()]
    }

    /// Mutable slot for an ordinal
    #[inline]
    pub fn slot_mut(&mut self, ordinal: StageOrdinal) -> &mut StageSlot {
        &mut self.slots[ordinal.index()]
    }

    /// Effective status of an ordinal
    #[inline]
    #[must_use]
    pub fn status(&self, ordinal: StageOrdinal) -> StageStatus {
        self.slot(ordinal).effective_status()
    }

    /// Whether every stage is completed
    #[inline]
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.slots.iter().all(StageSlot::is_completed)
    }

    /// Whether no field of any slot holds a value
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(StageSlot::is_empty)
    }

    /// Iterate slots in ordinal order
    pub fn iter(&self) -> impl Iterator<Item = (StageOrdinal, &StageSlot)> {
        StageOrdinal::ALL.iter().map(|&o| (o, self.slot(o)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_bounds() {
        assert!(StageOrdinal::new(0).is_none());
        assert!(StageOrdinal::new(7).is_none());
        assert_eq!(StageOrdinal::new(3).unwrap().get(), 3);
        assert_eq!(StageOrdinal::new(1).unwrap(), StageOrdinal::FIRST);
    }

    #[test]
    fn ordinal_index() {
        assert_eq!(StageOrdinal::FIRST.index(), 0);
        assert_eq!(StageOrdinal::new(6).unwrap().index(), 5);
    }

    #[test]
    fn absent_status_is_not_started() {
        let slot = StageSlot::default();
        assert_eq!(slot.effective_status(), StageStatus::NotStarted);
        assert!(!slot.is_completed());
    }

    #[test]
    fn empty_record() {
        let record = StageRecord::empty();
        assert!(record.is_empty());
        assert!(!record.all_completed());
        assert_eq!(record.iter().count(), 6);
    }

    #[test]
    fn all_completed_requires_every_slot() {
        let mut record = StageRecord::empty();
        for ordinal in StageOrdinal::ALL.iter().take(5) {
            record.slot_mut(*ordinal).status = Some(StageStatus::Completed);
        }
        assert!(!record.all_completed());

        record.slot_mut(StageOrdinal::new(6).unwrap()).status = Some(StageStatus::Completed);
        assert!(record.all_completed());
    }
}
