//! Schedule entry model.
//!
//! A schedule entry is one recurring weekly commitment: a teacher teaches
//! a subject to a grade section, optionally in a room, at the same time
//! on the same day every week.
//!
//! # Lifecycle
//!
//! ```text
//! Draft --validate--> Committed --delete/cascade--> Deleted
//!   \
//!    `--validate--> Rejected
//! ```
//!
//! Committed entries are never edited in place; an edit is a delete plus
//! a re-validated insert.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DayOfWeek, TimeRange};

/// Identifier of a schedule entry.
///
/// Numeric so that "lower id wins" is well-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recurring weekly timetable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Unique entry identifier.
    pub id: EntryId,
    /// Weekday the entry recurs on.
    pub day: DayOfWeek,
    /// Minute-of-day range.
    pub time: TimeRange,
    /// Subject taught.
    pub subject_ref: String,
    /// Teacher teaching.
    pub teacher_ref: String,
    /// Room used, if any.
    pub room_ref: Option<String>,
    /// Grade of the class group.
    pub grade_ref: String,
    /// Section of the class group within its grade.
    pub section_ref: String,
}

impl ScheduleEntry {
    /// Creates an entry without a room.
    pub fn new(
        id: u64,
        day: DayOfWeek,
        time: TimeRange,
        subject_ref: impl Into<String>,
        teacher_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId(id),
            day,
            time,
            subject_ref: subject_ref.into(),
            teacher_ref: teacher_ref.into(),
            room_ref: None,
            grade_ref: String::new(),
            section_ref: String::new(),
        }
    }

    /// Binds the entry to a room.
    pub fn with_room(mut self, room_ref: impl Into<String>) -> Self {
        self.room_ref = Some(room_ref.into());
        self
    }

    /// Sets the grade section.
    pub fn for_class(mut self, grade_ref: impl Into<String>, section_ref: impl Into<String>) -> Self {
        self.grade_ref = grade_ref.into();
        self.section_ref = section_ref.into();
        self
    }

    /// Replaces the identifier.
    pub fn with_id(mut self, id: EntryId) -> Self {
        self.id = id;
        self
    }

    /// Start minute.
    #[inline]
    pub fn start(&self) -> u16 {
        self.time.start()
    }

    /// End minute (exclusive).
    #[inline]
    pub fn end(&self) -> u16 {
        self.time.end()
    }

    /// Whether two entries fall on the same day with overlapping times.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day && self.time.overlaps(&other.time)
    }

    /// Whether two entries book the same teacher and room for the same
    /// day and range. Subject and class are not compared.
    pub fn is_duplicate_of(&self, other: &Self) -> bool {
        self.day == other.day
            && self.time == other.time
            && self.teacher_ref == other.teacher_ref
            && self.room_ref == other.room_ref
    }

    /// Canonical read order: `(day, start, id)`.
    pub fn sort_key(&self) -> (DayOfWeek, u16, EntryId) {
        (self.day, self.start(), self.id)
    }
}

/// Lifecycle state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryState {
    /// Proposed, not yet validated.
    Draft,
    /// Validated and visible to reads.
    Committed,
    /// Failed validation and discarded.
    Rejected,
    /// Removed after having been committed.
    Deleted,
}

impl EntryState {
    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: EntryState) -> bool {
        matches!(
            (self, next),
            (EntryState::Draft, EntryState::Committed)
                | (EntryState::Draft, EntryState::Rejected)
                | (EntryState::Committed, EntryState::Deleted)
        )
    }

    /// Whether no further transitions exist.
    pub fn is_terminal(self) -> bool {
        matches!(self, EntryState::Rejected | EntryState::Deleted)
    }
}
