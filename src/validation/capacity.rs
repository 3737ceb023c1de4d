//! Room capacity check.

use crate::error::Rejection;
use crate::models::{GradeSection, Room, ScheduleEntry};

/// Checks that a grade section fits the room an entry is bound to.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityValidator;

impl CapacityValidator {
    /// Validates one entry.
    ///
    /// Entries without a room always pass. `room` is the resolved room
    /// for `entry.room_ref`.
    pub fn validate(
        entry: &ScheduleEntry,
        room: &Room,
        section: &GradeSection,
    ) -> Result<(), Rejection> {
        if entry.room_ref.is_none() || room.fits(section.size) {
            return Ok(());
        }
        Err(Rejection::CapacityExceeded {
            entry: entry.id,
            room: room.id.clone(),
            capacity: room.capacity,
            size: section.size,
        })
    }
}
