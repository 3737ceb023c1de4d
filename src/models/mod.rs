//! Timetable domain models.
//!
//! Provides the core data types for a recurring weekly timetable:
//! time ranges, schedule entries, the resources they occupy, and the
//! conflicts that arise when two entries claim the same resource.
//!
//! # Domain Mappings
//!
//! | u-timetable | School | University | Clinic |
//! |-------------|--------|------------|--------|
//! | ScheduleEntry | Period | Lecture | Recurring appointment |
//! | Teacher | Teacher | Lecturer | Practitioner |
//! | Room | Classroom | Lecture hall | Consulting room |
//! | GradeSection | Class (7-B) | Course group | Patient cohort |

mod conflict;
mod entry;
mod resource;
mod time;

pub use conflict::{Conflict, ConflictKind};
pub use entry::{EntryId, EntryState, ScheduleEntry};
pub use resource::{
    GradeSection, InMemoryDirectory, ResourceDirectory, ResourceKind, Room, Teacher,
};
pub use time::{DayOfWeek, TimeRange, MINUTES_PER_DAY};
