//! Weekly timetable engine for the U-Engine ecosystem.
//!
//! Turns raw weekly schedule entries (day, time range, teacher, room,
//! class) into a validated, conflict-free timetable and projects it onto
//! a day × slot grid for display.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeRange`, `DayOfWeek`, `ScheduleEntry`,
//!   `Room`, `Teacher`, `GradeSection`, `Conflict`
//! - **`parser`**: Time text (`"9:00 AM"`, `"14:30"`) to minute-of-day
//! - **`validation`**: Teacher/room overlap detection, capacity checks and
//!   the commit gate
//! - **`grid`**: Day × slot projection with "today" and "full week" modes
//! - **`query`**: Per-teacher, per-room and per-class views
//! - **`store`**: Versioned snapshots with a single-writer commit section
//! - **`engine`**: Write path and read views for one tenant
//! - **`config`**: TOML-loadable grid layout and conflict policy
//!
//! # Architecture
//!
//! The engine owns no storage and no directory of people or rooms. Both
//! are collaborators behind [`store::EntryRepository`] and
//! [`models::ResourceDirectory`]; the crate only decides what may be
//! committed and how committed entries are displayed.
//!
//! # Example
//!
//! ```
//! use u_timetable::config::EngineConfig;
//! use u_timetable::engine::{TimetableEngine, View};
//! use u_timetable::grid::FixedClock;
//! use u_timetable::models::{DayOfWeek, GradeSection, InMemoryDirectory, Room, ScheduleEntry, Teacher};
//! use u_timetable::parser::parse_range;
//! use u_timetable::store::InMemoryRepository;
//!
//! let directory = InMemoryDirectory::new()
//!     .with_teacher(Teacher::new("T1", "Ada"))
//!     .with_room(Room::new("R1", 30))
//!     .with_section(GradeSection::new("G7", "A", 24));
//! let engine = TimetableEngine::open(
//!     "school",
//!     EngineConfig::default(),
//!     InMemoryRepository::new("school"),
//!     directory,
//! )?;
//!
//! let math = ScheduleEntry::new(1, DayOfWeek::Monday, parse_range("9:00 AM", "10:00 AM")?, "MATH", "T1")
//!     .with_room("R1")
//!     .for_class("G7", "A");
//! engine.submit(math)?;
//!
//! // Same teacher, overlapping time: rejected.
//! let art = ScheduleEntry::new(2, DayOfWeek::Monday, parse_range("9:30", "10:30")?, "ART", "T1")
//!     .for_class("G7", "A");
//! assert!(engine.submit(art).is_err());
//!
//! let grid = engine.grid(&View::Teacher("T1".into()), &FixedClock(DayOfWeek::Monday));
//! assert_eq!(grid.occupied_count(), 1);
//! # Ok::<(), u_timetable::error::ScheduleError>(())
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod models;
pub mod parser;
pub mod query;
pub mod store;
pub mod validation;

pub use engine::{BatchReport, CommitMode, EntryOutcome, TimetableEngine, View};
pub use error::{ConfigError, ParseError, Rejection, ScheduleError};
