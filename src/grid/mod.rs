//! Day × slot projection of a timetable.
//!
//! Turns a set of committed entries into a fixed grid for display: one
//! row per day, one cell per slot. A slot is occupied by an entry when
//! the slot's start minute lies inside the entry's range, so a 90-minute
//! entry on a 60-minute grid occupies two cells.
//!
//! # Determinism
//! Building never fails and has no side effects. If two entries claim
//! the same cell (which a validated set does not produce for one teacher
//! or one room under a strict policy), the lower id keeps the cell and the
//! pair is reported in [`Grid::ignored_conflicts`].

mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

use std::collections::HashSet;

use log::{debug, warn};
use serde::Serialize;

use crate::config::{FilterMode, GridConfig};
use crate::models::{DayOfWeek, EntryId, ScheduleEntry};
use crate::parser::{format_minute, ClockStyle};

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    /// Slot start minute.
    pub slot_start: u16,
    /// Occupying entry, if any.
    pub entry: Option<EntryId>,
}

/// One day of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    /// Day of this row.
    pub day: DayOfWeek,
    /// Cells in slot order.
    pub cells: Vec<GridCell>,
}

/// A cell collision resolved in favour of the lower id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IgnoredConflict {
    /// Day of the first contested cell.
    pub day: DayOfWeek,
    /// Slot start of the first contested cell.
    pub slot_start: u16,
    /// Entry shown in the cell.
    pub kept: EntryId,
    /// Entry left out of the cell.
    pub dropped: EntryId,
}

/// A built timetable grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    /// Width of each slot in minutes.
    pub slot_minutes: u16,
    /// Slot start minutes (the column axis).
    pub slot_starts: Vec<u16>,
    /// One row per day (the row axis).
    pub rows: Vec<GridRow>,
    /// Collisions the grid resolved silently.
    pub ignored_conflicts: Vec<IgnoredConflict>,
}

impl Grid {
    /// Days on the row axis.
    pub fn days(&self) -> Vec<DayOfWeek> {
        self.rows.iter().map(|r| r.day).collect()
    }

    /// Entry occupying a cell. `None` for empty or unknown cells.
    pub fn get(&self, day: DayOfWeek, slot_start: u16) -> Option<EntryId> {
        self.rows
            .iter()
            .find(|r| r.day == day)?
            .cells
            .iter()
            .find(|c| c.slot_start == slot_start)?
            .entry
    }

    /// Column labels (e.g. `"9:00 AM"`).
    pub fn slot_labels(&self, style: ClockStyle) -> Vec<String> {
        self.slot_starts
            .iter()
            .map(|&s| format_minute(s, style))
            .collect()
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .filter(|c| c.entry.is_some())
            .count()
    }
}

/// Grid builder.
///
/// # Examples
///
/// ```
/// use u_timetable::config::{FilterMode, GridConfig};
/// use u_timetable::grid::{FixedClock, TimeSlotGrid};
/// use u_timetable::models::{DayOfWeek, EntryId, ScheduleEntry};
/// use u_timetable::parser::parse_range;
///
/// let entries = vec![
///     ScheduleEntry::new(1, DayOfWeek::Monday, parse_range("9:00 AM", "10:30 AM").unwrap(), "MATH", "T1"),
///     ScheduleEntry::new(2, DayOfWeek::Wednesday, parse_range("11:00", "12:00").unwrap(), "ART", "T1"),
/// ];
///
/// let grid = TimeSlotGrid::new(GridConfig::default().with_filter(FilterMode::Today))
///     .build(&entries, &FixedClock(DayOfWeek::Wednesday));
/// assert_eq!(grid.days(), vec![DayOfWeek::Wednesday]);
/// assert_eq!(grid.get(DayOfWeek::Wednesday, 660), Some(EntryId(2)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimeSlotGrid {
    config: GridConfig,
}

impl TimeSlotGrid {
    /// Creates a builder for a grid layout.
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    /// The layout in use.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Builds the grid using the configured filter mode.
    pub fn build(&self, entries: &[ScheduleEntry], clock: &dyn Clock) -> Grid {
        self.build_with(entries, self.config.filter, clock)
    }

    /// Builds the grid with an explicit filter mode.
    ///
    /// The clock is only consulted in [`FilterMode::Today`].
    pub fn build_with(
        &self,
        entries: &[ScheduleEntry],
        filter: FilterMode,
        clock: &dyn Clock,
    ) -> Grid {
        let days = match filter {
            FilterMode::Today => vec![clock.today()],
            FilterMode::Full => {
                let mut days = self.config.days.clone();
                days.sort();
                days.dedup();
                days
            }
        };
        let slot_starts = self.slot_starts();

        let mut by_id: Vec<&ScheduleEntry> = entries.iter().collect();
        by_id.sort_by_key(|e| e.id);

        let mut ignored_conflicts = Vec::new();
        let mut reported: HashSet<(EntryId, EntryId)> = HashSet::new();
        let mut rows = Vec::with_capacity(days.len());

        for day in days {
            let mut cells: Vec<GridCell> = slot_starts
                .iter()
                .map(|&slot_start| GridCell {
                    slot_start,
                    entry: None,
                })
                .collect();

            for entry in by_id.iter().filter(|e| e.day == day) {
                for cell in cells.iter_mut().filter(|c| entry.time.contains(c.slot_start)) {
                    match cell.entry {
                        None => cell.entry = Some(entry.id),
                        Some(kept) if kept != entry.id => {
                            if reported.insert((kept, entry.id)) {
                                ignored_conflicts.push(IgnoredConflict {
                                    day,
                                    slot_start: cell.slot_start,
                                    kept,
                                    dropped: entry.id,
                                });
                            }
                        }
                        Some(_) => {}
                    }
                }
            }
            rows.push(GridRow { day, cells });
        }

        if !ignored_conflicts.is_empty() {
            warn!(
                "grid build kept lower ids in {} contested cell pair(s)",
                ignored_conflicts.len()
            );
        }
        debug!(
            "built grid: {} day(s) x {} slot(s) from {} entries",
            rows.len(),
            slot_starts.len(),
            entries.len()
        );

        Grid {
            slot_minutes: self.config.slot_minutes,
            slot_starts,
            rows,
            ignored_conflicts,
        }
    }

    /// Slot start minutes between `day_start` and `day_end`.
    ///
    /// Empty when the layout is degenerate.
    fn slot_starts(&self) -> Vec<u16> {
        let GridConfig {
            slot_minutes,
            day_start,
            day_end,
            ..
        } = self.config;
        if slot_minutes == 0 || day_end <= day_start {
            return Vec::new();
        }
        (day_start..day_end).step_by(usize::from(slot_minutes)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeRange;
    use proptest::prelude::*;

    fn entry(id: u64, day: DayOfWeek, start: u16, end: u16) -> ScheduleEntry {
        ScheduleEntry::new(id, day, TimeRange::new(start, end).unwrap(), "SUBJ", "T1")
    }

    fn grid_9_to_13() -> TimeSlotGrid {
        TimeSlotGrid::new(
            GridConfig::default()
                .with_days(DayOfWeek::WEEKDAYS)
                .with_slot_minutes(60)
                .with_hours(540, 780),
        )
    }

    #[test]
    fn test_slot_axis() {
        let grid = grid_9_to_13().build(&[], &FixedClock(DayOfWeek::Monday));
        assert_eq!(grid.slot_starts, vec![540, 600, 660, 720]);
        assert_eq!(grid.rows.len(), 5);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(
            grid.slot_labels(ClockStyle::TwelveHour),
            vec!["9:00 AM", "10:00 AM", "11:00 AM", "12:00 PM"]
        );
    }

    #[test]
    fn test_multi_slot_occupancy() {
        // 9:00-10:30 covers the 9:00 and 10:00 slot starts.
        let entries = vec![entry(1, DayOfWeek::Monday, 540, 630)];
        let grid = grid_9_to_13().build(&entries, &FixedClock(DayOfWeek::Monday));
        assert_eq!(grid.get(DayOfWeek::Monday, 540), Some(EntryId(1)));
        assert_eq!(grid.get(DayOfWeek::Monday, 600), Some(EntryId(1)));
        assert_eq!(grid.get(DayOfWeek::Monday, 660), None);
        assert_eq!(grid.occupied_count(), 2);
    }

    #[test]
    fn test_entry_starting_mid_slot() {
        // 9:30-10:15 contains only the 10:00 slot start.
        let entries = vec![entry(1, DayOfWeek::Monday, 570, 615)];
        let grid = grid_9_to_13().build(&entries, &FixedClock(DayOfWeek::Monday));
        assert_eq!(grid.get(DayOfWeek::Monday, 540), None);
        assert_eq!(grid.get(DayOfWeek::Monday, 600), Some(EntryId(1)));
    }

    #[test]
    fn test_today_filter() {
        let entries = vec![
            entry(1, DayOfWeek::Monday, 540, 600),
            entry(2, DayOfWeek::Wednesday, 600, 660),
            entry(3, DayOfWeek::Friday, 660, 720),
        ];
        let grid = grid_9_to_13().build_with(
            &entries,
            FilterMode::Today,
            &FixedClock(DayOfWeek::Wednesday),
        );
        assert_eq!(grid.days(), vec![DayOfWeek::Wednesday]);
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.get(DayOfWeek::Wednesday, 600), Some(EntryId(2)));
        assert_eq!(grid.get(DayOfWeek::Monday, 540), None);
    }

    #[test]
    fn test_full_filter_fixed_order() {
        let grid = TimeSlotGrid::new(GridConfig::default().with_days(vec![
            DayOfWeek::Friday,
            DayOfWeek::Monday,
            DayOfWeek::Monday,
        ]))
        .build(&[], &FixedClock(DayOfWeek::Sunday));
        assert_eq!(grid.days(), vec![DayOfWeek::Monday, DayOfWeek::Friday]);
    }

    #[test]
    fn test_collision_keeps_lower_id() {
        let entries = vec![
            entry(7, DayOfWeek::Monday, 540, 660),
            entry(3, DayOfWeek::Monday, 600, 720),
        ];
        let grid = grid_9_to_13().build(&entries, &FixedClock(DayOfWeek::Monday));
        assert_eq!(grid.get(DayOfWeek::Monday, 540), Some(EntryId(7)));
        assert_eq!(grid.get(DayOfWeek::Monday, 600), Some(EntryId(3)));
        assert_eq!(grid.get(DayOfWeek::Monday, 660), Some(EntryId(3)));
        assert_eq!(
            grid.ignored_conflicts,
            vec![IgnoredConflict {
                day: DayOfWeek::Monday,
                slot_start: 600,
                kept: EntryId(3),
                dropped: EntryId(7),
            }]
        );
    }

    #[test]
    fn test_degenerate_layout_is_empty() {
        let grid = TimeSlotGrid::new(GridConfig::default().with_slot_minutes(0))
            .build(&[entry(1, DayOfWeek::Monday, 540, 600)], &FixedClock(DayOfWeek::Monday));
        assert!(grid.slot_starts.is_empty());
        assert_eq!(grid.occupied_count(), 0);

        let grid = TimeSlotGrid::new(GridConfig::default().with_hours(600, 600))
            .build(&[], &FixedClock(DayOfWeek::Monday));
        assert!(grid.slot_starts.is_empty());
    }

    #[test]
    fn test_grid_serializes_as_plain_data() {
        let grid = grid_9_to_13().build(
            &[entry(1, DayOfWeek::Monday, 540, 600)],
            &FixedClock(DayOfWeek::Monday),
        );
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["rows"][0]["day"], "Monday");
        assert_eq!(json["rows"][0]["cells"][0]["entry"], 1);
        assert_eq!(json["slot_minutes"], 60);
    }

    proptest! {
        #[test]
        fn prop_build_is_idempotent(
            spans in proptest::collection::vec((0usize..5, 480u16..1000, 1u16..180), 0..15)
        ) {
            let entries: Vec<_> = spans
                .iter()
                .enumerate()
                .map(|(i, &(d, s, len))| entry(i as u64, DayOfWeek::WEEKDAYS[d], s, s + len))
                .collect();
            let builder = TimeSlotGrid::new(GridConfig::default().with_slot_minutes(30));
            let clock = FixedClock(DayOfWeek::Tuesday);
            prop_assert_eq!(builder.build(&entries, &clock), builder.build(&entries, &clock));
        }
    }
}
