//! Timetable views.
//!
//! Filters a committed entry set down to one teacher, room, class or day.
//! Every view is sorted by `(day, start, id)`, so entries at identical
//! times always come back in the same order.

use std::collections::BTreeMap;

use crate::models::{DayOfWeek, ScheduleEntry};

/// Read-only queries over an entry snapshot.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    entries: &'a [ScheduleEntry],
}

impl<'a> QueryEngine<'a> {
    /// Wraps a snapshot.
    pub fn new(entries: &'a [ScheduleEntry]) -> Self {
        Self { entries }
    }

    /// A teacher's timetable.
    pub fn by_teacher(&self, teacher_id: &str) -> Vec<&'a ScheduleEntry> {
        self.select(|e| e.teacher_ref == teacher_id)
    }

    /// A room's timetable.
    pub fn by_room(&self, room_id: &str) -> Vec<&'a ScheduleEntry> {
        self.select(|e| e.room_ref.as_deref() == Some(room_id))
    }

    /// A class's timetable.
    pub fn by_grade_section(&self, grade_id: &str, section_id: &str) -> Vec<&'a ScheduleEntry> {
        self.select(|e| e.grade_ref == grade_id && e.section_ref == section_id)
    }

    /// Everything on one day.
    pub fn by_day(&self, day: DayOfWeek) -> Vec<&'a ScheduleEntry> {
        self.select(|e| e.day == day)
    }

    /// Entries of one subject. Used for cascading deletes.
    pub fn by_subject(&self, subject_id: &str) -> Vec<&'a ScheduleEntry> {
        self.select(|e| e.subject_ref == subject_id)
    }

    /// Total weekly teaching minutes for a teacher.
    pub fn weekly_minutes(&self, teacher_id: &str) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.teacher_ref == teacher_id)
            .map(|e| u32::from(e.time.duration_minutes()))
            .sum()
    }

    /// Weekly minutes per teacher, keyed by teacher id.
    pub fn teacher_loads(&self) -> BTreeMap<&'a str, u32> {
        let mut loads: BTreeMap<&'a str, u32> = BTreeMap::new();
        for e in self.entries {
            *loads.entry(e.teacher_ref.as_str()).or_insert(0) += u32::from(e.time.duration_minutes());
        }
        loads
    }

    /// Share of a room's weekly window that is booked.
    ///
    /// `window_minutes` is the bookable time per week (e.g. five 9-hour
    /// days = 2700). Returns `None` for an empty window.
    pub fn room_utilization(&self, room_id: &str, window_minutes: u32) -> Option<f64> {
        if window_minutes == 0 {
            return None;
        }
        let busy: u32 = self
            .by_room(room_id)
            .iter()
            .map(|e| u32::from(e.time.duration_minutes()))
            .sum();
        Some(f64::from(busy) / f64::from(window_minutes))
    }

    fn select(&self, predicate: impl Fn(&ScheduleEntry) -> bool) -> Vec<&'a ScheduleEntry> {
        let mut out: Vec<&'a ScheduleEntry> = self.entries.iter().filter(|e| predicate(e)).collect();
        out.sort_by_key(|e| e.sort_key());
        out
    }
}
