//! Teacher and room double-booking detection.
//!
//! # Algorithm
//!
//! Single candidate: linear scan of the committed entries on the
//! candidate's day, O(n).
//!
//! Whole set: group by `(day, resource kind, resource id)`, sort each
//! group by start time, then sweep while keeping the entries still
//! running at the current start. Every overlapping pair is reported once.
//! Cost is O(n log n + k) for k reported conflicts, so a set without
//! overlaps is O(n log n).
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 33.2 (sweep-line)

use std::collections::BTreeMap;

use log::debug;

use crate::config::ConflictPolicy;
use crate::models::{Conflict, ConflictKind, DayOfWeek, EntryId, ScheduleEntry};

/// Detects overlapping use of teachers and rooms.
///
/// Pure: works on the snapshot it is given and keeps no state between
/// calls. Fetching a consistent snapshot is the caller's job.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetector {
    policy: ConflictPolicy,
}

impl ConflictDetector {
    /// Creates a strict detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detector honoring a policy.
    pub fn with_policy(policy: ConflictPolicy) -> Self {
        Self { policy }
    }

    /// Conflicts a candidate would introduce into `existing`.
    ///
    /// Only entries on the candidate's day are considered, and an entry
    /// with the candidate's own id is skipped (it is the version being
    /// replaced). Results are ordered by partner id, teacher before room.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_timetable::models::{DayOfWeek, ScheduleEntry, ConflictKind, EntryId};
    /// use u_timetable::parser::parse_range;
    /// use u_timetable::validation::ConflictDetector;
    ///
    /// let e1 = ScheduleEntry::new(1, DayOfWeek::Monday, parse_range("09:00", "10:00").unwrap(), "MATH", "A")
    ///     .with_room("room1");
    /// let e2 = ScheduleEntry::new(2, DayOfWeek::Monday, parse_range("09:30", "10:30").unwrap(), "PHYS", "A")
    ///     .with_room("room2");
    ///
    /// let conflicts = ConflictDetector::new().check_conflict(&e2, &[e1]);
    /// assert_eq!(conflicts.len(), 1);
    /// assert_eq!(conflicts[0].kind, ConflictKind::Teacher);
    /// assert_eq!(conflicts[0].partner_of(EntryId(2)), Some(EntryId(1)));
    /// ```
    pub fn check_conflict(
        &self,
        candidate: &ScheduleEntry,
        existing: &[ScheduleEntry],
    ) -> Vec<Conflict> {
        let mut found: Vec<((EntryId, ConflictKind), Conflict)> = Vec::new();

        for other in existing
            .iter()
            .filter(|e| e.day == candidate.day && e.id != candidate.id)
        {
            if !candidate.time.overlaps(&other.time) {
                continue;
            }
            if !self.policy.allow_teacher_overlap && other.teacher_ref == candidate.teacher_ref {
                found.push((
                    (other.id, ConflictKind::Teacher),
                    Conflict::new(ConflictKind::Teacher, candidate.id, other.id),
                ));
            }
            if !self.policy.allow_room_overlap
                && candidate.room_ref.is_some()
                && other.room_ref == candidate.room_ref
            {
                found.push((
                    (other.id, ConflictKind::Room),
                    Conflict::new(ConflictKind::Room, candidate.id, other.id),
                ));
            }
        }

        found.sort_by_key(|(key, _)| *key);
        found.dedup_by_key(|(key, _)| *key);
        debug!(
            "entry {}: {} conflict(s) against {} committed entries",
            candidate.id,
            found.len(),
            existing.len()
        );
        found.into_iter().map(|(_, c)| c).collect()
    }

    /// All conflicts within a full entry set.
    ///
    /// Ordered by `(day, resource kind, resource id, start)`.
    pub fn validate_batch(&self, entries: &[ScheduleEntry]) -> Vec<Conflict> {
        let mut groups: BTreeMap<(DayOfWeek, ConflictKind, &str), Vec<&ScheduleEntry>> =
            BTreeMap::new();

        for entry in entries {
            if !self.policy.allow_teacher_overlap {
                groups
                    .entry((entry.day, ConflictKind::Teacher, entry.teacher_ref.as_str()))
                    .or_default()
                    .push(entry);
            }
            if let (false, Some(room)) = (self.policy.allow_room_overlap, entry.room_ref.as_deref())
            {
                groups
                    .entry((entry.day, ConflictKind::Room, room))
                    .or_default()
                    .push(entry);
            }
        }

        let mut conflicts = Vec::new();
        for ((_, kind, _), mut group) in groups {
            group.sort_by_key(|e| (e.start(), e.id));

            // Entries still running at the current start minute.
            let mut active: Vec<&ScheduleEntry> = Vec::new();
            for entry in group {
                active.retain(|a| a.end() > entry.start());
                for running in &active {
                    if running.id != entry.id {
                        conflicts.push(Conflict::new(kind, running.id, entry.id));
                    }
                }
                active.push(entry);
            }
        }

        debug!(
            "batch validation: {} entries, {} conflict(s)",
            entries.len(),
            conflicts.len()
        );
        conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeRange;
    use proptest::prelude::*;

    fn entry(id: u64, day: DayOfWeek, start: u16, end: u16, teacher: &str, room: &str) -> ScheduleEntry {
        ScheduleEntry::new(id, day, TimeRange::new(start, end).unwrap(), "SUBJ", teacher)
            .with_room(room)
            .for_class("G1", "A")
    }

    #[test]
    fn test_teacher_conflict_scenario() {
        let e1 = entry(1, DayOfWeek::Monday, 540, 600, "teacherA", "room1");
        let e2 = entry(2, DayOfWeek::Monday, 570, 630, "teacherA", "room2");

        let conflicts = ConflictDetector::new().check_conflict(&e2, &[e1]);
        assert_eq!(
            conflicts,
            vec![Conflict::new(ConflictKind::Teacher, EntryId(1), EntryId(2))]
        );
    }

    #[test]
    fn test_symmetric() {
        let a = entry(1, DayOfWeek::Monday, 540, 600, "T", "R1");
        let b = entry(2, DayOfWeek::Monday, 570, 630, "T", "R2");
        let d = ConflictDetector::new();
        assert_eq!(
            d.check_conflict(&a, std::slice::from_ref(&b)),
            d.check_conflict(&b, std::slice::from_ref(&a))
        );
    }

    #[test]
    fn test_touching_ranges_do_not_conflict() {
        let a = entry(1, DayOfWeek::Monday, 540, 600, "T", "R");
        let b = entry(2, DayOfWeek::Monday, 600, 660, "T", "R");
        let d = ConflictDetector::new();
        assert!(d.check_conflict(&b, std::slice::from_ref(&a)).is_empty());
        assert!(d.validate_batch(&[a, b]).is_empty());
    }

    #[test]
    fn test_other_day_ignored() {
        let a = entry(1, DayOfWeek::Monday, 540, 600, "T", "R");
        let b = entry(2, DayOfWeek::Tuesday, 540, 600, "T", "R");
        assert!(ConflictDetector::new().check_conflict(&b, &[a]).is_empty());
    }

    #[test]
    fn test_teacher_and_room_with_same_partner() {
        let a = entry(1, DayOfWeek::Monday, 540, 600, "T", "R");
        let b = entry(2, DayOfWeek::Monday, 550, 610, "T", "R");
        let conflicts = ConflictDetector::new().check_conflict(&b, &[a]);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].kind, ConflictKind::Teacher);
        assert_eq!(conflicts[1].kind, ConflictKind::Room);
    }

    #[test]
    fn test_results_ordered_by_partner_id() {
        let existing = vec![
            entry(9, DayOfWeek::Monday, 540, 600, "T", "R9"),
            entry(3, DayOfWeek::Monday, 560, 620, "X", "R"),
            entry(5, DayOfWeek::Monday, 500, 560, "T", "R5"),
        ];
        let candidate = entry(7, DayOfWeek::Monday, 550, 610, "T", "R");
        let conflicts = ConflictDetector::new().check_conflict(&candidate, &existing);
        let partners: Vec<_> = conflicts
            .iter()
            .map(|c| c.partner_of(EntryId(7)).unwrap())
            .collect();
        assert_eq!(partners, vec![EntryId(3), EntryId(5), EntryId(9)]);
    }

    #[test]
    fn test_roomless_entries_never_room_conflict() {
        let a = ScheduleEntry::new(1, DayOfWeek::Monday, TimeRange::new(540, 600).unwrap(), "S", "T1");
        let b = ScheduleEntry::new(2, DayOfWeek::Monday, TimeRange::new(540, 600).unwrap(), "S", "T2");
        let d = ConflictDetector::new();
        assert!(d.check_conflict(&b, std::slice::from_ref(&a)).is_empty());
        assert!(d.validate_batch(&[a, b]).is_empty());
    }

    #[test]
    fn test_self_is_skipped() {
        let a = entry(1, DayOfWeek::Monday, 540, 600, "T", "R");
        let moved = entry(1, DayOfWeek::Monday, 560, 620, "T", "R");
        assert!(ConflictDetector::new().check_conflict(&moved, &[a]).is_empty());
    }

    #[test]
    fn test_batch_finds_non_adjacent_overlap() {
        // 1 spans both 2 and 3; 2 and 3 do not overlap each other.
        let entries = vec![
            entry(1, DayOfWeek::Monday, 540, 720, "T", "R1"),
            entry(2, DayOfWeek::Monday, 570, 600, "T", "R2"),
            entry(3, DayOfWeek::Monday, 630, 660, "T", "R3"),
        ];
        let conflicts = ConflictDetector::new().validate_batch(&entries);
        assert_eq!(
            conflicts,
            vec![
                Conflict::new(ConflictKind::Teacher, EntryId(1), EntryId(2)),
                Conflict::new(ConflictKind::Teacher, EntryId(1), EntryId(3)),
            ]
        );
    }

    #[test]
    fn test_batch_ordering_by_day_then_resource() {
        let entries = vec![
            entry(1, DayOfWeek::Tuesday, 540, 600, "T", "R1"),
            entry(2, DayOfWeek::Tuesday, 550, 610, "T", "R2"),
            entry(3, DayOfWeek::Monday, 540, 600, "U", "R"),
            entry(4, DayOfWeek::Monday, 550, 610, "V", "R"),
        ];
        let conflicts = ConflictDetector::new().validate_batch(&entries);
        assert_eq!(
            conflicts,
            vec![
                Conflict::new(ConflictKind::Room, EntryId(3), EntryId(4)),
                Conflict::new(ConflictKind::Teacher, EntryId(1), EntryId(2)),
            ]
        );
    }

    #[test]
    fn test_policy_relaxes_kinds() {
        let a = entry(1, DayOfWeek::Monday, 540, 600, "T", "R");
        let b = entry(2, DayOfWeek::Monday, 550, 610, "T", "R");
        let d = ConflictDetector::with_policy(ConflictPolicy {
            allow_teacher_overlap: true,
            ..ConflictPolicy::default()
        });
        let conflicts = d.check_conflict(&b, std::slice::from_ref(&a));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Room);
        assert_eq!(d.validate_batch(&[a, b]).len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        assert!(ConflictDetector::new().validate_batch(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_check_conflict_symmetric(
            s1 in 0u16..1380, d1 in 1u16..60,
            s2 in 0u16..1380, d2 in 1u16..60,
        ) {
            let a = entry(1, DayOfWeek::Monday, s1, s1 + d1, "T", "R1");
            let b = entry(2, DayOfWeek::Monday, s2, s2 + d2, "T", "R2");
            let d = ConflictDetector::new();
            let ab = d.check_conflict(&a, std::slice::from_ref(&b));
            let ba = d.check_conflict(&b, std::slice::from_ref(&a));
            prop_assert_eq!(&ab, &ba);
            let overlap = s1 < s2 + d2 && s2 < s1 + d1;
            prop_assert_eq!(ab.len(), usize::from(overlap));
        }

        #[test]
        fn prop_batch_matches_pairwise(
            spans in proptest::collection::vec((0u16..600, 1u16..120, 0usize..3), 0..12)
        ) {
            let teachers = ["A", "B", "C"];
            let entries: Vec<_> = spans
                .iter()
                .enumerate()
                .map(|(i, &(s, d, t))| {
                    ScheduleEntry::new(i as u64, DayOfWeek::Monday, TimeRange::new(s, s + d).unwrap(), "S", teachers[t])
                })
                .collect();
            let d = ConflictDetector::new();
            let mut batch = d.validate_batch(&entries);
            let mut pairwise: Vec<Conflict> = Vec::new();
            for (i, e) in entries.iter().enumerate() {
                pairwise.extend(d.check_conflict(e, &entries[..i]));
            }
            batch.sort_by_key(|c| (c.entry_a, c.entry_b));
            pairwise.sort_by_key(|c| (c.entry_a, c.entry_b));
            prop_assert_eq!(batch, pairwise);
        }
    }
}
