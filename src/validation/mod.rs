//! Commit-time validation for timetable entries.
//!
//! Every candidate passes through this gate before it may be committed.
//! The gate checks, against the current committed set:
//! - All referenced teachers, rooms and grade sections exist
//! - No entry with the same day, range, teacher and room is already committed
//! - No teacher or room is double-booked (see [`ConflictDetector`])
//! - The grade section fits the room (see [`CapacityValidator`])
//!
//! Entry time ranges are non-empty by construction of
//! [`TimeRange`](crate::models::TimeRange).
//!
//! All reasons are collected; the gate never stops at the first failure.

mod capacity;
mod conflict;

pub use capacity::CapacityValidator;
pub use conflict::ConflictDetector;

use std::collections::HashSet;

use log::debug;

use crate::config::ConflictPolicy;
use crate::error::Rejection;
use crate::models::{EntryId, ResourceDirectory, ResourceKind, ScheduleEntry};

/// Validation result: `Err` carries every failed invariant.
pub type ValidationResult = Result<(), Vec<Rejection>>;

/// The commit gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    policy: ConflictPolicy,
    detector: ConflictDetector,
}

impl Validator {
    /// Creates a gate for a policy.
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            detector: ConflictDetector::with_policy(policy),
        }
    }

    /// The active policy.
    pub fn policy(&self) -> &ConflictPolicy {
        &self.policy
    }

    /// The conflict detector configured with this gate's policy.
    pub fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    /// Validates a candidate against the committed set.
    ///
    /// A committed entry sharing the candidate's id is treated as the
    /// version being replaced and ignored.
    pub fn validate_candidate(
        &self,
        candidate: &ScheduleEntry,
        committed: &[ScheduleEntry],
        directory: &dyn ResourceDirectory,
    ) -> ValidationResult {
        let mut reasons = Vec::new();
        let unknown = |kind, id: String| Rejection::UnknownResource {
            entry: candidate.id,
            kind,
            id,
        };

        if directory.teacher(&candidate.teacher_ref).is_none() {
            reasons.push(unknown(ResourceKind::Teacher, candidate.teacher_ref.clone()));
        }

        let room = match candidate.room_ref.as_deref() {
            Some(room_ref) => {
                let room = directory.room(room_ref);
                if room.is_none() {
                    reasons.push(unknown(ResourceKind::Room, room_ref.to_string()));
                }
                room
            }
            None => None,
        };

        let section = directory.grade_section(&candidate.grade_ref, &candidate.section_ref);
        if section.is_none() {
            reasons.push(unknown(
                ResourceKind::GradeSection,
                format!("{}/{}", candidate.grade_ref, candidate.section_ref),
            ));
        }

        let duplicates: HashSet<EntryId> = committed
            .iter()
            .filter(|e| e.id != candidate.id && e.is_duplicate_of(candidate))
            .map(|e| e.id)
            .collect();
        let mut duplicate_ids: Vec<EntryId> = duplicates.iter().copied().collect();
        duplicate_ids.sort();
        reasons.extend(
            duplicate_ids
                .into_iter()
                .map(|existing| Rejection::DuplicateEntry {
                    entry: candidate.id,
                    existing,
                }),
        );

        reasons.extend(
            self.detector
                .check_conflict(candidate, committed)
                .into_iter()
                .filter(|c| {
                    c.partner_of(candidate.id)
                        .is_some_and(|partner| !duplicates.contains(&partner))
                })
                .map(Rejection::Conflict),
        );

        if self.policy.enforce_capacity {
            if let (Some(room), Some(section)) = (&room, &section) {
                if let Err(rejection) = CapacityValidator::validate(candidate, room, section) {
                    reasons.push(rejection);
                }
            }
        }

        debug!(
            "entry {} validated: {} rejection reason(s)",
            candidate.id,
            reasons.len()
        );
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons)
        }
    }
}

/// Checks a proposed batch for id collisions.
///
/// Returns the first id that appears twice in `batch` or is already
/// used by `committed`.
pub fn validate_input(batch: &[ScheduleEntry], committed: &[ScheduleEntry]) -> Result<(), EntryId> {
    let mut seen: HashSet<EntryId> = committed.iter().map(|e| e.id).collect();
    for entry in batch {
        if !seen.insert(entry.id) {
            return Err(entry.id);
        }
    }
    Ok(())
}
