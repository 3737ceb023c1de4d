//! Timetable engine: the write path and the read views of one tenant.
//!
//! # Write path
//!
//! 1. Enter the store's write section (one writer at a time).
//! 2. Validate the candidate against the latest committed snapshot.
//! 3. Persist through the [`EntryRepository`].
//! 4. Publish a new snapshot.
//!
//! A rejected candidate never reaches the repository. A committed entry
//! is only changed by [`TimetableEngine::replace`], which removes the old
//! version and validates the new one as a single step.
//!
//! # Read path
//!
//! Grid and query views run on an [`Arc<Snapshot>`] and never wait for
//! writers.

use std::collections::HashSet;
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Rejection, ScheduleError};
use crate::grid::{Clock, Grid, TimeSlotGrid};
use crate::models::{Conflict, EntryId, EntryState, ResourceDirectory, ScheduleEntry};
use crate::query::QueryEngine;
use crate::store::{EntryRepository, Snapshot, TimetableStore, WriteSection};
use crate::validation::{validate_input, ValidationResult, Validator};

/// How a batch is committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitMode {
    /// Commit every entry or none.
    #[default]
    AllOrNothing,
    /// Commit each valid entry; report the rest.
    PerEntry,
}

/// What happened to one entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Committed under this id.
    Committed(EntryId),
    /// Failed validation.
    Rejected(Vec<Rejection>),
    /// Valid, but not committed because another entry of an
    /// all-or-nothing batch was rejected.
    Withheld,
    /// Valid, but not stored because a per-entry batch stopped at a
    /// storage failure (see [`BatchReport::failure`]).
    Unsaved,
}

impl EntryOutcome {
    /// Lifecycle state the entry ended the batch in.
    pub fn state(&self) -> EntryState {
        match self {
            EntryOutcome::Committed(_) => EntryState::Committed,
            EntryOutcome::Rejected(_) => EntryState::Rejected,
            EntryOutcome::Withheld | EntryOutcome::Unsaved => EntryState::Draft,
        }
    }
}

/// Per-entry results of a batch, in submission order.
#[derive(Debug)]
pub struct BatchReport {
    /// One outcome per submitted entry.
    pub outcomes: Vec<EntryOutcome>,
    /// Snapshot version after the batch.
    pub version: u64,
    /// Error that stopped a per-entry batch before every valid entry was
    /// stored. Entries committed before it stay committed.
    pub failure: Option<ScheduleError>,
}

impl BatchReport {
    /// Ids that were committed.
    pub fn committed(&self) -> Vec<EntryId> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                EntryOutcome::Committed(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Whether every entry was committed.
    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o, EntryOutcome::Committed(_)))
    }
}

/// Which entries a grid shows.
///
/// A grid cell holds one entry, so a grid always shows one resource's
/// timetable. Unrelated entries at the same time never share a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// One teacher.
    Teacher(String),
    /// One room.
    Room(String),
    /// One class.
    GradeSection { grade: String, section: String },
}

/// Timetable engine for one tenant.
pub struct TimetableEngine<R, D> {
    tenant: String,
    store: TimetableStore,
    repository: R,
    directory: D,
    validator: Validator,
    grid: TimeSlotGrid,
}

impl<R: EntryRepository, D: ResourceDirectory> TimetableEngine<R, D> {
    /// Loads a tenant's committed entries and opens the engine.
    ///
    /// Entries already stored are trusted; any conflicts among them are
    /// logged and can be listed with [`TimetableEngine::audit`].
    pub fn open(
        tenant: impl Into<String>,
        config: EngineConfig,
        repository: R,
        directory: D,
    ) -> Result<Self, ScheduleError> {
        let tenant = tenant.into();
        let entries = repository
            .load_entries(&tenant)
            .map_err(ScheduleError::Persistence)?;
        let validator = Validator::new(config.policy);

        let existing = validator.detector().validate_batch(&entries);
        if !existing.is_empty() {
            warn!(
                "tenant '{tenant}': {} conflict(s) in stored timetable",
                existing.len()
            );
        }
        info!("tenant '{tenant}': opened with {} entries", entries.len());

        Ok(Self {
            tenant,
            store: TimetableStore::from_entries(entries),
            repository,
            directory,
            validator,
            grid: TimeSlotGrid::new(config.grid),
        })
    }

    /// Tenant this engine serves.
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Current committed state.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    /// Dry run: validates a candidate against the current state without
    /// committing.
    pub fn check(&self, candidate: &ScheduleEntry) -> ValidationResult {
        let snapshot = self.store.snapshot();
        self.validator
            .validate_candidate(candidate, snapshot.entries(), &self.directory)
    }

    /// Validates and commits a new entry.
    pub fn submit(&self, entry: ScheduleEntry) -> Result<EntryId, ScheduleError> {
        let section = self.store.write();
        self.commit_one(section, entry)
    }

    /// Like [`submit`](Self::submit), but fails with
    /// [`ScheduleError::StaleSnapshot`] if the store has moved past
    /// `expected_version`.
    pub fn submit_expecting(
        &self,
        entry: ScheduleEntry,
        expected_version: u64,
    ) -> Result<EntryId, ScheduleError> {
        let section = self.store.write();
        let actual = section.snapshot().version();
        if actual != expected_version {
            return Err(ScheduleError::StaleSnapshot {
                expected: expected_version,
                actual,
            });
        }
        self.commit_one(section, entry)
    }

    /// Validates and commits several entries in one write section.
    ///
    /// Entries are validated in order, each against the committed set
    /// plus the batch entries accepted before it. Id collisions fail the
    /// whole call with [`ScheduleError::DuplicateId`].
    ///
    /// A storage failure in [`CommitMode::AllOrNothing`] removes what the
    /// batch already stored and is returned as the error. In
    /// [`CommitMode::PerEntry`] the batch stops, keeps what it stored and
    /// reports the failure in [`BatchReport::failure`].
    pub fn submit_batch(
        &self,
        entries: Vec<ScheduleEntry>,
        mode: CommitMode,
    ) -> Result<BatchReport, ScheduleError> {
        let section = self.store.write();
        let base = section.snapshot();
        let base_version = base.version();
        validate_input(&entries, base.entries()).map_err(ScheduleError::DuplicateId)?;

        let mut working = base.entries().to_vec();
        let mut accepted: Vec<usize> = Vec::new();
        let mut outcomes: Vec<EntryOutcome> = Vec::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            match self
                .validator
                .validate_candidate(entry, &working, &self.directory)
            {
                Ok(()) => {
                    working.push(entry.clone());
                    accepted.push(i);
                    outcomes.push(EntryOutcome::Withheld);
                }
                Err(reasons) => outcomes.push(EntryOutcome::Rejected(reasons)),
            }
        }

        let rejected = entries.len() - accepted.len();
        if mode == CommitMode::AllOrNothing && rejected > 0 {
            warn!(
                "tenant '{}': batch of {} rejected ({} invalid)",
                self.tenant,
                entries.len(),
                rejected
            );
            return Ok(BatchReport {
                outcomes,
                version: base_version,
                failure: None,
            });
        }

        let mut committed = base.entries().to_vec();
        let mut taken: HashSet<EntryId> = committed.iter().map(|e| e.id).collect();
        let mut persisted: Vec<EntryId> = Vec::new();
        let mut failure = None;
        for &i in &accepted {
            match self.store_entry(&entries[i], &taken) {
                Ok(id) => {
                    taken.insert(id);
                    committed.push(entries[i].clone().with_id(id));
                    persisted.push(id);
                    outcomes[i] = EntryOutcome::Committed(id);
                }
                Err(err) => {
                    if mode == CommitMode::AllOrNothing {
                        self.rollback(&persisted);
                        return Err(err);
                    }
                    failure = Some(err);
                    break;
                }
            }
        }

        if failure.is_some() {
            for &i in &accepted {
                if outcomes[i] == EntryOutcome::Withheld {
                    outcomes[i] = EntryOutcome::Unsaved;
                }
            }
            warn!(
                "tenant '{}': batch stopped after storing {} of {} entries",
                self.tenant,
                persisted.len(),
                entries.len()
            );
        }

        let version = if persisted.is_empty() {
            base_version
        } else {
            section.publish(committed)
        };
        info!(
            "tenant '{}': batch committed {} of {} entries (version {version})",
            self.tenant,
            persisted.len(),
            entries.len()
        );
        Ok(BatchReport {
            outcomes,
            version,
            failure,
        })
    }

    /// Replaces a committed entry with a new version under the same id.
    ///
    /// The old version is excluded from validation. On rejection the old
    /// version stays committed.
    pub fn replace(&self, entry: ScheduleEntry) -> Result<EntryId, ScheduleError> {
        let section = self.store.write();
        let old = section
            .snapshot()
            .get(entry.id)
            .cloned()
            .ok_or(ScheduleError::NotFound(entry.id))?;

        let rest: Vec<ScheduleEntry> = section
            .snapshot()
            .entries()
            .iter()
            .filter(|e| e.id != old.id)
            .cloned()
            .collect();
        self.validator
            .validate_candidate(&entry, &rest, &self.directory)
            .map_err(|reasons| self.rejected(&entry, reasons))?;

        self.repository
            .delete_entry(old.id)
            .map_err(ScheduleError::Persistence)?;
        let taken: HashSet<EntryId> = rest.iter().map(|e| e.id).collect();
        let id = match self.store_entry(&entry, &taken) {
            Ok(id) => id,
            Err(err) => {
                if let Err(restore) = self.repository.commit_entry(&old) {
                    warn!("entry {}: failed to restore after replace: {restore}", old.id);
                }
                return Err(err);
            }
        };

        let mut entries = rest;
        entries.push(entry.with_id(id));
        let version = section.publish(entries);
        info!("tenant '{}': replaced entry {id} (version {version})", self.tenant);
        Ok(id)
    }

    /// Deletes a committed entry and returns it.
    pub fn delete(&self, id: EntryId) -> Result<ScheduleEntry, ScheduleError> {
        let section = self.store.write();
        let removed = section
            .snapshot()
            .get(id)
            .cloned()
            .ok_or(ScheduleError::NotFound(id))?;
        self.repository
            .delete_entry(id)
            .map_err(ScheduleError::Persistence)?;

        let entries = section
            .snapshot()
            .entries()
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();
        let version = section.publish(entries);
        info!("tenant '{}': deleted entry {id} (version {version})", self.tenant);
        Ok(removed)
    }

    /// Deletes every entry of a subject. Returns the removed ids.
    pub fn delete_by_subject(&self, subject_ref: &str) -> Result<Vec<EntryId>, ScheduleError> {
        self.cascade(|e| e.subject_ref == subject_ref)
    }

    /// Deletes every entry of a class. Returns the removed ids.
    pub fn delete_by_grade_section(
        &self,
        grade_ref: &str,
        section_ref: &str,
    ) -> Result<Vec<EntryId>, ScheduleError> {
        self.cascade(|e| e.grade_ref == grade_ref && e.section_ref == section_ref)
    }

    /// Projects a view of the current state onto the grid.
    pub fn grid(&self, view: &View, clock: &dyn Clock) -> Grid {
        let snapshot = self.store.snapshot();
        let query = QueryEngine::new(snapshot.entries());
        let selected: Vec<ScheduleEntry> = match view {
            View::Teacher(id) => query.by_teacher(id).into_iter().cloned().collect(),
            View::Room(id) => query.by_room(id).into_iter().cloned().collect(),
            View::GradeSection { grade, section } => query
                .by_grade_section(grade, section)
                .into_iter()
                .cloned()
                .collect(),
        };
        self.grid.build(&selected, clock)
    }

    /// Conflicts present in the committed set.
    ///
    /// Empty unless stored data predates validation or the policy was
    /// tightened after entries were committed.
    pub fn audit(&self) -> Vec<Conflict> {
        let snapshot = self.store.snapshot();
        self.validator.detector().validate_batch(snapshot.entries())
    }

    fn commit_one(
        &self,
        section: WriteSection<'_>,
        entry: ScheduleEntry,
    ) -> Result<EntryId, ScheduleError> {
        if section.snapshot().get(entry.id).is_some() {
            return Err(ScheduleError::DuplicateId(entry.id));
        }
        self.validator
            .validate_candidate(&entry, section.snapshot().entries(), &self.directory)
            .map_err(|reasons| self.rejected(&entry, reasons))?;

        let taken: HashSet<EntryId> = section.snapshot().entries().iter().map(|e| e.id).collect();
        let id = self.store_entry(&entry, &taken)?;

        let mut entries = section.snapshot().entries().to_vec();
        entries.push(entry.with_id(id));
        let version = section.publish(entries);
        info!("tenant '{}': committed entry {id} (version {version})", self.tenant);
        Ok(id)
    }

    /// Persists an entry and checks the id the repository assigned.
    fn store_entry(
        &self,
        entry: &ScheduleEntry,
        taken: &HashSet<EntryId>,
    ) -> Result<EntryId, ScheduleError> {
        let id = self
            .repository
            .commit_entry(entry)
            .map_err(ScheduleError::Persistence)?;
        if taken.contains(&id) {
            warn!(
                "tenant '{}': repository stored entry {} under committed id {id}",
                self.tenant, entry.id
            );
            return Err(ScheduleError::DuplicateId(id));
        }
        Ok(id)
    }

    fn cascade(
        &self,
        matches: impl Fn(&ScheduleEntry) -> bool,
    ) -> Result<Vec<EntryId>, ScheduleError> {
        let section = self.store.write();
        let targets: Vec<EntryId> = section
            .snapshot()
            .entries()
            .iter()
            .filter(|e| matches(e))
            .map(|e| e.id)
            .collect();
        if targets.is_empty() {
            return Ok(targets);
        }

        let mut removed: Vec<EntryId> = Vec::with_capacity(targets.len());
        let mut failure = None;
        for &id in &targets {
            match self.repository.delete_entry(id) {
                Ok(()) => removed.push(id),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if !removed.is_empty() {
            let entries = section
                .snapshot()
                .entries()
                .iter()
                .filter(|e| !removed.contains(&e.id))
                .cloned()
                .collect();
            let version = section.publish(entries);
            info!(
                "tenant '{}': cascade removed {} entries (version {version})",
                self.tenant,
                removed.len()
            );
        }
        match failure {
            Some(err) => Err(ScheduleError::Persistence(err)),
            None => Ok(removed),
        }
    }

    fn rollback(&self, persisted: &[EntryId]) {
        for &id in persisted {
            if let Err(err) = self.repository.delete_entry(id) {
                warn!("entry {id}: rollback failed: {err}");
            }
        }
    }

    fn rejected(&self, entry: &ScheduleEntry, reasons: Vec<Rejection>) -> ScheduleError {
        warn!(
            "tenant '{}': entry {} rejected with {} reason(s)",
            self.tenant,
            entry.id,
            reasons.len()
        );
        ScheduleError::Rejected {
            entry: entry.id,
            reasons,
        }
    }
}
