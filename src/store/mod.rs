//! Committed entry store.
//!
//! # Concurrency
//!
//! Readers take an `Arc<Snapshot>` and work on it without further
//! locking; a snapshot is immutable, so a reader sees either the whole
//! of a commit or none of it.
//!
//! Writers go through a [`WriteSection`], which holds the store's single
//! writer lock for its lifetime. Validation against
//! [`WriteSection::snapshot`] and the following [`WriteSection::publish`]
//! therefore act as one serialized step; two writers can never both
//! validate against the same stale state.
//!
//! Each publish bumps the snapshot version, which optimistic callers can
//! compare against the version they validated with.

mod repository;

pub use repository::{EntryRepository, InMemoryRepository};

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::models::{EntryId, ScheduleEntry};

/// An immutable view of the committed set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    version: u64,
    entries: Vec<ScheduleEntry>,
}

impl Snapshot {
    fn new(version: u64, mut entries: Vec<ScheduleEntry>) -> Self {
        entries.sort_by_key(|e| e.id);
        Self { version, entries }
    }

    /// Monotonic version, bumped on every publish.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Committed entries, sorted by id.
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Finds an entry by id.
    pub fn get(&self, id: EntryId) -> Option<&ScheduleEntry> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is committed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Holder of the current snapshot.
#[derive(Debug, Default)]
pub struct TimetableStore {
    current: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl TimetableStore {
    /// Creates an empty store at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding already-committed entries.
    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::new(0, entries))),
            writer: Mutex::new(()),
        }
    }

    /// Current committed state. Never blocks on validation.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Enters the exclusive write section.
    ///
    /// Blocks while another writer holds it.
    pub fn write(&self) -> WriteSection<'_> {
        let guard = self.writer.lock();
        let base = self.snapshot();
        WriteSection {
            store: self,
            _guard: guard,
            base,
        }
    }
}

/// Exclusive write access to a [`TimetableStore`].
///
/// Dropping the section without publishing leaves the store unchanged.
pub struct WriteSection<'a> {
    store: &'a TimetableStore,
    _guard: MutexGuard<'a, ()>,
    base: Arc<Snapshot>,
}

impl WriteSection<'_> {
    /// The latest committed state. No other writer can change it while
    /// this section is held.
    pub fn snapshot(&self) -> &Snapshot {
        &self.base
    }

    /// Replaces the committed set and returns the new version.
    pub fn publish(self, entries: Vec<ScheduleEntry>) -> u64 {
        let version = self.base.version + 1;
        *self.store.current.write() = Arc::new(Snapshot::new(version, entries));
        version
    }
}
