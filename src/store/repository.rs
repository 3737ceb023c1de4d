//! Persistence collaborator.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::error::BoxError;
use crate::models::{EntryId, ScheduleEntry};

/// Durable storage for committed entries.
///
/// A commit must be atomic: once `commit_entry` returns, the whole entry
/// is readable, and before that none of it is. Errors are handed back to
/// the engine's caller untouched.
pub trait EntryRepository: Send + Sync {
    /// All committed entries of a tenant.
    fn load_entries(&self, tenant: &str) -> Result<Vec<ScheduleEntry>, BoxError>;

    /// Stores an entry. Returns the id it is stored under.
    fn commit_entry(&self, entry: &ScheduleEntry) -> Result<EntryId, BoxError>;

    /// Removes an entry.
    fn delete_entry(&self, id: EntryId) -> Result<(), BoxError>;
}

/// Single-tenant in-memory repository.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tenant: String,
    entries: Mutex<BTreeMap<EntryId, ScheduleEntry>>,
}

impl InMemoryRepository {
    /// Creates an empty repository for a tenant.
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Seeds the repository with existing entries.
    pub fn with_entries(self, entries: impl IntoIterator<Item = ScheduleEntry>) -> Self {
        self.entries
            .lock()
            .extend(entries.into_iter().map(|e| (e.id, e)));
        self
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl EntryRepository for InMemoryRepository {
    fn load_entries(&self, tenant: &str) -> Result<Vec<ScheduleEntry>, BoxError> {
        if tenant != self.tenant {
            return Ok(Vec::new());
        }
        Ok(self.entries.lock().values().cloned().collect())
    }

    fn commit_entry(&self, entry: &ScheduleEntry) -> Result<EntryId, BoxError> {
        self.entries.lock().insert(entry.id, entry.clone());
        Ok(entry.id)
    }

    fn delete_entry(&self, id: EntryId) -> Result<(), BoxError> {
        match self.entries.lock().remove(&id) {
            Some(_) => Ok(()),
            None => Err(format!("entry {id} not stored").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayOfWeek, TimeRange};

    fn entry(id: u64) -> ScheduleEntry {
        ScheduleEntry::new(id, DayOfWeek::Monday, TimeRange::new(540, 600).unwrap(), "S", "T")
    }

    #[test]
    fn test_round_trip_per_tenant() {
        let repo = InMemoryRepository::new("school-a").with_entries([entry(1)]);
        repo.commit_entry(&entry(2)).unwrap();
        assert_eq!(repo.load_entries("school-a").unwrap().len(), 2);
        assert!(repo.load_entries("school-b").unwrap().is_empty());

        repo.delete_entry(EntryId(1)).unwrap();
        assert_eq!(repo.len(), 1);
        assert!(repo.delete_entry(EntryId(1)).is_err());
    }
}
