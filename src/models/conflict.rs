//! Conflict model.
//!
//! A conflict is derived, never stored: it names two entries that cannot
//! both be honored because they hold the same teacher or room at
//! overlapping times on the same day.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::EntryId;

/// Which exclusive resource is double-booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Same teacher in two places.
    Teacher,
    /// Same room used twice.
    Room,
}

/// A pair of entries that collide on one resource.
///
/// The pair is normalized so that `entry_a < entry_b`; the same collision
/// therefore compares equal however it was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conflict {
    /// Resource kind in contention.
    pub kind: ConflictKind,
    /// Lower entry id.
    pub entry_a: EntryId,
    /// Higher entry id.
    pub entry_b: EntryId,
}

impl Conflict {
    /// Creates a normalized conflict between two entries.
    pub fn new(kind: ConflictKind, x: EntryId, y: EntryId) -> Self {
        let (entry_a, entry_b) = if x <= y { (x, y) } else { (y, x) };
        Self {
            kind,
            entry_a,
            entry_b,
        }
    }

    /// Whether the conflict involves the given entry.
    pub fn involves(&self, id: EntryId) -> bool {
        self.entry_a == id || self.entry_b == id
    }

    /// The other entry of the pair, if `id` is part of it.
    pub fn partner_of(&self, id: EntryId) -> Option<EntryId> {
        if self.entry_a == id {
            Some(self.entry_b)
        } else if self.entry_b == id {
            Some(self.entry_a)
        } else {
            None
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ConflictKind::Teacher => "teacher",
            ConflictKind::Room => "room",
        };
        write!(f, "{kind} conflict between entries {} and {}", self.entry_a, self.entry_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_normalized() {
        let a = Conflict::new(ConflictKind::Teacher, EntryId(5), EntryId(2));
        let b = Conflict::new(ConflictKind::Teacher, EntryId(2), EntryId(5));
        assert_eq!(a, b);
        assert_eq!(a.entry_a, EntryId(2));
        assert_eq!(a.entry_b, EntryId(5));
    }

    #[test]
    fn test_partner_of() {
        let c = Conflict::new(ConflictKind::Room, EntryId(1), EntryId(3));
        assert_eq!(c.partner_of(EntryId(1)), Some(EntryId(3)));
        assert_eq!(c.partner_of(EntryId(3)), Some(EntryId(1)));
        assert_eq!(c.partner_of(EntryId(2)), None);
        assert!(c.involves(EntryId(3)));
    }

    #[test]
    fn test_conflict_display() {
        let c = Conflict::new(ConflictKind::Room, EntryId(1), EntryId(3));
        assert_eq!(c.to_string(), "room conflict between entries 1 and 3");
    }
}
