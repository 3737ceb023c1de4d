//! Error types.
//!
//! Every failure the engine reports is a recoverable validation outcome
//! carrying the ids an administrator needs to correct and resubmit.
//! Persistence errors travel through [`ScheduleError::Persistence`] as the
//! original error value.

use thiserror::Error;

use crate::models::{Conflict, EntryId, ResourceKind};

/// Boxed error produced by an external collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Time text that could not be turned into a minute-of-day value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not resolvable to an hour in `[0,23]` and a minute in `[0,59]`.
    #[error("invalid time format: '{input}'")]
    InvalidTimeFormat { input: String },

    /// End does not come after start.
    #[error("invalid time range: end {end} is not after start {start}")]
    InvalidRange { start: u16, end: u16 },

    /// Unrecognised day name.
    #[error("invalid day of week: '{input}'")]
    InvalidDay { input: String },
}

/// One reason a candidate entry cannot be committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Shares a teacher or room with an overlapping committed entry.
    #[error("{0}")]
    Conflict(Conflict),

    /// Identical day, resources and range already committed.
    #[error("entry {entry} duplicates committed entry {existing}")]
    DuplicateEntry { entry: EntryId, existing: EntryId },

    /// The grade section does not fit the room.
    #[error("entry {entry}: section size {size} exceeds capacity {capacity} of room '{room}'")]
    CapacityExceeded {
        entry: EntryId,
        room: String,
        capacity: u32,
        size: u32,
    },

    /// A referenced teacher, room or grade section does not exist.
    #[error("entry {entry} references unknown {kind} '{id}'")]
    UnknownResource {
        entry: EntryId,
        kind: ResourceKind,
        id: String,
    },
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML did not match the expected shape.
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A time or day value inside the config is malformed.
    #[error("invalid value in config field '{field}': {source}")]
    Time {
        field: &'static str,
        #[source]
        source: ParseError,
    },

    /// Values parse individually but do not make sense together.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error for engine operations.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Raw time input was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Candidate failed one or more invariants.
    #[error("entry {entry} rejected: {}", join_reasons(.reasons))]
    Rejected {
        entry: EntryId,
        reasons: Vec<Rejection>,
    },

    /// No committed entry with this id.
    #[error("entry {0} not found")]
    NotFound(EntryId),

    /// An entry with this id is already committed.
    #[error("entry id {0} is already in use")]
    DuplicateId(EntryId),

    /// Optimistic write against an outdated snapshot.
    #[error("stale snapshot: expected version {expected}, store is at {actual}")]
    StaleSnapshot { expected: u64, actual: u64 },

    /// Error from the persistence collaborator, unmodified.
    #[error("persistence error: {0}")]
    Persistence(#[source] BoxError),

    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScheduleError {
    /// Rejection reasons, empty for non-validation errors.
    pub fn reasons(&self) -> &[Rejection] {
        match self {
            ScheduleError::Rejected { reasons, .. } => reasons,
            _ => &[],
        }
    }

    /// Whether retrying with a fresh snapshot may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScheduleError::StaleSnapshot { .. })
    }
}

fn join_reasons(reasons: &[Rejection]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
