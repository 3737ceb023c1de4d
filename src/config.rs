//! Engine configuration.
//!
//! Loaded from TOML; every field has a default so an empty document is
//! a valid configuration.
//!
//! ```toml
//! [grid]
//! days = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
//! slot_minutes = 45
//! day_start = "8:00 AM"
//! day_end = "15:30"
//! filter = "full"
//!
//! [policy]
//! allow_teacher_overlap = false
//! allow_room_overlap = false
//! enforce_capacity = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::DayOfWeek;
use crate::parser::parse_time;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Grid projection settings.
    pub grid: GridConfig,
    /// Overlap and capacity policy.
    pub policy: ConflictPolicy,
}

/// Which days a grid shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Only the current day, as reported by the clock.
    Today,
    /// All configured days in week order.
    #[default]
    Full,
}

/// Day × slot grid settings, with times already resolved to minutes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    /// Days on the grid's day axis.
    pub days: Vec<DayOfWeek>,
    /// Width of one slot in minutes.
    pub slot_minutes: u16,
    /// First slot start (minute of day).
    pub day_start: u16,
    /// End of the last slot (minute of day, exclusive).
    pub day_end: u16,
    /// Day axis filtering.
    pub filter: FilterMode,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            days: DayOfWeek::WEEKDAYS.to_vec(),
            slot_minutes: 60,
            day_start: 8 * 60,
            day_end: 17 * 60,
            filter: FilterMode::Full,
        }
    }
}

impl GridConfig {
    /// Sets the day axis.
    pub fn with_days(mut self, days: impl Into<Vec<DayOfWeek>>) -> Self {
        self.days = days.into();
        self
    }

    /// Sets the slot width.
    pub fn with_slot_minutes(mut self, minutes: u16) -> Self {
        self.slot_minutes = minutes;
        self
    }

    /// Sets the visible hours.
    pub fn with_hours(mut self, day_start: u16, day_end: u16) -> Self {
        self.day_start = day_start;
        self.day_end = day_end;
        self
    }

    /// Sets the filter mode.
    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }
}

/// Overlap and capacity policy.
///
/// Strict by default: no teacher or room may be double-booked and every
/// section must fit its room. Relaxing a rule is an explicit choice,
/// for instance for elective blocks taught jointly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictPolicy {
    /// Let one teacher hold overlapping entries.
    pub allow_teacher_overlap: bool,
    /// Let one room host overlapping entries.
    pub allow_room_overlap: bool,
    /// Reject entries whose section exceeds room capacity.
    pub enforce_capacity: bool,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self {
            allow_teacher_overlap: false,
            allow_room_overlap: false,
            enforce_capacity: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    grid: RawGridConfig,
    #[serde(default)]
    policy: ConflictPolicy,
}

#[derive(Debug, Deserialize)]
struct RawGridConfig {
    #[serde(default = "default_days")]
    days: Vec<String>,
    #[serde(default = "default_slot_minutes")]
    slot_minutes: u16,
    #[serde(default = "default_day_start")]
    day_start: String,
    #[serde(default = "default_day_end")]
    day_end: String,
    #[serde(default)]
    filter: FilterMode,
}

fn default_days() -> Vec<String> {
    DayOfWeek::WEEKDAYS.iter().map(|d| d.name().to_string()).collect()
}

fn default_slot_minutes() -> u16 {
    60
}

fn default_day_start() -> String {
    "08:00".to_string()
}

fn default_day_end() -> String {
    "17:00".to_string()
}

impl Default for RawGridConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            slot_minutes: default_slot_minutes(),
            day_start: default_day_start(),
            day_end: default_day_end(),
            filter: FilterMode::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        Ok(Self {
            grid: raw.grid.resolve()?,
            policy: raw.policy,
        })
    }

    /// Loads a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }
}

impl RawGridConfig {
    fn resolve(self) -> Result<GridConfig, ConfigError> {
        let mut days = Vec::with_capacity(self.days.len());
        for name in &self.days {
            let day: DayOfWeek = name.parse().map_err(|source| ConfigError::Time {
                field: "grid.days",
                source,
            })?;
            if !days.contains(&day) {
                days.push(day);
            }
        }
        days.sort();

        let day_start = parse_time(&self.day_start).map_err(|source| ConfigError::Time {
            field: "grid.day_start",
            source,
        })?;
        let day_end = parse_time(&self.day_end).map_err(|source| ConfigError::Time {
            field: "grid.day_end",
            source,
        })?;

        if self.slot_minutes == 0 {
            return Err(ConfigError::Invalid(
                "grid.slot_minutes must be positive".to_string(),
            ));
        }
        if day_end <= day_start {
            return Err(ConfigError::Invalid(format!(
                "grid.day_end ({}) must be after grid.day_start ({})",
                self.day_end, self.day_start
            )));
        }

        Ok(GridConfig {
            days,
            slot_minutes: self.slot_minutes,
            day_start,
            day_end,
            filter: self.filter,
        })
    }
}
