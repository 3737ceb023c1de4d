//! Resource models.
//!
//! Resources are the shared things a timetable entry occupies: a teacher,
//! a room, and the grade section being taught. Teachers and rooms are
//! exclusive (one entry at a time); a room also bounds section size.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which kind of resource a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Teacher,
    Room,
    GradeSection,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Teacher => "teacher",
            ResourceKind::Room => "room",
            ResourceKind::GradeSection => "grade section",
        })
    }
}

/// A teaching room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name (e.g., "Lab 2").
    pub name: String,
    /// Maximum number of students.
    pub capacity: u32,
    /// Building label.
    pub building: String,
    /// Floor number.
    pub floor: i32,
}

impl Room {
    /// Creates a room with the given capacity.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            building: String::new(),
            floor: 0,
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets building and floor.
    pub fn located(mut self, building: impl Into<String>, floor: i32) -> Self {
        self.building = building.into();
        self.floor = floor;
        self
    }

    /// Whether a group of `size` students fits.
    #[inline]
    pub fn fits(&self, size: u32) -> bool {
        size <= self.capacity
    }
}

/// A teacher. Identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Teacher {
    /// Creates a teacher.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A class group: one section of one grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeSection {
    /// Unique identifier.
    pub id: String,
    /// Grade reference (e.g., "G7").
    pub grade: String,
    /// Section reference within the grade (e.g., "B").
    pub section: String,
    /// Number of enrolled students.
    pub size: u32,
}

impl GradeSection {
    /// Creates a grade section.
    pub fn new(grade: impl Into<String>, section: impl Into<String>, size: u32) -> Self {
        let grade = grade.into();
        let section = section.into();
        Self {
            id: format!("{grade}-{section}"),
            grade,
            section,
            size,
        }
    }

    /// Overrides the generated identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Identity collaborator: resolves references to resource attributes.
///
/// Implementations usually sit in front of a database. Lookups must be
/// cheap enough to call inside a commit section.
pub trait ResourceDirectory: Send + Sync {
    /// Looks up a teacher.
    fn teacher(&self, id: &str) -> Option<Teacher>;
    /// Looks up a room.
    fn room(&self, id: &str) -> Option<Room>;
    /// Looks up a grade section by grade and section refs.
    fn grade_section(&self, grade: &str, section: &str) -> Option<GradeSection>;
}

/// In-memory [`ResourceDirectory`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    teachers: HashMap<String, Teacher>,
    rooms: HashMap<String, Room>,
    sections: HashMap<(String, String), GradeSection>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.insert(teacher.id.clone(), teacher);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.insert(room.id.clone(), room);
        self
    }

    /// Adds a grade section.
    pub fn with_section(mut self, section: GradeSection) -> Self {
        self.sections
            .insert((section.grade.clone(), section.section.clone()), section);
        self
    }
}

impl ResourceDirectory for InMemoryDirectory {
    fn teacher(&self, id: &str) -> Option<Teacher> {
        self.teachers.get(id).cloned()
    }

    fn room(&self, id: &str) -> Option<Room> {
        self.rooms.get(id).cloned()
    }

    fn grade_section(&self, grade: &str, section: &str) -> Option<GradeSection> {
        self.sections
            .get(&(grade.to_string(), section.to_string()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builder() {
        let r = Room::new("R101", 30)
            .with_name("Physics Lab")
            .located("North", 1);

        assert_eq!(r.id, "R101");
        assert_eq!(r.name, "Physics Lab");
        assert_eq!(r.capacity, 30);
        assert_eq!(r.building, "North");
        assert_eq!(r.floor, 1);
        assert!(r.fits(30));
        assert!(!r.fits(31));
    }

    #[test]
    fn test_grade_section_id() {
        let gs = GradeSection::new("G7", "B", 28);
        assert_eq!(gs.id, "G7-B");
        assert_eq!(gs.with_id("7B").id, "7B");
    }

    #[test]
    fn test_directory_lookup() {
        let dir = InMemoryDirectory::new()
            .with_teacher(Teacher::new("T1", "Ada"))
            .with_room(Room::new("R1", 25))
            .with_section(GradeSection::new("G7", "A", 20));

        assert_eq!(dir.teacher("T1").unwrap().name, "Ada");
        assert!(dir.teacher("T2").is_none());
        assert_eq!(dir.room("R1").unwrap().capacity, 25);
        assert_eq!(dir.grade_section("G7", "A").unwrap().size, 20);
        assert!(dir.grade_section("G7", "B").is_none());
    }

    #[test]
    fn test_resource_kind_display() {
        assert_eq!(ResourceKind::Teacher.to_string(), "teacher");
        assert_eq!(ResourceKind::GradeSection.to_string(), "grade section");
    }
}
