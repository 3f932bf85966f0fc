//! Classroom record.
//!
//! # Invariants
//! - A student appears at most once in `students` (identity comparison).
//! - `average` is computed over every grade of every student, not over
//!   per-student averages.

use super::student::Student;
use super::{same_entity, ClassroomId, InstanceKey};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// A group of enrolled students.
#[derive(Debug, Clone)]
pub struct Classroom {
    pub id: Option<ClassroomId>,
    students: Vec<Student>,
    instance: InstanceKey,
}

impl Default for Classroom {
    fn default() -> Self {
        Self::new()
    }
}

impl Classroom {
    /// Creates an unsaved, empty classroom.
    pub fn new() -> Self {
        Self {
            id: None,
            students: Vec::new(),
            instance: InstanceKey::next(),
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Enrolls `student` unless it is already a member.
    ///
    /// Returns `false` without any change for a duplicate. The student's
    /// `classroom` back-reference is left to the caller.
    pub fn add_student(&mut self, student: Student) -> bool {
        if self.contains(&student) {
            return false;
        }
        self.students.push(student);
        true
    }

    pub fn contains(&self, student: &Student) -> bool {
        self.students.iter().any(|member| member.is_same(student))
    }

    /// Mean of all grade values across all students.
    ///
    /// `None` when there are no students or none of them has a grade.
    pub fn compute_average(&self) -> Option<f64> {
        if self.students.is_empty() {
            return None;
        }
        super::mean(
            self.students
                .iter()
                .flat_map(|student| student.grades().iter().map(|grade| grade.value)),
        )
    }

    /// Whether `other` denotes the same classroom.
    pub fn is_same(&self, other: &Classroom) -> bool {
        same_entity((self.id, self.instance), (other.id, other.instance))
    }
}

impl Serialize for Classroom {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Classroom", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("students", &self.students)?;
        state.serialize_field("average", &self.compute_average())?;
        state.end()
    }
}
