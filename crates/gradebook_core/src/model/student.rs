//! Student record.
//!
//! # Invariants
//! - `grades` keeps insertion order.
//! - `classroom` is a lookup-only back-reference; the classroom owns membership.

use super::grade::Grade;
use super::{mean, same_entity, ClassroomId, InstanceKey, StudentId};
use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Wire format of `Student::birthdate`.
pub const BIRTHDATE_FORMAT: &str = "%Y-%m-%d";

/// A person enrolled in at most one classroom, owning its grades.
#[derive(Debug, Clone)]
pub struct Student {
    pub id: Option<StudentId>,
    pub firstname: String,
    pub lastname: String,
    pub birthdate: NaiveDate,
    pub classroom: Option<ClassroomId>,
    grades: Vec<Grade>,
    instance: InstanceKey,
}

impl Student {
    /// Creates an unsaved student with no grades and no classroom.
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        birthdate: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            firstname: firstname.into(),
            lastname: lastname.into(),
            birthdate,
            classroom: None,
            grades: Vec::new(),
            instance: InstanceKey::next(),
        }
    }

    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    pub(crate) fn grades_mut(&mut self) -> &mut [Grade] {
        &mut self.grades
    }

    /// Appends a grade. Repeated identical grades are kept; always `true`.
    pub fn add_grade(&mut self, grade: Grade) -> bool {
        self.grades.push(grade);
        true
    }

    /// Mean of this student's grade values, `None` without grades.
    pub fn compute_average(&self) -> Option<f64> {
        mean(self.grades.iter().map(|grade| grade.value))
    }

    /// Whether `other` denotes the same student (identity, not field values).
    pub fn is_same(&self, other: &Student) -> bool {
        same_entity((self.id, self.instance), (other.id, other.instance))
    }

    pub fn birthdate_text(&self) -> String {
        self.birthdate.format(BIRTHDATE_FORMAT).to_string()
    }
}

impl Serialize for Student {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Student", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("firstname", &self.firstname)?;
        state.serialize_field("lastname", &self.lastname)?;
        state.serialize_field("birthdate", &self.birthdate_text())?;
        state.serialize_field("grades", &self.grades)?;
        state.serialize_field("average", &self.compute_average())?;
        state.end()
    }
}

/// Student fields that may be replaced after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentField {
    Firstname,
    Lastname,
    Birthdate,
}

impl StudentField {
    pub const ALL: [StudentField; 3] = [Self::Firstname, Self::Lastname, Self::Birthdate];

    /// Resolves a wire field name; anything outside the whitelist is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    /// Wire name, also the storage column name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Firstname => "firstname",
            Self::Lastname => "lastname",
            Self::Birthdate => "birthdate",
        }
    }
}

impl std::fmt::Display for StudentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed replacement for one `StudentField`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentFieldUpdate {
    Firstname(String),
    Lastname(String),
    Birthdate(NaiveDate),
}

impl StudentFieldUpdate {
    pub fn field(&self) -> StudentField {
        match self {
            Self::Firstname(_) => StudentField::Firstname,
            Self::Lastname(_) => StudentField::Lastname,
            Self::Birthdate(_) => StudentField::Birthdate,
        }
    }
}
