//! Grade record.

use super::{GradeId, StudentId};
use serde::Serialize;

/// A scored subject owned by one student.
///
/// `value` is expected in `[0, 20]`; the range is checked at the service
/// boundary, not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    #[serde(skip)]
    pub id: Option<GradeId>,
    pub value: f64,
    pub subject: String,
    /// Owning student id. Set when the grade is linked through persistence.
    #[serde(skip)]
    pub student: Option<StudentId>,
}

impl Grade {
    /// Creates an unsaved, unlinked grade.
    pub fn new(value: f64, subject: impl Into<String>) -> Self {
        Self {
            id: None,
            value,
            subject: subject.into(),
            student: None,
        }
    }
}
