//! Service-level errors.
//!
//! `Display` of each variant is the outcome message a caller shows as-is.

use crate::model::{ClassroomId, StudentId};
use crate::operation::{OperationError, ProcessError};
use crate::repo::RepoError;
use thiserror::Error;

/// Why a request body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("body must be {0}")]
    WrongShape(&'static str),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

/// Failure of a service use-case.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("wrong content")]
    InvalidContent(#[source] ValidationError),
    #[error("classroom invalid")]
    ClassroomInvalid(ClassroomId),
    #[error("classroom not found")]
    ClassroomNotFound(ClassroomId),
    #[error("student not found")]
    StudentNotFound(StudentId),
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ServiceError {
    /// Whether the failure is a missing resource rather than bad input.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ClassroomInvalid(_) | Self::ClassroomNotFound(_) | Self::StudentNotFound(_)
        )
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidContent(value)
    }
}

impl From<ProcessError> for ServiceError {
    fn from(value: ProcessError) -> Self {
        match value {
            ProcessError::Operation(err) => Self::Operation(err),
            ProcessError::Repo(RepoError::NotFound {
                entity: "student",
                id,
            }) => Self::StudentNotFound(id),
            ProcessError::Repo(err) => Self::Repo(err),
        }
    }
}
