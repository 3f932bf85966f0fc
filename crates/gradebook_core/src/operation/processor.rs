//! Applies patch operations to a saved student.

use super::{decode_operations, Operation, OperationError, OperationRequest};
use crate::model::student::Student;
use crate::repo::student_repo::StudentRepository;
use crate::repo::RepoError;
use log::{error, info};
use thiserror::Error;

/// Failure of `StudentOperationProcessor::process`.
///
/// Persistence failures are passed through untouched.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Runs operation sequences against one student through a repository.
pub struct StudentOperationProcessor<'r, R: StudentRepository + ?Sized> {
    repo: &'r R,
}

impl<'r, R: StudentRepository + ?Sized> StudentOperationProcessor<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Applies `operations` in order to `student`.
    ///
    /// Every operation is validated before the first write, so an invalid
    /// sequence never reaches persistence. Each `replace` then issues exactly
    /// one `update_student_field` call. `student` itself is not modified.
    ///
    /// Returns `Ok(true)` once every operation has been applied.
    pub fn process(
        &self,
        student: &Student,
        operations: &[OperationRequest],
    ) -> Result<bool, ProcessError> {
        let decoded = decode_operations(operations).map_err(|err| {
            error!(
                "event=student_operation module=operation status=error student_id={} error={}",
                format_id(student),
                err
            );
            err
        })?;

        let student_id = student.id.ok_or(RepoError::NotPersisted("student"))?;
        for operation in &decoded {
            match operation {
                Operation::Replace(update) => {
                    self.repo.update_student_field(student_id, update)?;
                    info!(
                        "event=student_operation module=operation status=ok student_id={student_id} op=replace field={}",
                        update.field()
                    );
                }
            }
        }

        Ok(true)
    }
}

fn format_id(student: &Student) -> String {
    student
        .id
        .map_or_else(|| "none".to_string(), |id| id.to_string())
}
