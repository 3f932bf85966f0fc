//! Classroom use-case service.

use crate::model::classroom::Classroom;
use crate::model::ClassroomId;
use crate::repo::classroom_repo::ClassroomRepository;
use crate::repo::RepoError;
use crate::service::error::ServiceError;
use log::{error, info};

/// Use-case service for classrooms.
pub struct ClassroomService<R: ClassroomRepository> {
    repo: R,
}

impl<R: ClassroomRepository> ClassroomService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an empty classroom and returns its id.
    pub fn create_classroom(&self) -> Result<ClassroomId, ServiceError> {
        let saved = self.repo.save_classroom(Classroom::new())?;
        let id = saved.id.ok_or(RepoError::NotPersisted("classroom"))?;
        info!("event=classroom_create module=service status=ok classroom_id={id}");
        Ok(id)
    }

    /// Loads a classroom with its students, grades and averages.
    pub fn get_classroom(&self, id: ClassroomId) -> Result<Classroom, ServiceError> {
        match self.repo.find_classroom(id)? {
            Some(classroom) => {
                info!(
                    "event=classroom_get module=service status=ok classroom_id={id} students={}",
                    classroom.students().len()
                );
                Ok(classroom)
            }
            None => {
                error!("event=classroom_get module=service status=error classroom_id={id} error_code=not_found");
                Err(ServiceError::ClassroomNotFound(id))
            }
        }
    }
}
