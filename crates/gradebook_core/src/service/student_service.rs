//! Student use-case service.
//!
//! # Invariants
//! - Input is validated before any repository write.
//! - A missing student or classroom is reported, never created implicitly.

use crate::model::student::Student;
use crate::model::StudentId;
use crate::operation::{OperationRequest, StudentOperationProcessor};
use crate::repo::classroom_repo::ClassroomRepository;
use crate::repo::student_repo::StudentRepository;
use crate::repo::RepoError;
use crate::service::error::ServiceError;
use crate::service::request::{AddGradeRequest, CreateStudentRequest};
use log::{error, info};

/// Use-case service for students and their grades.
pub struct StudentService<S: StudentRepository, C: ClassroomRepository> {
    students: S,
    classrooms: C,
}

impl<S: StudentRepository, C: ClassroomRepository> StudentService<S, C> {
    pub fn new(students: S, classrooms: C) -> Self {
        Self {
            students,
            classrooms,
        }
    }

    /// Creates a student and enrolls it in the requested classroom.
    ///
    /// # Errors
    /// - `InvalidContent` for blank names or a malformed birthdate.
    /// - `ClassroomInvalid` when the classroom does not exist.
    pub fn create_student(&self, request: &CreateStudentRequest) -> Result<StudentId, ServiceError> {
        let birthdate = request.validate().map_err(|err| {
            error!("event=student_create module=service status=error error_code=invalid_content error={err}");
            err
        })?;

        let Some(mut classroom) = self.classrooms.find_classroom(request.classroom)? else {
            error!(
                "event=student_create module=service status=error error_code=classroom_invalid classroom_id={}",
                request.classroom
            );
            return Err(ServiceError::ClassroomInvalid(request.classroom));
        };

        let mut student = Student::new(
            request.firstname.as_str(),
            request.lastname.as_str(),
            birthdate,
        );
        // The insert already carries `classroom_id`; the link below only
        // confirms it and enrolls the student in the loaded classroom.
        student.classroom = Some(request.classroom);
        let mut student = self.students.save_student(student)?;
        self.classrooms
            .link_student_to_classroom(&mut classroom, &mut student)?;

        let id = student.id.ok_or(RepoError::NotPersisted("student"))?;
        info!(
            "event=student_create module=service status=ok student_id={id} classroom_id={}",
            request.classroom
        );
        Ok(id)
    }

    /// Loads a student with its grades and average.
    pub fn get_student(&self, id: StudentId) -> Result<Student, ServiceError> {
        let student = self.require_student(id, "student_get")?;
        info!("event=student_get module=service status=ok student_id={id}");
        Ok(student)
    }

    /// Applies patch operations and returns the student as persisted afterwards.
    pub fn patch_student(
        &self,
        id: StudentId,
        operations: &[OperationRequest],
    ) -> Result<Student, ServiceError> {
        let student = self.require_student(id, "student_patch")?;

        StudentOperationProcessor::new(&self.students)
            .process(&student, operations)
            .map_err(|err| {
                error!("event=student_patch module=service status=error student_id={id} error={err}");
                ServiceError::from(err)
            })?;

        let updated = self.require_student(id, "student_patch")?;
        info!(
            "event=student_patch module=service status=ok student_id={id} operations={}",
            operations.len()
        );
        Ok(updated)
    }

    /// Records a grade for a student and returns the updated student.
    pub fn add_grade(
        &self,
        id: StudentId,
        request: &AddGradeRequest,
    ) -> Result<Student, ServiceError> {
        request.validate().map_err(|err| {
            error!("event=grade_add module=service status=error student_id={id} error_code=invalid_content error={err}");
            err
        })?;

        let student = self.require_student(id, "grade_add")?;
        let student = self
            .students
            .add_grade_to_student(student, request.value, request.subject.as_str())?;

        info!(
            "event=grade_add module=service status=ok student_id={id} grades={}",
            student.grades().len()
        );
        Ok(student)
    }

    /// Deletes a student and its grades.
    pub fn delete_student(&self, id: StudentId) -> Result<(), ServiceError> {
        let student = self.require_student(id, "student_delete")?;
        self.students.remove_student(&student)?;
        info!("event=student_delete module=service status=ok student_id={id}");
        Ok(())
    }

    fn require_student(&self, id: StudentId, event: &str) -> Result<Student, ServiceError> {
        match self.students.find_student(id)? {
            Some(student) => Ok(student),
            None => {
                error!("event={event} module=service status=error student_id={id} error_code=not_found");
                Err(ServiceError::StudentNotFound(id))
            }
        }
    }
}
