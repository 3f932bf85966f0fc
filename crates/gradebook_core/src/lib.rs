//! Core domain logic for the gradebook.
//!
//! Classrooms, students and grades, the student patch processor, and the
//! SQLite persistence behind them. Routing and request transport live
//! outside this crate.

pub mod db;
pub mod logging;
pub mod model;
pub mod operation;
pub mod repo;
pub mod service;
pub mod validation;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::classroom::Classroom;
pub use model::grade::Grade;
pub use model::student::{Student, StudentField, StudentFieldUpdate};
pub use model::{ClassroomId, GradeId, StudentId};
pub use operation::{
    Operation, OperationError, OperationRequest, ProcessError, StudentOperationProcessor,
};
pub use repo::classroom_repo::{ClassroomRepository, SqliteClassroomRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::classroom_service::ClassroomService;
pub use service::error::{ServiceError, ValidationError};
pub use service::request::{parse_operations, AddGradeRequest, CreateStudentRequest};
pub use service::student_service::StudentService;
pub use validation::{is_valid_date, parse_date, DateInput};

/// Health-check answer.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
