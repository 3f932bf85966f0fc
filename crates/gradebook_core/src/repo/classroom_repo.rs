//! Classroom repository contract and SQLite implementation.
//!
//! # Invariants
//! - Membership is stored on `students.classroom_id`; a classroom row itself
//!   only carries an id.
//! - Loaded classrooms list students in id order, each with its grades.

use crate::model::classroom::Classroom;
use crate::model::student::Student;
use crate::model::ClassroomId;
use crate::repo::student_repo::{load_classroom_students, student_exists};
use crate::repo::{
    begin_write, ensure_connection_ready, RepoError, RepoResult, CLASSROOMS_TABLE, GRADES_TABLE,
    STUDENTS_TABLE,
};
use log::debug;
use rusqlite::{params, Connection};

/// Persistence operations for classrooms and their membership.
pub trait ClassroomRepository {
    /// Loads one classroom with its students and their grades.
    fn find_classroom(&self, id: ClassroomId) -> RepoResult<Option<Classroom>>;
    /// Inserts an unsaved classroom, assigning its id, and persists the
    /// classroom side of every member link.
    fn save_classroom(&self, classroom: Classroom) -> RepoResult<Classroom>;
    /// Enrolls `student` in `classroom`, setting both sides of the relation.
    ///
    /// In-memory values are only touched after the write committed.
    fn link_student_to_classroom(
        &self,
        classroom: &mut Classroom,
        student: &mut Student,
    ) -> RepoResult<()>;
}

/// SQLite-backed classroom repository.
pub struct SqliteClassroomRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClassroomRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[CLASSROOMS_TABLE, STUDENTS_TABLE, GRADES_TABLE])?;
        Ok(Self { conn })
    }
}

impl ClassroomRepository for SqliteClassroomRepository<'_> {
    fn find_classroom(&self, id: ClassroomId) -> RepoResult<Option<Classroom>> {
        if !classroom_exists(self.conn, id)? {
            return Ok(None);
        }

        let mut classroom = Classroom::new();
        classroom.id = Some(id);
        for student in load_classroom_students(self.conn, id)? {
            classroom.add_student(student);
        }
        Ok(Some(classroom))
    }

    fn save_classroom(&self, mut classroom: Classroom) -> RepoResult<Classroom> {
        let mut member_ids = Vec::with_capacity(classroom.students().len());
        for student in classroom.students() {
            member_ids.push(student.id.ok_or(RepoError::NotPersisted("student"))?);
        }

        let tx = begin_write(self.conn)?;
        let classroom_id = match classroom.id {
            Some(id) => {
                if !classroom_exists(&tx, id)? {
                    return Err(RepoError::NotFound {
                        entity: "classroom",
                        id,
                    });
                }
                id
            }
            None => {
                tx.execute("INSERT INTO classrooms DEFAULT VALUES;", [])?;
                tx.last_insert_rowid()
            }
        };

        for &student_id in &member_ids {
            let changed = tx.execute(
                "UPDATE students SET classroom_id = ?1 WHERE id = ?2;",
                params![classroom_id, student_id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: "student",
                    id: student_id,
                });
            }
        }
        tx.commit()?;

        classroom.id = Some(classroom_id);
        debug!(
            "event=classroom_save module=repo status=ok classroom_id={classroom_id} members={}",
            member_ids.len()
        );
        Ok(classroom)
    }

    fn link_student_to_classroom(
        &self,
        classroom: &mut Classroom,
        student: &mut Student,
    ) -> RepoResult<()> {
        let classroom_id = classroom.id.ok_or(RepoError::NotPersisted("classroom"))?;
        let student_id = student.id.ok_or(RepoError::NotPersisted("student"))?;

        let tx = begin_write(self.conn)?;
        if !classroom_exists(&tx, classroom_id)? {
            return Err(RepoError::NotFound {
                entity: "classroom",
                id: classroom_id,
            });
        }
        if !student_exists(&tx, student_id)? {
            return Err(RepoError::NotFound {
                entity: "student",
                id: student_id,
            });
        }
        tx.execute(
            "UPDATE students SET classroom_id = ?1 WHERE id = ?2;",
            params![classroom_id, student_id],
        )?;
        tx.commit()?;

        student.classroom = Some(classroom_id);
        classroom.add_student(student.clone());

        debug!(
            "event=classroom_link module=repo status=ok classroom_id={classroom_id} student_id={student_id}"
        );
        Ok(())
    }
}

fn classroom_exists(conn: &Connection, id: ClassroomId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM classrooms WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
