//! Student repository contract and SQLite implementation.
//!
//! # Invariants
//! - Loaded students carry their grades in insertion (`grades.id`) order.
//! - Removing a student removes its grades in the same transaction.
//! - Field updates only touch whitelisted `StudentField` columns.

use crate::model::grade::Grade;
use crate::model::student::{Student, StudentFieldUpdate, BIRTHDATE_FORMAT};
use crate::model::{ClassroomId, StudentId};
use crate::repo::{
    begin_write, ensure_connection_ready, RepoError, RepoResult, GRADES_TABLE, STUDENTS_TABLE,
};
use chrono::NaiveDate;
use log::debug;
use rusqlite::{params, Connection, Row};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    classroom_id,
    firstname,
    lastname,
    birthdate
FROM students";

/// Persistence operations for students and their grades.
pub trait StudentRepository {
    /// Loads one student with its grades, `None` when absent.
    fn find_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Inserts an unsaved student or updates a saved one.
    ///
    /// Unsaved grades attached to the student are inserted and linked.
    fn save_student(&self, student: Student) -> RepoResult<Student>;
    /// Replaces one whitelisted column of a saved student.
    fn update_student_field(&self, id: StudentId, update: &StudentFieldUpdate) -> RepoResult<()>;
    /// Creates a grade, links it both ways and persists it.
    fn add_grade_to_student(
        &self,
        student: Student,
        value: f64,
        subject: &str,
    ) -> RepoResult<Student>;
    /// Deletes a saved student together with its grades.
    fn remove_student(&self, student: &Student) -> RepoResult<()>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[STUDENTS_TABLE, GRADES_TABLE])?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn find_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => {
                let mut student = parse_student_row(row)?;
                load_grades_into(self.conn, &mut student, id)?;
                Ok(Some(student))
            }
            None => Ok(None),
        }
    }

    fn save_student(&self, mut student: Student) -> RepoResult<Student> {
        let tx = begin_write(self.conn)?;
        let birthdate = student.birthdate_text();

        let student_id = match student.id {
            Some(id) => {
                let changed = tx.execute(
                    "UPDATE students
                     SET
                        classroom_id = ?1,
                        firstname = ?2,
                        lastname = ?3,
                        birthdate = ?4
                     WHERE id = ?5;",
                    params![
                        student.classroom,
                        student.firstname.as_str(),
                        student.lastname.as_str(),
                        birthdate,
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "student",
                        id,
                    });
                }
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO students (
                        classroom_id,
                        firstname,
                        lastname,
                        birthdate
                    ) VALUES (?1, ?2, ?3, ?4);",
                    params![
                        student.classroom,
                        student.firstname.as_str(),
                        student.lastname.as_str(),
                        birthdate,
                    ],
                )?;
                tx.last_insert_rowid()
            }
        };

        for grade in student.grades_mut().iter_mut() {
            if grade.id.is_some() {
                continue;
            }
            tx.execute(
                "INSERT INTO grades (student_id, value, subject) VALUES (?1, ?2, ?3);",
                params![student_id, grade.value, grade.subject.as_str()],
            )?;
            grade.id = Some(tx.last_insert_rowid());
            grade.student = Some(student_id);
        }

        tx.commit()?;
        student.id = Some(student_id);
        debug!("event=student_save module=repo status=ok student_id={student_id}");
        Ok(student)
    }

    fn update_student_field(&self, id: StudentId, update: &StudentFieldUpdate) -> RepoResult<()> {
        let column = update.field().as_str();
        let value = match update {
            StudentFieldUpdate::Firstname(text) | StudentFieldUpdate::Lastname(text) => {
                text.clone()
            }
            StudentFieldUpdate::Birthdate(date) => date.format(BIRTHDATE_FORMAT).to_string(),
        };

        let tx = begin_write(self.conn)?;
        let changed = tx.execute(
            &format!("UPDATE students SET {column} = ?1 WHERE id = ?2;"),
            params![value, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "student",
                id,
            });
        }
        tx.commit()?;

        debug!("event=student_update_field module=repo status=ok student_id={id} field={column}");
        Ok(())
    }

    fn add_grade_to_student(
        &self,
        mut student: Student,
        value: f64,
        subject: &str,
    ) -> RepoResult<Student> {
        let student_id = student.id.ok_or(RepoError::NotPersisted("student"))?;

        let tx = begin_write(self.conn)?;
        if !student_exists(&tx, student_id)? {
            return Err(RepoError::NotFound {
                entity: "student",
                id: student_id,
            });
        }
        tx.execute(
            "INSERT INTO grades (student_id, value, subject) VALUES (?1, ?2, ?3);",
            params![student_id, value, subject],
        )?;
        let grade_id = tx.last_insert_rowid();
        tx.commit()?;

        let mut grade = Grade::new(value, subject);
        grade.id = Some(grade_id);
        grade.student = Some(student_id);
        student.add_grade(grade);

        debug!(
            "event=grade_add module=repo status=ok student_id={student_id} grade_id={grade_id}"
        );
        Ok(student)
    }

    fn remove_student(&self, student: &Student) -> RepoResult<()> {
        let student_id = student.id.ok_or(RepoError::NotPersisted("student"))?;

        let tx = begin_write(self.conn)?;
        let grades_removed = tx.execute("DELETE FROM grades WHERE student_id = ?1;", [student_id])?;
        let changed = tx.execute("DELETE FROM students WHERE id = ?1;", [student_id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "student",
                id: student_id,
            });
        }
        tx.commit()?;

        debug!(
            "event=student_remove module=repo status=ok student_id={student_id} grades_removed={grades_removed}"
        );
        Ok(())
    }
}

/// Loads every student of a classroom, grades included, in id order.
pub(crate) fn load_classroom_students(
    conn: &Connection,
    classroom_id: ClassroomId,
) -> RepoResult<Vec<Student>> {
    let mut stmt = conn.prepare(&format!(
        "{STUDENT_SELECT_SQL} WHERE classroom_id = ?1 ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([classroom_id])?;
    let mut students = Vec::new();
    while let Some(row) = rows.next()? {
        students.push(parse_student_row(row)?);
    }

    for student in &mut students {
        if let Some(id) = student.id {
            load_grades_into(conn, student, id)?;
        }
    }
    Ok(students)
}

pub(crate) fn student_exists(conn: &Connection, id: StudentId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM students WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id: StudentId = row.get("id")?;
    let birthdate_text: String = row.get("birthdate")?;
    let birthdate = NaiveDate::parse_from_str(&birthdate_text, BIRTHDATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid birthdate `{birthdate_text}` in students.birthdate (id {id})"
        ))
    })?;

    let mut student = Student::new(
        row.get::<_, String>("firstname")?,
        row.get::<_, String>("lastname")?,
        birthdate,
    );
    student.id = Some(id);
    student.classroom = row.get("classroom_id")?;
    Ok(student)
}

fn load_grades_into(conn: &Connection, student: &mut Student, id: StudentId) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "SELECT id, value, subject
         FROM grades
         WHERE student_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([id])?;
    while let Some(row) = rows.next()? {
        let mut grade = Grade::new(row.get::<_, f64>("value")?, row.get::<_, String>("subject")?);
        grade.id = Some(row.get("id")?);
        grade.student = Some(id);
        student.add_grade(grade);
    }
    Ok(())
}
