use gradebook_core::db::open_db_in_memory;
use gradebook_core::{
    parse_operations, AddGradeRequest, Classroom, ClassroomId, ClassroomRepository,
    ClassroomService, CreateStudentRequest, RepoError, RepoResult, ServiceError,
    SqliteClassroomRepository, SqliteStudentRepository, Student, StudentRepository,
    StudentService,
};
use rusqlite::Connection;
use serde_json::json;

type Students<'conn> =
    StudentService<SqliteStudentRepository<'conn>, SqliteClassroomRepository<'conn>>;

fn services(conn: &Connection) -> (ClassroomService<SqliteClassroomRepository<'_>>, Students<'_>) {
    (
        ClassroomService::new(SqliteClassroomRepository::try_new(conn).unwrap()),
        StudentService::new(
            SqliteStudentRepository::try_new(conn).unwrap(),
            SqliteClassroomRepository::try_new(conn).unwrap(),
        ),
    )
}

fn create_request(classroom: i64) -> CreateStudentRequest {
    CreateStudentRequest::from_json(&json!({
        "firstname": "firstname",
        "lastname": "lastname",
        "birthdate": "2020-07-01",
        "classroom": classroom
    }))
    .unwrap()
}

#[test]
fn student_lifecycle_exposes_grades_and_average() {
    let conn = open_db_in_memory().unwrap();
    let (classrooms, students) = services(&conn);

    let classroom_id = classrooms.create_classroom().unwrap();
    let student_id = students.create_student(&create_request(classroom_id)).unwrap();

    let student = students.get_student(student_id).unwrap();
    let value = serde_json::to_value(&student).unwrap();
    assert_eq!(value["grades"], json!([]));
    assert_eq!(value["average"], json!(null));
    assert_eq!(student.classroom, Some(classroom_id));

    let grade = AddGradeRequest::from_json(&json!({"value": 10, "subject": "test"})).unwrap();
    students.add_grade(student_id, &grade).unwrap();

    let value = serde_json::to_value(students.get_student(student_id).unwrap()).unwrap();
    assert_eq!(value["grades"], json!([{"value": 10.0, "subject": "test"}]));
    assert_eq!(value["average"], json!(10.0));

    let classroom = classrooms.get_classroom(classroom_id).unwrap();
    let value = serde_json::to_value(&classroom).unwrap();
    assert_eq!(value["id"], json!(classroom_id));
    assert_eq!(value["students"].as_array().unwrap().len(), 1);
    assert_eq!(value["average"], json!(10.0));
}

#[test]
fn create_student_rejects_wrong_content_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let (classrooms, students) = services(&conn);
    let classroom_id = classrooms.create_classroom().unwrap();

    let mut request = create_request(classroom_id);
    request.birthdate = "invalidBirthDate".to_string();
    let err = students.create_student(&request).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidContent(_)));
    assert_eq!(err.to_string(), "wrong content");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn create_student_in_unknown_classroom_is_invalid() {
    let conn = open_db_in_memory().unwrap();
    let (_, students) = services(&conn);

    let err = students.create_student(&create_request(42)).unwrap_err();
    assert!(matches!(err, ServiceError::ClassroomInvalid(42)));
    assert_eq!(err.to_string(), "classroom invalid");
    assert!(err.is_not_found());
}

/// Finds classrooms through SQLite but fails every link.
struct FailingLinkRepository<'conn>(SqliteClassroomRepository<'conn>);

impl ClassroomRepository for FailingLinkRepository<'_> {
    fn find_classroom(&self, id: ClassroomId) -> RepoResult<Option<Classroom>> {
        self.0.find_classroom(id)
    }

    fn save_classroom(&self, classroom: Classroom) -> RepoResult<Classroom> {
        self.0.save_classroom(classroom)
    }

    fn link_student_to_classroom(
        &self,
        _classroom: &mut Classroom,
        _student: &mut Student,
    ) -> RepoResult<()> {
        Err(RepoError::InvalidData("link refused".to_string()))
    }
}

#[test]
fn created_student_row_carries_classroom_even_when_link_fails() {
    let conn = open_db_in_memory().unwrap();
    let (classrooms, _) = services(&conn);
    let classroom_id = classrooms.create_classroom().unwrap();
    let students = StudentService::new(
        SqliteStudentRepository::try_new(&conn).unwrap(),
        FailingLinkRepository(SqliteClassroomRepository::try_new(&conn).unwrap()),
    );

    let err = students
        .create_student(&create_request(classroom_id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::InvalidData(_))));

    let stored: Option<i64> = conn
        .query_row("SELECT classroom_id FROM students;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, Some(classroom_id));
    let reloaded = SqliteStudentRepository::try_new(&conn)
        .unwrap()
        .find_student(1)
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.classroom, Some(classroom_id));
}

#[test]
fn missing_resources_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let (classrooms, students) = services(&conn);

    let err = classrooms.get_classroom(1).unwrap_err();
    assert_eq!(err.to_string(), "classroom not found");

    for err in [
        students.get_student(1).unwrap_err(),
        students
            .add_grade(
                1,
                &AddGradeRequest {
                    value: 10.0,
                    subject: "test".to_string(),
                },
            )
            .unwrap_err(),
        students.patch_student(1, &[]).unwrap_err(),
        students.delete_student(1).unwrap_err(),
    ] {
        assert!(matches!(err, ServiceError::StudentNotFound(1)));
        assert_eq!(err.to_string(), "student not found");
    }
}

#[test]
fn add_grade_validates_before_lookup() {
    let conn = open_db_in_memory().unwrap();
    let (classrooms, students) = services(&conn);
    let classroom_id = classrooms.create_classroom().unwrap();
    let student_id = students.create_student(&create_request(classroom_id)).unwrap();

    let err = students
        .add_grade(
            student_id,
            &AddGradeRequest {
                value: 25.0,
                subject: "test".to_string(),
            },
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "wrong content");
    assert!(students.get_student(student_id).unwrap().grades().is_empty());
}

#[test]
fn patch_student_applies_operations_and_returns_fresh_state() {
    let conn = open_db_in_memory().unwrap();
    let (classrooms, students) = services(&conn);
    let classroom_id = classrooms.create_classroom().unwrap();
    let student_id = students.create_student(&create_request(classroom_id)).unwrap();

    let operations = parse_operations(&json!([
        {"op": "replace", "field": "firstname", "value": "Emmy"},
        {"op": "replace", "field": "birthdate", "value": "1932-03-23"}
    ]))
    .unwrap();
    let updated = students.patch_student(student_id, &operations).unwrap();

    assert_eq!(updated.firstname, "Emmy");
    assert_eq!(updated.lastname, "lastname");
    assert_eq!(updated.birthdate_text(), "1932-03-23");
    assert_eq!(updated.classroom, Some(classroom_id));
}

#[test]
fn patch_student_reports_operation_errors_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let (classrooms, students) = services(&conn);
    let classroom_id = classrooms.create_classroom().unwrap();
    let student_id = students.create_student(&create_request(classroom_id)).unwrap();

    let disallowed = parse_operations(&json!([
        {"op": "replace", "field": "firstname", "value": "Ignored"},
        {"op": "replace", "field": "email", "value": "x"}
    ]))
    .unwrap();
    let err = students.patch_student(student_id, &disallowed).unwrap_err();
    assert!(matches!(err, ServiceError::Operation(_)));
    assert_eq!(err.to_string(), "Not allowed to update email field");
    assert_eq!(
        students.get_student(student_id).unwrap().firstname,
        "firstname"
    );

    let unknown =
        parse_operations(&json!([{"op": "attach", "field": "firstname", "value": "x"}])).unwrap();
    let err = students.patch_student(student_id, &unknown).unwrap_err();
    assert_eq!(err.to_string(), "Operation attach does not exist");
}

#[test]
fn delete_student_removes_it_from_classroom() {
    let conn = open_db_in_memory().unwrap();
    let (classrooms, students) = services(&conn);
    let classroom_id = classrooms.create_classroom().unwrap();
    let student_id = students.create_student(&create_request(classroom_id)).unwrap();
    students
        .add_grade(
            student_id,
            &AddGradeRequest {
                value: 14.0,
                subject: "math".to_string(),
            },
        )
        .unwrap();

    students.delete_student(student_id).unwrap();

    assert!(matches!(
        students.get_student(student_id),
        Err(ServiceError::StudentNotFound(_))
    ));
    let classroom = classrooms.get_classroom(classroom_id).unwrap();
    assert!(classroom.students().is_empty());
    assert_eq!(classroom.compute_average(), None);
}
