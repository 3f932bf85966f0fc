//! Subcommand execution over the core services.
//!
//! Every successful command yields one JSON envelope: `{"classroom": ..}`,
//! `{"student": ..}` or `{"message": ..}`.

use crate::cli::{ClassroomCommand, Cli, Command, StudentCommand};
use anyhow::Context;
use gradebook_core::db::open_db;
use gradebook_core::{
    core_version, default_log_level, init_logging, parse_operations, ping, AddGradeRequest,
    ClassroomService, CreateStudentRequest, ServiceError, SqliteClassroomRepository,
    SqliteStudentRepository, StudentService, ValidationError,
};
use log::{error, info};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Sets up logging, opens the database and executes the parsed command.
pub fn run(cli: Cli) -> anyhow::Result<Value> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let log_dir = absolute(log_dir)?;
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir.to_string_lossy())
            .with_context(|| format!("cannot initialize logging in {}", log_dir.display()))?;
    }

    let name = cli.command.name();
    if cli.command == Command::Ping {
        info!("event=cli_command module=cli status=ok command={name}");
        return Ok(json!({"message": ping(), "version": core_version()}));
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("cannot open database {}", cli.db.display()))?;
    match execute(&conn, cli.command) {
        Ok(output) => {
            info!("event=cli_command module=cli status=ok command={name}");
            Ok(output)
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error command={name} error={err}");
            Err(err.into())
        }
    }
}

/// Executes a database-backed command on an open connection.
pub fn execute(conn: &Connection, command: Command) -> Result<Value, ServiceError> {
    match command {
        Command::Ping => Ok(json!({"message": ping()})),
        Command::Classroom { action } => classroom(conn, action),
        Command::Student { action } => student(conn, action),
    }
}

fn classroom(conn: &Connection, action: ClassroomCommand) -> Result<Value, ServiceError> {
    let service = ClassroomService::new(SqliteClassroomRepository::try_new(conn)?);
    let classroom = match action {
        ClassroomCommand::Create => {
            let id = service.create_classroom()?;
            service.get_classroom(id)?
        }
        ClassroomCommand::Show { id } => service.get_classroom(id)?,
    };
    Ok(json!({ "classroom": classroom }))
}

fn student(conn: &Connection, action: StudentCommand) -> Result<Value, ServiceError> {
    let service = StudentService::new(
        SqliteStudentRepository::try_new(conn)?,
        SqliteClassroomRepository::try_new(conn)?,
    );
    let student = match action {
        StudentCommand::Create {
            firstname,
            lastname,
            birthdate,
            classroom,
        } => {
            let id = service.create_student(&CreateStudentRequest {
                firstname,
                lastname,
                birthdate,
                classroom,
            })?;
            service.get_student(id)?
        }
        StudentCommand::Show { id } => service.get_student(id)?,
        StudentCommand::Patch { id, ops } => {
            let body: Value = serde_json::from_str(&ops)
                .map_err(|_| ValidationError::WrongShape("a list of operations"))?;
            service.patch_student(id, &parse_operations(&body)?)?
        }
        StudentCommand::Grade { id, value, subject } => {
            service.add_grade(id, &AddGradeRequest { value, subject })?
        }
        StudentCommand::Delete { id } => {
            service.delete_student(id)?;
            return Ok(json!({"message": "ok"}));
        }
    };
    Ok(json!({ "student": student }))
}

/// Process exit status for a failed command: `2` for a missing resource,
/// `1` otherwise.
pub fn failure_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ServiceError>() {
        Some(service_err) if service_err.is_not_found() => 2,
        _ => 1,
    }
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot resolve working directory")?;
    Ok(cwd.join(path))
}
