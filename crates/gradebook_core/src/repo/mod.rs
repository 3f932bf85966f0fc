//! Repository contracts and SQLite persistence implementations.
//!
//! # Responsibility
//! - Define the persistence operations the gradebook core relies on.
//! - Keep SQL details behind those contracts.
//!
//! # Invariants
//! - Every write runs inside its own scoped transaction; dropping the
//!   transaction without commit rolls it back.
//! - Absence of a requested row on read is `Ok(None)`, never an error.
//! - Writes addressed at a missing row fail with `RepoError::NotFound`.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use thiserror::Error;

pub mod classroom_repo;
pub mod student_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for gradebook persistence operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{0} is not persisted")]
    NotPersisted(&'static str),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("connection schema version {actual_version} does not match expected {expected_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
    #[error("required column `{table}.{column}` is missing")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Table name plus the columns a repository reads or writes.
pub(crate) type TableRequirement = (&'static str, &'static [&'static str]);

pub(crate) const CLASSROOMS_TABLE: TableRequirement = ("classrooms", &["id"]);
pub(crate) const STUDENTS_TABLE: TableRequirement = (
    "students",
    &["id", "classroom_id", "firstname", "lastname", "birthdate"],
);
pub(crate) const GRADES_TABLE: TableRequirement =
    ("grades", &["id", "student_id", "value", "subject"]);

/// Opens the write transaction every repository mutation runs in.
pub(crate) fn begin_write(conn: &Connection) -> RepoResult<Transaction<'_>> {
    Ok(Transaction::new_unchecked(
        conn,
        TransactionBehavior::Immediate,
    )?)
}

/// Rejects connections that were not migrated by this binary or lack tables.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    requirements: &[TableRequirement],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in requirements {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
