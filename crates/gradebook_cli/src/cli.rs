//! Command-line surface.
//!
//! Global flags fall back to `GRADEBOOK_*` environment variables and are
//! accepted before or after the subcommand.

use clap::{Parser, Subcommand};
use gradebook_core::{ClassroomId, StudentId};
use std::path::PathBuf;

pub const DEFAULT_DB_FILE: &str = "gradebook.sqlite3";

/// Gradebook - classrooms, students and their grades
#[derive(Parser, Debug)]
#[command(name = "gradebook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "GRADEBOOK_DB", default_value = DEFAULT_DB_FILE)]
    pub db: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "GRADEBOOK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rotating log files; logging is off when unset
    #[arg(long, global = true, env = "GRADEBOOK_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Health check
    Ping,

    /// Manage classrooms
    Classroom {
        #[command(subcommand)]
        action: ClassroomCommand,
    },

    /// Manage students and grades
    Student {
        #[command(subcommand)]
        action: StudentCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ClassroomCommand {
    /// Create an empty classroom
    Create,

    /// Show a classroom with its students and average
    Show { id: ClassroomId },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum StudentCommand {
    /// Create a student in an existing classroom
    Create {
        #[arg(long)]
        firstname: String,

        #[arg(long)]
        lastname: String,

        /// YYYY-MM-DD
        #[arg(long)]
        birthdate: String,

        #[arg(long)]
        classroom: ClassroomId,
    },

    /// Show a student with grades and average
    Show { id: StudentId },

    /// Apply replace operations, e.g. '[{"op":"replace","field":"firstname","value":"Ada"}]'
    Patch {
        id: StudentId,

        /// JSON list of operations
        #[arg(long)]
        ops: String,
    },

    /// Record a grade for a student
    Grade {
        id: StudentId,

        #[arg(long, allow_negative_numbers = true)]
        value: f64,

        #[arg(long)]
        subject: String,
    },

    /// Delete a student and its grades
    Delete { id: StudentId },
}

impl Command {
    /// Short name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Classroom { action } => match action {
                ClassroomCommand::Create => "classroom_create",
                ClassroomCommand::Show { .. } => "classroom_show",
            },
            Self::Student { action } => match action {
                StudentCommand::Create { .. } => "student_create",
                StudentCommand::Show { .. } => "student_show",
                StudentCommand::Patch { .. } => "student_patch",
                StudentCommand::Grade { .. } => "student_grade",
                StudentCommand::Delete { .. } => "student_delete",
            },
        }
    }
}
