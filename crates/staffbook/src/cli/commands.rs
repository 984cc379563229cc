//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::employee::AttendanceStatus;

/// Employee record commands.
#[derive(Debug, Subcommand)]
pub enum EmployeeCommand {
    /// Add a new employee
    Add {
        /// Unique employee id
        id: String,

        /// Display name
        name: String,

        /// Monthly base salary
        #[arg(allow_hyphen_values = true)]
        salary: f64,
    },

    /// List all employees
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Remove an employee
    Remove {
        /// Employee id
        id: String,
    },

    /// Change an employee's name or salary
    Update {
        /// Employee id
        id: String,

        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New monthly base salary
        #[arg(short, long, allow_hyphen_values = true)]
        salary: Option<f64>,
    },
}

/// Attendance command arguments.
#[derive(Debug, Args)]
pub struct AttendanceCommand {
    /// Employee id
    pub id: String,

    /// Date of attendance (YYYY-MM-DD)
    pub date: String,

    /// Attendance status
    #[arg(value_enum)]
    pub status: StatusArg,

    /// Show the month's salary breakdown afterwards
    #[arg(long)]
    pub show_salary: bool,
}

/// Salary command arguments.
#[derive(Debug, Args)]
pub struct SalaryCommand {
    /// Employee id
    pub id: String,

    /// Month as YYYY-MM, or a month name for the current year
    pub period: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Bonus command arguments.
#[derive(Debug, Args)]
pub struct BonusCommand {
    /// Employee id
    pub id: String,

    /// Sales target for the period
    #[arg(short, long, allow_hyphen_values = true)]
    pub target: f64,

    /// Sales actually achieved
    #[arg(short, long, allow_hyphen_values = true)]
    pub achieved: f64,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Attendance status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// A full working day
    #[value(alias = "p")]
    Present,
    /// Half a working day
    #[value(alias = "h")]
    HalfDay,
}

impl From<StatusArg> for AttendanceStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Present => AttendanceStatus::Present,
            StatusArg::HalfDay => AttendanceStatus::HalfDay,
        }
    }
}
