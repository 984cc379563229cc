//! Command-line interface for staffbook.
//!
//! This module provides the CLI structure, the interactive menu session and
//! the text rendering shared by both.

mod commands;
pub mod menu;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AttendanceCommand, BonusCommand, ConfigCommand, EmployeeCommand, SalaryCommand, StatusArg,
};

/// staffbook - Employee attendance and payroll records
///
/// Run without a command to start the interactive menu.
#[derive(Debug, Parser)]
#[command(name = "staffbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the employee data file (overrides configuration)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub data_file: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive menu
    Menu,

    /// Manage employee records
    #[command(subcommand)]
    Employee(EmployeeCommand),

    /// Record a day of attendance
    Attendance(AttendanceCommand),

    /// Show the salary breakdown for a month
    Salary(SalaryCommand),

    /// Check a sales target and apply the bonus
    Bonus(BonusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "staffbook");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(
            parse(&["staffbook", "-q"]).verbosity(),
            crate::logging::Verbosity::Quiet
        );
        assert_eq!(
            parse(&["staffbook"]).verbosity(),
            crate::logging::Verbosity::Normal
        );
        assert_eq!(
            parse(&["staffbook", "-v"]).verbosity(),
            crate::logging::Verbosity::Verbose
        );
        assert_eq!(
            parse(&["staffbook", "-vv"]).verbosity(),
            crate::logging::Verbosity::Trace
        );
    }

    #[test]
    fn test_no_command_defaults_to_menu() {
        let cli = parse(&["staffbook"]);
        assert!(cli.command.is_none());

        let cli = parse(&["staffbook", "menu"]);
        assert!(matches!(cli.command, Some(Command::Menu)));
    }

    #[test]
    fn test_parse_employee_add() {
        let cli = parse(&["staffbook", "employee", "add", "E1", "Asha", "3000"]);
        match cli.command {
            Some(Command::Employee(EmployeeCommand::Add { id, name, salary })) => {
                assert_eq!(id, "E1");
                assert_eq!(name, "Asha");
                assert!((salary - 3000.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_employee_add_negative_salary_reaches_validation() {
        let cli = parse(&["staffbook", "employee", "add", "E1", "Asha", "-5"]);
        assert!(matches!(
            cli.command,
            Some(Command::Employee(EmployeeCommand::Add { .. }))
        ));
    }

    #[test]
    fn test_parse_employee_update_partial() {
        let cli = parse(&["staffbook", "employee", "update", "E1", "--salary", "3500"]);
        match cli.command {
            Some(Command::Employee(EmployeeCommand::Update { id, name, salary })) => {
                assert_eq!(id, "E1");
                assert!(name.is_none());
                assert_eq!(salary, Some(3500.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_attendance() {
        let cli = parse(&[
            "staffbook",
            "attendance",
            "E1",
            "2024-10-01",
            "h",
            "--show-salary",
        ]);
        match cli.command {
            Some(Command::Attendance(cmd)) => {
                assert_eq!(cmd.id, "E1");
                assert_eq!(cmd.date, "2024-10-01");
                assert_eq!(cmd.status, StatusArg::HalfDay);
                assert!(cmd.show_salary);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_attendance_rejects_unknown_status() {
        let result = Cli::try_parse_from(["staffbook", "attendance", "E1", "2024-10-01", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_salary() {
        let cli = parse(&["staffbook", "salary", "E1", "2024-10", "--json"]);
        assert!(matches!(cli.command, Some(Command::Salary(ref c)) if c.json));
    }

    #[test]
    fn test_parse_bonus() {
        let cli = parse(&[
            "staffbook",
            "bonus",
            "E1",
            "--target",
            "100",
            "--achieved",
            "150",
        ]);
        match cli.command {
            Some(Command::Bonus(cmd)) => {
                assert!((cmd.target - 100.0).abs() < f64::EPSILON);
                assert!((cmd.achieved - 150.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_config_and_data_file() {
        let cli = parse(&[
            "staffbook",
            "-c",
            "/custom/config.toml",
            "-d",
            "/custom/employees.json",
            "employee",
            "list",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.data_file, Some(PathBuf::from("/custom/employees.json")));
    }
}
