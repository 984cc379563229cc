//! `staffbook` - Employee attendance and payroll records
//!
//! This library keeps a small file-backed store of employees, counts their
//! monthly attendance and derives net salary from it. The binary wraps it in
//! an interactive menu and a set of scripted subcommands.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod employee;
pub mod error;
pub mod logging;
pub mod payroll;
pub mod storage;

pub use config::Config;
pub use employee::{AttendanceStatus, Employee, Period, Tally};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use payroll::{compute_net_salary, BonusOutcome, SalaryBreakdown};
pub use storage::{Store, StoreOptions};
