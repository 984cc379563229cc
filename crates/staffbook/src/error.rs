//! Error types for staffbook.
//!
//! Every store operation reports failure through [`Error`]. Interactive and
//! scripted front ends print the message and carry on; only errors that make
//! the data file unreachable abort a command.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::employee::Period;

/// The main error type for staffbook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// An employee with this id already exists.
    #[error("employee id '{id}' already exists")]
    DuplicateId {
        /// The conflicting employee id.
        id: String,
    },

    /// No employee with this id exists.
    #[error("employee id '{id}' not found")]
    NotFound {
        /// The missing employee id.
        id: String,
    },

    /// A value supplied by the caller was rejected.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected value.
        message: String,
    },

    /// A date could not be parsed.
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The text that failed to parse.
        input: String,
    },

    /// The employee has no tally for the requested period.
    #[error("no attendance record for employee '{id}' in {period}")]
    NoAttendanceRecord {
        /// The employee id.
        id: String,
        /// The requested period.
        period: Period,
    },

    /// Attendance for this date was already entered.
    #[error("attendance for employee '{id}' on {date} was already recorded")]
    AttendanceAlreadyRecorded {
        /// The employee id.
        id: String,
        /// The date entered twice.
        date: NaiveDate,
    },

    // === Persistence Errors ===
    /// The data file exists but its content cannot be used.
    #[error("corrupt data file {path}: {message}")]
    CorruptPersistedState {
        /// Path to the data file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// The data file was written by a newer release.
    #[error("data file schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema {
        /// Version found in the file.
        found: u64,
        /// Highest version this build understands.
        supported: u32,
    },

    /// Replacing the data file failed.
    #[error("failed to write data file {path}: {source}")]
    Persist {
        /// Path to the data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Reading from the terminal failed.
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for staffbook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a duplicate id error.
    #[must_use]
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an invalid date error.
    #[must_use]
    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.into(),
        }
    }

    /// Create a corrupt data file error.
    #[must_use]
    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CorruptPersistedState {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the employee does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error was caused by caller input rather than the
    /// environment.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateId { .. }
                | Self::NotFound { .. }
                | Self::InvalidInput { .. }
                | Self::InvalidDate { .. }
                | Self::NoAttendanceRecord { .. }
                | Self::AttendanceAlreadyRecorded { .. }
        )
    }

    /// Check if this error is a recoverable data file corruption.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptPersistedState { .. })
    }
}
