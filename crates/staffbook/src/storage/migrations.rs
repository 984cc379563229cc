//! Data file versioning and record upgrades for staffbook.
//!
//! Older releases wrote a bare `id -> record` JSON object with free-form
//! month labels, and before that stored monthly attendance as a plain number
//! with half days and leaves kept in separate top-level fields. Every record
//! read from disk is passed through [`upgrade`], which is a pure function and
//! a no-op on records that are already current.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::employee::{validate_salary, AttendanceStatus, Employee, Period, Tally};
use crate::error::{Error, Result};

/// The current data file schema version.
pub const CURRENT_VERSION: u32 = 2;

/// Key holding the schema version in a current data file.
const VERSION_KEY: &str = "schema_version";

/// Key holding the employee map in a current data file.
const EMPLOYEES_KEY: &str = "employees";

/// A record as it may appear on disk, in any schema version.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegacyRecord {
    /// Display name.
    pub name: String,
    /// Monthly base pay.
    pub salary: f64,
    /// Attendance by month label.
    #[serde(default)]
    pub attendance: BTreeMap<String, LegacyTally>,
    /// Per-date entries (current schema only).
    #[serde(default)]
    pub recorded_dates: BTreeMap<chrono::NaiveDate, AttendanceStatus>,
    /// Old top-level half-day counts by month label.
    #[serde(default)]
    pub half_days: Option<Value>,
    /// Old top-level leave counts. Discarded on upgrade.
    #[serde(default)]
    pub leaves: Option<Value>,
}

/// A month's attendance as it may appear on disk.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LegacyTally {
    /// Oldest form: the number of days present.
    Count(f64),
    /// Structured form.
    Tally {
        /// Full days present.
        days_present: f64,
        /// Half days present.
        #[serde(default)]
        half_days: f64,
    },
}

/// Result of upgrading one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Upgraded {
    /// The record in the current schema.
    pub employee: Employee,
    /// Month labels that could not be mapped to a period and were dropped.
    pub dropped_labels: Vec<String>,
}

/// The on-disk document written by this version.
#[derive(Debug, Serialize)]
struct Document<'a> {
    schema_version: u32,
    employees: &'a BTreeMap<String, Employee>,
}

/// Upgrade a record read from disk to the current schema.
///
/// Month labels that are not already `YYYY-MM` are placed in `legacy_year`.
/// Labels that resolve to the same period are summed.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the salary is not positive or a count
/// is negative or not a number.
pub fn upgrade(record: LegacyRecord, legacy_year: i32) -> Result<Upgraded> {
    let salary = validate_salary(record.salary)?;
    let legacy_half_days = record.half_days.as_ref().and_then(Value::as_object);

    let mut attendance: BTreeMap<Period, Tally> = BTreeMap::new();
    let mut dropped_labels = Vec::new();

    for (label, value) in record.attendance {
        let tally = match value {
            LegacyTally::Count(days) => {
                let half_days = legacy_half_days
                    .and_then(|m| m.get(&label))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);
                Tally::new(count(days)?, count(half_days)?)
            }
            LegacyTally::Tally {
                days_present,
                half_days,
            } => Tally::new(count(days_present)?, count(half_days)?),
        };

        match Period::parse_label(&label, legacy_year) {
            Ok(period) => attendance.entry(period).or_default().merge(tally),
            Err(_) => dropped_labels.push(label),
        }
    }

    Ok(Upgraded {
        employee: Employee {
            name: record.name,
            salary,
            attendance,
            recorded_dates: record.recorded_dates,
        },
        dropped_labels,
    })
}

/// Convert a stored count to `u32`, rounding fractional values.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: f64) -> Result<u32> {
    if value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) {
        Ok(value.round() as u32)
    } else {
        Err(Error::invalid_input(format!(
            "attendance count {value} is not a non-negative number"
        )))
    }
}

/// A fully decoded data file.
#[derive(Debug, Default)]
pub struct Decoded {
    /// Employees by id.
    pub employees: BTreeMap<String, Employee>,
    /// Schema version found in the file (`1` for unversioned files).
    pub source_version: u64,
    /// `(employee id, label)` pairs dropped during upgrade.
    pub dropped_labels: Vec<(String, String)>,
}

impl Decoded {
    /// Whether the file needs rewriting to reach the current schema.
    #[must_use]
    pub fn needs_rewrite(&self) -> bool {
        self.source_version < u64::from(CURRENT_VERSION) || !self.dropped_labels.is_empty()
    }
}

/// Decode the content of a data file, upgrading every record.
///
/// Errors are reported as [`Error::CorruptPersistedState`] with an empty
/// path; callers attach the real path. A file from a newer release yields
/// [`Error::UnsupportedSchema`].
///
/// # Errors
///
/// Returns an error if the content is malformed or too new.
pub fn decode_document(raw: &str, legacy_year: i32) -> Result<Decoded> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::corrupt("", e.to_string()))?;
    let Value::Object(mut root) = value else {
        return Err(Error::corrupt("", "top level is not a JSON object"));
    };

    let (source_version, records) = match root.remove(VERSION_KEY) {
        Some(version) => {
            let version = version
                .as_u64()
                .ok_or_else(|| Error::corrupt("", format!("invalid schema version: {version}")))?;
            if version > u64::from(CURRENT_VERSION) {
                return Err(Error::UnsupportedSchema {
                    found: version,
                    supported: CURRENT_VERSION,
                });
            }
            let records = match root.remove(EMPLOYEES_KEY) {
                Some(Value::Object(map)) => map,
                None => Map::new(),
                Some(_) => return Err(Error::corrupt("", "'employees' is not a JSON object")),
            };
            (version, records)
        }
        // Unversioned files are the bare id -> record map.
        None => (1, root),
    };

    let mut decoded = Decoded {
        source_version,
        ..Decoded::default()
    };

    for (id, value) in records {
        let record: LegacyRecord = serde_json::from_value(value)
            .map_err(|e| Error::corrupt("", format!("employee '{id}': {e}")))?;
        let upgraded = upgrade(record, legacy_year)
            .map_err(|e| Error::corrupt("", format!("employee '{id}': {e}")))?;

        decoded.dropped_labels.extend(
            upgraded
                .dropped_labels
                .into_iter()
                .map(|label| (id.clone(), label)),
        );
        decoded.employees.insert(id, upgraded.employee);
    }

    Ok(decoded)
}

/// Encode employees as a current-version data file.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_document(employees: &BTreeMap<String, Employee>) -> Result<String> {
    let document = Document {
        schema_version: CURRENT_VERSION,
        employees,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
