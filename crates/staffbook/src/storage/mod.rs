//! Storage layer for staffbook.
//!
//! This module provides the employee store: an in-memory map from employee
//! id to record, loaded from a JSON data file at startup and rewritten in
//! full after every change.

pub mod migrations;

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::employee::{validate_salary, AttendanceStatus, Employee, Period};
use crate::error::{Error, Result};
use crate::payroll::{self, BonusOutcome, SalaryBreakdown};

/// Settings that shape store behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreOptions {
    /// Year assigned to month-name labels found in old data files.
    pub legacy_year: i32,
    /// Days in a pay period.
    pub period_days: u32,
    /// Fraction of salary awarded when a sales target is met.
    pub bonus_rate: f64,
    /// Refuse a second attendance entry for the same employee and date.
    pub reject_duplicate_dates: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            legacy_year: Local::now().year(),
            period_days: payroll::DEFAULT_PERIOD_DAYS,
            bonus_rate: payroll::DEFAULT_BONUS_RATE,
            reject_duplicate_dates: true,
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            legacy_year: config.legacy_year(),
            period_days: config.payroll.period_days,
            bonus_rate: config.payroll.bonus_rate,
            reject_duplicate_dates: config.attendance.reject_duplicate_dates,
        }
    }
}

/// Whether an update changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// At least one field changed and the store was saved.
    Updated,
    /// Nothing to change; the store was not saved.
    Unchanged,
}

/// The employee store.
///
/// Every mutation is applied to a copy of the employee map, written to disk,
/// and only then made current. A failed write leaves both the file and the
/// in-memory state as they were.
#[derive(Debug)]
pub struct Store {
    /// Path to the data file, or `None` for an in-memory store.
    path: Option<PathBuf>,
    /// Employees by id.
    employees: BTreeMap<String, Employee>,
    /// Behaviour settings.
    options: StoreOptions,
}

impl Store {
    /// Open the store backed by the data file at `path`.
    ///
    /// A missing file gives an empty store. A file that cannot be parsed is
    /// moved aside to `<name>.corrupt-<timestamp>` and the store starts
    /// empty. Files written by older releases are upgraded and rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, was written by a newer
    /// release, or an upgraded file cannot be saved.
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut store = Self {
            path: Some(path.clone()),
            employees: BTreeMap::new(),
            options,
        };

        if !path.exists() {
            info!("No data file at {}, starting empty", path.display());
            return Ok(store);
        }

        debug!("Loading data file {}", path.display());
        let raw = fs::read_to_string(&path)?;

        match migrations::decode_document(&raw, options.legacy_year) {
            Ok(decoded) => {
                for (id, label) in &decoded.dropped_labels {
                    warn!(employee = %id, label = %label, "Dropped unrecognised attendance month");
                }
                let rewrite = decoded.needs_rewrite();
                store.employees = decoded.employees;
                if rewrite {
                    info!(
                        from = decoded.source_version,
                        to = migrations::CURRENT_VERSION,
                        "Upgrading data file schema"
                    );
                    store.save(&store.employees)?;
                }
            }
            Err(Error::CorruptPersistedState { message, .. }) => {
                let err = Error::corrupt(&path, message);
                let backup = quarantine(&path)?;
                warn!(
                    "{err}; moved to {} and starting with empty data",
                    backup.display()
                );
            }
            Err(e) => return Err(e),
        }

        info!(
            "Loaded {} employees from {}",
            store.employees.len(),
            path.display()
        );
        Ok(store)
    }

    /// Create a store that is never written to disk.
    #[must_use]
    pub fn in_memory(options: StoreOptions) -> Self {
        Self {
            path: None,
            employees: BTreeMap::new(),
            options,
        }
    }

    /// Get the path to the data file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the store settings.
    #[must_use]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Number of employees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Whether the store has no employees.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Whether an employee with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.employees.contains_key(id.trim())
    }

    /// Look up an employee.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Employee> {
        self.employees.get(id.trim())
    }

    /// All employees in id order.
    pub fn list(&self) -> impl Iterator<Item = (&str, &Employee)> {
        self.employees.iter().map(|(id, e)| (id.as_str(), e))
    }

    /// Add a new employee with no attendance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if the id is taken, or
    /// [`Error::InvalidInput`] for an empty id or name or a non-positive
    /// salary.
    pub fn create(&mut self, id: &str, name: &str, salary: f64) -> Result<()> {
        let id = id.trim();
        let name = name.trim();
        if id.is_empty() {
            return Err(Error::invalid_input("employee id must not be empty"));
        }
        if self.contains(id) {
            return Err(Error::duplicate_id(id));
        }
        if name.is_empty() {
            return Err(Error::invalid_input("name must not be empty"));
        }
        let salary = validate_salary(salary)?;

        self.mutate(|employees| {
            employees.insert(id.to_string(), Employee::new(name, salary));
            Ok(())
        })?;
        debug!(employee = %id, "Employee added");
        Ok(())
    }

    /// Remove an employee, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id does not exist.
    pub fn delete(&mut self, id: &str) -> Result<Employee> {
        let id = id.trim();
        let removed = self.mutate(|employees| {
            employees.remove(id).ok_or_else(|| Error::not_found(id))
        })?;
        debug!(employee = %id, "Employee deleted");
        Ok(removed)
    }

    /// Change an employee's name and/or salary.
    ///
    /// Blank names are ignored. Nothing is applied unless every supplied
    /// value is valid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id does not exist, or
    /// [`Error::InvalidInput`] for a non-positive salary.
    pub fn update(
        &mut self,
        id: &str,
        name: Option<&str>,
        salary: Option<f64>,
    ) -> Result<UpdateOutcome> {
        let id = id.trim();
        let current = self.employees.get(id).ok_or_else(|| Error::not_found(id))?;
        let salary = salary.map(validate_salary).transpose()?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        #[allow(clippy::float_cmp)]
        let salary = salary.filter(|s| *s != current.salary);
        let name = name.filter(|n| *n != current.name);

        if name.is_none() && salary.is_none() {
            return Ok(UpdateOutcome::Unchanged);
        }

        self.mutate(|employees| {
            let employee = employees.get_mut(id).ok_or_else(|| Error::not_found(id))?;
            if let Some(name) = name {
                employee.name = name.to_string();
            }
            if let Some(salary) = salary {
                employee.salary = salary;
            }
            Ok(())
        })?;
        debug!(employee = %id, "Employee updated");
        Ok(UpdateOutcome::Updated)
    }

    /// Count one day of attendance, returning the period it was booked to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id does not exist, or
    /// [`Error::AttendanceAlreadyRecorded`] if duplicate dates are rejected
    /// and this date was already entered.
    pub fn record_attendance(
        &mut self,
        id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<Period> {
        let id = id.trim();
        let reject_duplicates = self.options.reject_duplicate_dates;
        let period = Period::from_date(date);

        self.mutate(|employees| {
            let employee = employees.get_mut(id).ok_or_else(|| Error::not_found(id))?;
            if reject_duplicates && employee.has_recorded(date) {
                return Err(Error::AttendanceAlreadyRecorded {
                    id: id.to_string(),
                    date,
                });
            }
            employee.attendance.entry(period).or_default().record(status);
            employee.recorded_dates.insert(date, status);
            Ok(())
        })?;

        debug!(employee = %id, %date, %status, "Attendance recorded");
        Ok(period)
    }

    /// Compute the salary breakdown for an employee and period.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id does not exist, or
    /// [`Error::NoAttendanceRecord`] if nothing was entered for the period.
    pub fn salary_for(&self, id: &str, period: Period) -> Result<SalaryBreakdown> {
        let id = id.trim();
        let employee = self.employees.get(id).ok_or_else(|| Error::not_found(id))?;
        let tally = employee
            .tally(period)
            .ok_or_else(|| Error::NoAttendanceRecord {
                id: id.to_string(),
                period,
            })?;

        let breakdown = payroll::compute_net_salary(employee.salary, *tally, self.options.period_days);
        if let Some(advisory) = breakdown.advisory {
            warn!(employee = %id, %period, "{advisory}");
        }
        Ok(breakdown)
    }

    /// Record attendance and return the salary for the affected period.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Store::record_attendance`].
    pub fn record_attendance_and_compute(
        &mut self,
        id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<(Period, SalaryBreakdown)> {
        let period = self.record_attendance(id, date, status)?;
        let breakdown = self.salary_for(id, period)?;
        Ok((period, breakdown))
    }

    /// Raise the salary by the bonus rate if sales met the target.
    ///
    /// A missed target is a normal outcome and leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id does not exist, or
    /// [`Error::InvalidInput`] for a non-positive target or negative sales.
    pub fn award_bonus_if_target_met(
        &mut self,
        id: &str,
        target: f64,
        achieved: f64,
    ) -> Result<BonusOutcome> {
        let id = id.trim();
        let employee = self.employees.get(id).ok_or_else(|| Error::not_found(id))?;
        let outcome =
            payroll::evaluate_bonus(employee.salary, target, achieved, self.options.bonus_rate)?;

        if let BonusOutcome::Awarded { new_salary, .. } = outcome {
            self.mutate(|employees| {
                let employee = employees.get_mut(id).ok_or_else(|| Error::not_found(id))?;
                employee.salary = new_salary;
                Ok(())
            })?;
            debug!(employee = %id, new_salary, "Bonus applied");
        } else {
            debug!(employee = %id, target, achieved, "Sales target missed");
        }
        Ok(outcome)
    }

    /// Apply `change` to a copy of the employees, save it, then commit.
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut BTreeMap<String, Employee>) -> Result<T>,
    ) -> Result<T> {
        let mut next = self.employees.clone();
        let value = change(&mut next)?;
        self.save(&next)?;
        self.employees = next;
        Ok(value)
    }

    /// Write the given employees to the data file, replacing it atomically.
    fn save(&self, employees: &BTreeMap<String, Employee>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = migrations::encode_document(employees)?;
        write_atomic(path, contents.as_bytes())?;
        debug!("Saved {} employees to {}", employees.len(), path.display());
        Ok(())
    }
}

/// Replace `path` with `contents` via a temporary file in the same directory.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.exists() {
        fs::create_dir_all(&parent).map_err(|source| Error::DirectoryCreate {
            path: parent.clone(),
            source,
        })?;
    }

    let persist_err = |source| Error::Persist {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = tempfile::NamedTempFile::new_in(&parent).map_err(persist_err)?;
    temp.write_all(contents).map_err(persist_err)?;
    temp.as_file().sync_all().map_err(persist_err)?;

    // Salary data is private to the owner.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o600))
            .map_err(persist_err)?;
    }

    temp.persist(path).map_err(|e| persist_err(e.error))?;
    Ok(())
}

/// Move an unreadable data file aside so it is not overwritten.
///
/// Earlier backups are never replaced; a numeric suffix is added when a
/// backup with the same timestamp already exists.
fn quarantine(path: &Path) -> Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let mut base = path.file_name().unwrap_or_default().to_os_string();
    base.push(format!(".corrupt-{stamp}"));

    let mut backup = path.with_file_name(&base);
    let mut attempt = 1u32;
    while backup.exists() {
        let mut name = base.clone();
        name.push(format!("-{attempt}"));
        backup = path.with_file_name(name);
        attempt += 1;
    }

    fs::rename(path, &backup)?;
    Ok(backup)
}
