//! Core employee record types for staffbook.
//!
//! This module defines the records kept per employee, the monthly attendance
//! tally, the validated period key it is stored under, and the parsers that
//! turn user-entered text into these types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Date format accepted for attendance entry.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How an employee attended on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// A full working day.
    Present,
    /// Half a working day.
    HalfDay,
}

impl AttendanceStatus {
    /// Human readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::HalfDay => "Half day",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::HalfDay => write!(f, "half_day"),
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "present" => Ok(Self::Present),
            "h" | "half" | "half-day" | "half_day" | "halfday" => Ok(Self::HalfDay),
            other => Err(Error::invalid_input(format!(
                "unknown attendance status '{other}': use P for present or H for half day"
            ))),
        }
    }
}

/// A calendar month in a specific year.
///
/// Serialized as `YYYY-MM`, which also gives a chronological sort order for
/// the string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Create a period, returning `None` for an out-of-range year or month.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The period containing the given date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The year of this period.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month of this period (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Full English month name, e.g. `October`.
    #[must_use]
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("?", |m| m.name())
    }

    /// Parse a period label entered by a user or found in an old data file.
    ///
    /// Accepts `YYYY-MM`, or an English month name or three-letter
    /// abbreviation (any case), which is placed in `default_year`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the label is neither form or the
    /// default year is out of range.
    pub fn parse_label(label: &str, default_year: i32) -> Result<Self> {
        let label = label.trim();
        if let Ok(period) = label.parse::<Self>() {
            return Ok(period);
        }

        let month = label.parse::<Month>().map_err(|_| {
            Error::invalid_input(format!(
                "unrecognised month '{label}': use YYYY-MM or a month name"
            ))
        })?;

        Self::new(default_year, month.number_from_month()).ok_or_else(|| {
            Error::invalid_input(format!("year {default_year} is out of range"))
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::invalid_input(format!("invalid period '{s}': expected YYYY-MM"));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Period {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// Monthly attendance counters for one employee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Full days present.
    pub days_present: u32,
    /// Half days present.
    pub half_days: u32,
}

impl Tally {
    /// Create a tally with the given counts.
    #[must_use]
    pub fn new(days_present: u32, half_days: u32) -> Self {
        Self {
            days_present,
            half_days,
        }
    }

    /// Count one more day with the given status.
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.days_present = self.days_present.saturating_add(1),
            AttendanceStatus::HalfDay => self.half_days = self.half_days.saturating_add(1),
        }
    }

    /// Add another tally's counts to this one.
    pub fn merge(&mut self, other: Tally) {
        self.days_present = self.days_present.saturating_add(other.days_present);
        self.half_days = self.half_days.saturating_add(other.half_days);
    }

    /// Days on which the employee showed up at all.
    #[must_use]
    pub fn present_equivalent(&self) -> u32 {
        self.days_present.saturating_add(self.half_days)
    }
}

/// A single employee record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Display name.
    pub name: String,

    /// Monthly base pay. Always positive.
    pub salary: f64,

    /// Attendance tallies by month.
    #[serde(default)]
    pub attendance: BTreeMap<Period, Tally>,

    /// Dates already entered, used to reject repeated entry.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub recorded_dates: BTreeMap<NaiveDate, AttendanceStatus>,
}

impl Employee {
    /// Create an employee with no attendance.
    #[must_use]
    pub fn new(name: impl Into<String>, salary: f64) -> Self {
        Self {
            name: name.into(),
            salary,
            attendance: BTreeMap::new(),
            recorded_dates: BTreeMap::new(),
        }
    }

    /// The tally for a period, if any attendance was entered for it.
    #[must_use]
    pub fn tally(&self, period: Period) -> Option<&Tally> {
        self.attendance.get(&period)
    }

    /// Whether attendance was already entered for this date.
    #[must_use]
    pub fn has_recorded(&self, date: NaiveDate) -> bool {
        self.recorded_dates.contains_key(&date)
    }
}

/// Parse a monetary amount such as a salary or a sales figure.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the text is not a finite number.
pub fn parse_amount(input: &str, what: &str) -> Result<f64> {
    let input = input.trim();
    input
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::invalid_input(format!("{what} '{input}' is not a number")))
}

/// Check that a salary is a usable positive amount.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for zero, negative or non-finite values.
pub fn validate_salary(salary: f64) -> Result<f64> {
    if salary.is_finite() && salary > 0.0 {
        Ok(salary)
    } else {
        Err(Error::invalid_input("salary must be a positive number"))
    }
}

/// Parse an attendance date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the text is not a valid date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| Error::invalid_date(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "P".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Present
        );
        assert_eq!(
            "h".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::HalfDay
        );
        assert_eq!(
            " half-day ".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::HalfDay
        );
        assert!("x".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AttendanceStatus::Present.to_string(), "present");
        assert_eq!(AttendanceStatus::HalfDay.to_string(), "half_day");
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&AttendanceStatus::HalfDay).unwrap();
        assert_eq!(json, "\"half_day\"");
        let back: AttendanceStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AttendanceStatus::HalfDay);
    }

    #[test]
    fn test_period_new_bounds() {
        assert!(Period::new(2024, 1).is_some());
        assert!(Period::new(2024, 12).is_some());
        assert!(Period::new(2024, 0).is_none());
        assert!(Period::new(2024, 13).is_none());
        assert!(Period::new(0, 5).is_none());
    }

    #[test]
    fn test_period_from_date() {
        let period = Period::from_date(date(2024, 10, 17));
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month(), 10);
        assert_eq!(period.to_string(), "2024-10");
        assert_eq!(period.month_name(), "October");
    }

    #[test]
    fn test_period_from_str() {
        assert_eq!("2024-03".parse::<Period>().unwrap(), Period::new(2024, 3).unwrap());
        assert_eq!("2024-3".parse::<Period>().unwrap(), Period::new(2024, 3).unwrap());
        assert!("2024-13".parse::<Period>().is_err());
        assert!("24-03".parse::<Period>().is_err());
        assert!("Oct".parse::<Period>().is_err());
        assert!("2024-10-01".parse::<Period>().is_err());
    }

    #[test]
    fn test_parse_label_month_names() {
        let oct = Period::new(2023, 10).unwrap();
        assert_eq!(Period::parse_label("Oct", 2023).unwrap(), oct);
        assert_eq!(Period::parse_label("oct", 2023).unwrap(), oct);
        assert_eq!(Period::parse_label("October", 2023).unwrap(), oct);
        assert_eq!(Period::parse_label("2023-10", 1999).unwrap(), oct);
    }

    #[test]
    fn test_parse_label_rejects_garbage() {
        let err = Period::parse_label("Foo", 2024).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn test_periods_in_different_years_are_distinct() {
        let a = Period::parse_label("Oct", 2023).unwrap();
        let b = Period::parse_label("Oct", 2024).unwrap();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn test_period_serde_as_string() {
        let period = Period::new(2024, 7).unwrap();
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"2024-07\"");
        let back: Period = serde_json::from_str("\"2024-07\"").unwrap();
        assert_eq!(back, period);
        assert!(serde_json::from_str::<Period>("\"Jul\"").is_err());
    }

    #[test]
    fn test_tally_record() {
        let mut tally = Tally::default();
        tally.record(AttendanceStatus::Present);
        tally.record(AttendanceStatus::Present);
        tally.record(AttendanceStatus::HalfDay);
        assert_eq!(tally, Tally::new(2, 1));
        assert_eq!(tally.present_equivalent(), 3);
    }

    #[test]
    fn test_tally_merge() {
        let mut tally = Tally::new(3, 1);
        tally.merge(Tally::new(2, 2));
        assert_eq!(tally, Tally::new(5, 3));
    }

    #[test]
    fn test_employee_serializes_period_keys() {
        let mut employee = Employee::new("Asha", 3000.0);
        employee
            .attendance
            .insert(Period::new(2024, 10).unwrap(), Tally::new(20, 4));
        let json = serde_json::to_value(&employee).unwrap();
        assert_eq!(json["attendance"]["2024-10"]["days_present"], 20);
        assert_eq!(json["attendance"]["2024-10"]["half_days"], 4);
        assert!(json.get("recorded_dates").is_none());
    }

    #[test]
    fn test_employee_has_recorded() {
        let mut employee = Employee::new("Asha", 3000.0);
        employee
            .recorded_dates
            .insert(date(2024, 10, 1), AttendanceStatus::Present);
        assert!(employee.has_recorded(date(2024, 10, 1)));
        assert!(!employee.has_recorded(date(2024, 10, 2)));
    }

    #[test]
    fn test_parse_amount() {
        assert!((parse_amount(" 1500.50 ", "salary").unwrap() - 1500.5).abs() < f64::EPSILON);
        assert!(parse_amount("abc", "salary").is_err());
        assert!(parse_amount("NaN", "salary").is_err());
        assert!(parse_amount("inf", "salary").is_err());
    }

    #[test]
    fn test_validate_salary() {
        assert!(validate_salary(1.0).is_ok());
        assert!(validate_salary(0.0).is_err());
        assert!(validate_salary(-10.0).is_err());
        assert!(validate_salary(f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-10-03").unwrap(), date(2024, 10, 3));
        assert!(matches!(
            parse_date("03/10/2024"),
            Err(Error::InvalidDate { .. })
        ));
        assert!(parse_date("2024-02-30").is_err());
    }
}
