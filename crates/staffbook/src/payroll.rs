//! Salary calculation.
//!
//! Pure functions that turn a monthly attendance tally into a deduction
//! breakdown and net pay, plus the sales-target bonus rule. Nothing here
//! touches the store or the file system.

use serde::Serialize;

use crate::employee::Tally;
use crate::error::{Error, Result};

/// Length of the pay period used for the daily rate.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Fraction of the current salary awarded when a sales target is met.
pub const DEFAULT_BONUS_RATE: f64 = 0.05;

/// Non-fatal observation about the attendance a breakdown was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// More days were recorded than the period has.
    OverRecorded {
        /// Full plus half days recorded.
        recorded: u32,
        /// Days in the pay period.
        period_days: u32,
    },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverRecorded {
                recorded,
                period_days,
            } => write!(
                f,
                "total recorded days ({recorded}) exceeds the {period_days}-day period"
            ),
        }
    }
}

/// Deductions and net pay for one employee and one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryBreakdown {
    /// Monthly base salary.
    pub base_salary: f64,
    /// Days in the pay period.
    pub period_days: u32,
    /// Full days present.
    pub days_present: u32,
    /// Half days present.
    pub half_days: u32,
    /// Days with no attendance at all.
    pub leaves: u32,
    /// Base salary divided by the period length.
    pub daily_rate: f64,
    /// Pay withheld for leaves.
    pub leave_deduction: f64,
    /// Pay withheld for the missing half of each half day.
    pub half_day_deduction: f64,
    /// Amount payable.
    pub net_salary: f64,
    /// Set when the tally looks wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
}

impl SalaryBreakdown {
    /// Sum of all deductions.
    #[must_use]
    pub fn total_deduction(&self) -> f64 {
        self.leave_deduction + self.half_day_deduction
    }
}

/// Compute the net salary for a month of attendance.
///
/// Leaves are the days of the period not covered by a full or half day and
/// never go below zero. Each half day additionally costs half a daily rate.
///
/// `period_days` must be positive; configuration validation guarantees this
/// for values coming from the config file.
#[must_use]
pub fn compute_net_salary(base_salary: f64, tally: Tally, period_days: u32) -> SalaryBreakdown {
    let recorded = tally.present_equivalent();
    let leaves = period_days.saturating_sub(recorded);
    let advisory = (recorded > period_days).then_some(Advisory::OverRecorded {
        recorded,
        period_days,
    });

    let daily_rate = base_salary / f64::from(period_days);
    let leave_deduction = daily_rate * f64::from(leaves);
    let half_day_deduction = (daily_rate / 2.0) * f64::from(tally.half_days);
    let net_salary = base_salary - leave_deduction - half_day_deduction;

    SalaryBreakdown {
        base_salary,
        period_days,
        days_present: tally.days_present,
        half_days: tally.half_days,
        leaves,
        daily_rate,
        leave_deduction,
        half_day_deduction,
        net_salary,
        advisory,
    }
}

/// Result of checking a sales figure against its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BonusOutcome {
    /// Target met; salary raised.
    Awarded {
        /// Amount added to the salary.
        bonus: f64,
        /// Salary after the raise.
        new_salary: f64,
    },
    /// Target missed; salary unchanged.
    TargetMissed {
        /// How far sales fell short of the target.
        shortfall: f64,
    },
}

impl BonusOutcome {
    /// Whether the salary changed.
    #[must_use]
    pub fn is_awarded(&self) -> bool {
        matches!(self, Self::Awarded { .. })
    }
}

/// Apply the sales-target bonus rule.
///
/// Meeting the target exactly counts as met.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the target is not positive or the
/// achieved figure is negative.
pub fn evaluate_bonus(salary: f64, target: f64, achieved: f64, rate: f64) -> Result<BonusOutcome> {
    if !target.is_finite() || target <= 0.0 {
        return Err(Error::invalid_input("sales target must be a positive number"));
    }
    if !achieved.is_finite() || achieved < 0.0 {
        return Err(Error::invalid_input(
            "achieved sales must be a non-negative number",
        ));
    }

    if achieved >= target {
        let bonus = rate * salary;
        Ok(BonusOutcome::Awarded {
            bonus,
            new_salary: salary + bonus,
        })
    } else {
        Ok(BonusOutcome::TargetMissed {
            shortfall: target - achieved,
        })
    }
}
