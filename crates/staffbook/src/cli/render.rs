//! Plain-text rendering of store contents and payroll results.

use std::fmt::Write;

use crate::employee::{Employee, Period};
use crate::payroll::{BonusOutcome, SalaryBreakdown};
use crate::storage::UpdateOutcome;

const ID_WIDTH: usize = 8;
const NAME_WIDTH: usize = 24;
const SALARY_WIDTH: usize = 14;

/// Format an amount with two decimals and thousands separators.
#[must_use]
pub fn format_money(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, frac) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && formatted != "0.00" {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac}")
}

/// Render the employee listing.
#[must_use]
pub fn employee_table<'a>(rows: impl IntoIterator<Item = (&'a str, &'a Employee)>) -> String {
    let mut rows = rows.into_iter().peekable();
    if rows.peek().is_none() {
        return "No employees found.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<ID_WIDTH$} | {:<NAME_WIDTH$} | {:>SALARY_WIDTH$}",
        "ID", "Name", "Salary"
    );
    let _ = writeln!(out, "{}", "-".repeat(ID_WIDTH + NAME_WIDTH + SALARY_WIDTH + 6));
    for (id, employee) in rows {
        let _ = writeln!(
            out,
            "{:<ID_WIDTH$} | {:<NAME_WIDTH$} | {:>SALARY_WIDTH$}",
            id,
            employee.name,
            format_money(employee.salary)
        );
    }
    out.trim_end().to_string()
}

/// Render a salary breakdown.
#[must_use]
pub fn salary_details(name: &str, period: Period, b: &SalaryBreakdown) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Salary details for {name} ({} {})",
        period.month_name(),
        period.year()
    );
    let _ = writeln!(out, "  Base monthly salary:  {}", format_money(b.base_salary));
    let _ = writeln!(out, "  Days present (full):  {}", b.days_present);
    let _ = writeln!(out, "  Half days:            {}", b.half_days);
    let _ = writeln!(
        out,
        "  Leaves ({}-day basis): {}",
        b.period_days, b.leaves
    );
    let _ = writeln!(
        out,
        "  Leave deduction:      {}",
        format_money(b.leave_deduction)
    );
    let _ = writeln!(
        out,
        "  Half-day deduction:   {}",
        format_money(b.half_day_deduction)
    );
    let _ = write!(out, "  Net salary payable:   {}", format_money(b.net_salary));
    if let Some(advisory) = b.advisory {
        let _ = write!(out, "\n  Warning: {advisory}");
    }
    out
}

/// Render the result of a bonus check.
#[must_use]
pub fn bonus_message(outcome: &BonusOutcome) -> String {
    match outcome {
        BonusOutcome::Awarded { bonus, new_salary } => format!(
            "Target achieved. A bonus of {} was added to the base monthly salary, which is now {}.",
            format_money(*bonus),
            format_money(*new_salary)
        ),
        BonusOutcome::TargetMissed { shortfall } => format!(
            "Sales fell short of the target by {}. No bonus this time; a sales training session is recommended.",
            format_money(*shortfall)
        ),
    }
}

/// Render the result of an update.
#[must_use]
pub fn update_message(outcome: UpdateOutcome) -> &'static str {
    match outcome {
        UpdateOutcome::Updated => "Employee updated.",
        UpdateOutcome::Unchanged => "No changes were made.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::Tally;
    use crate::payroll::compute_net_salary;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(12.5), "12.50");
        assert_eq!(format_money(1000.0), "1,000.00");
        assert_eq!(format_money(1_234_567.891), "1,234,567.89");
        assert_eq!(format_money(-2500.0), "-2,500.00");
        assert_eq!(format_money(-0.001), "0.00");
    }

    #[test]
    fn test_employee_table_empty() {
        assert_eq!(employee_table(Vec::new()), "No employees found.");
    }

    #[test]
    fn test_employee_table_rows() {
        let asha = Employee::new("Asha", 3000.0);
        let ravi = Employee::new("Ravi", 12_500.5);
        let table = employee_table(vec![("E1", &asha), ("E2", &ravi)]);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[2].contains("Asha"));
        assert!(lines[2].ends_with("3,000.00"));
        assert!(lines[3].ends_with("12,500.50"));
    }

    #[test]
    fn test_salary_details() {
        let b = compute_net_salary(3000.0, Tally::new(20, 4), 30);
        let text = salary_details("Asha", Period::new(2024, 10).unwrap(), &b);

        assert!(text.contains("Asha (October 2024)"));
        assert!(text.contains("Leaves (30-day basis): 6"));
        assert!(text.contains("600.00"));
        assert!(text.contains("200.00"));
        assert!(text.contains("2,200.00"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn test_salary_details_with_advisory() {
        let b = compute_net_salary(3000.0, Tally::new(31, 0), 30);
        let text = salary_details("Asha", Period::new(2024, 10).unwrap(), &b);
        assert!(text.contains("Warning"));
        assert!(text.contains("31"));
    }

    #[test]
    fn test_bonus_message() {
        let awarded = bonus_message(&BonusOutcome::Awarded {
            bonus: 50.0,
            new_salary: 1050.0,
        });
        assert!(awarded.contains("50.00"));
        assert!(awarded.contains("1,050.00"));

        let missed = bonus_message(&BonusOutcome::TargetMissed { shortfall: 50.0 });
        assert!(missed.contains("short"));
    }

    #[test]
    fn test_update_message() {
        assert_eq!(update_message(UpdateOutcome::Updated), "Employee updated.");
        assert_eq!(
            update_message(UpdateOutcome::Unchanged),
            "No changes were made."
        );
    }
}
