//! Interactive menu session.
//!
//! A session starts with a role choice. The HR role is gated by the shared
//! secret from configuration and gets the full record-keeping menu; the
//! employee role only needs an existing id and may enter its own
//! attendance. All terminal I/O goes through [`Prompter`], so a session can
//! be driven by a script in tests.

use chrono::{Datelike, NaiveDate};
use dialoguer::{Input, Password, Select};
use tracing::{info, warn};

use crate::config::Config;
use crate::employee::{parse_amount, parse_date, AttendanceStatus, Period};
use crate::error::{Error, Result};
use crate::payroll::SalaryBreakdown;
use crate::storage::Store;

use super::render;

/// Source of user answers and sink for messages.
pub trait Prompter {
    /// Let the user pick one of `items`, returning its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize>;

    /// Read a line of text. Empty answers are allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Read a line of text without echoing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn secret(&mut self, prompt: &str) -> Result<String>;

    /// Show a message.
    fn say(&mut self, message: &str);
}

/// [`Prompter`] backed by the real terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize> {
        Ok(Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?)
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        Ok(Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    }

    fn secret(&mut self, prompt: &str) -> Result<String> {
        Ok(Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?)
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}

const ROLES: [&str; 3] = ["Human Resources", "Employee", "Exit"];

const HR_ACTIONS: [&str; 9] = [
    "Add employee",
    "View employees",
    "Delete employee",
    "Update employee",
    "Enter attendance",
    "Calculate salary",
    "Enter attendance and calculate salary",
    "Check sales target & apply bonus",
    "Exit",
];

const EMPLOYEE_ACTIONS: [&str; 2] = ["Enter attendance for a date", "Log out"];

/// Run one interactive session until the user exits.
///
/// `today` is the date used when an employee leaves the date blank.
///
/// # Errors
///
/// Returns an error only if the terminal cannot be read. Failures of
/// individual operations are shown to the user and the menu continues.
pub fn run_session(
    store: &mut Store,
    config: &Config,
    prompter: &mut dyn Prompter,
    today: NaiveDate,
) -> Result<()> {
    let mut session = Session {
        store,
        config,
        prompter,
        today,
    };
    session.run()
}

struct Session<'a> {
    store: &'a mut Store,
    config: &'a Config,
    prompter: &'a mut dyn Prompter,
    today: NaiveDate,
}

impl Session<'_> {
    fn run(&mut self) -> Result<()> {
        self.prompter.say("Welcome to staffbook.");
        match self.prompter.select("Select your department", &ROLES)? {
            0 => {
                let secret = self.prompter.secret("HR password")?;
                if self.config.admin_secret_matches(&secret) {
                    info!("HR session started");
                    self.prompter.say("Welcome to the HR system.");
                    self.hr_menu()
                } else {
                    warn!("Rejected HR login");
                    self.prompter.say("Invalid password. Access denied.");
                    Ok(())
                }
            }
            1 => {
                let id = self.prompter.input("Employee ID")?;
                let id = id.trim();
                match self.store.get(id) {
                    Some(employee) => {
                        let greeting = format!("Welcome, {}.", employee.name);
                        info!(employee = %id, "Employee session started");
                        self.prompter.say(&greeting);
                        self.employee_menu(id)
                    }
                    None => {
                        self.prompter.say("Employee ID not found.");
                        Ok(())
                    }
                }
            }
            _ => {
                self.prompter.say("Goodbye.");
                Ok(())
            }
        }
    }

    fn hr_menu(&mut self) -> Result<()> {
        loop {
            let result = match self.prompter.select("Choose an action", &HR_ACTIONS)? {
                0 => self.add_employee(),
                1 => {
                    self.view_employees();
                    Ok(())
                }
                2 => self.delete_employee(),
                3 => self.update_employee(),
                4 => self.enter_attendance(),
                5 => self.calculate_salary(),
                6 => self.enter_attendance_and_salary(),
                7 => self.sales_target(),
                _ => {
                    self.prompter.say("Goodbye.");
                    return Ok(());
                }
            };
            self.settle(result)?;
        }
    }

    fn employee_menu(&mut self, id: &str) -> Result<()> {
        loop {
            let result = match self.prompter.select("Choose an action", &EMPLOYEE_ACTIONS)? {
                0 => self.enter_own_attendance(id),
                _ => {
                    self.prompter.say("Logging out.");
                    return Ok(());
                }
            };
            self.settle(result)?;
        }
    }

    /// Show an operation failure and keep going, unless the terminal itself
    /// failed.
    fn settle(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e @ Error::Prompt(_)) => Err(e),
            Err(e) => {
                if !e.is_user_error() {
                    warn!("Operation failed: {e}");
                }
                self.prompter.say(&format!("Error: {e}"));
                Ok(())
            }
        }
    }

    /// Ask for an id and fail early if nobody has it.
    fn existing_id(&mut self) -> Result<String> {
        let id = self.prompter.input("Employee ID")?.trim().to_string();
        if self.store.contains(&id) {
            Ok(id)
        } else {
            Err(Error::not_found(id))
        }
    }

    fn read_status(&mut self) -> Result<AttendanceStatus> {
        self.prompter
            .input("Attendance status (P for present, H for half day)")?
            .parse()
    }

    fn add_employee(&mut self) -> Result<()> {
        let id = self.prompter.input("Employee ID")?.trim().to_string();
        if self.store.contains(&id) {
            return Err(Error::duplicate_id(id));
        }
        let name = self.prompter.input("Name")?;
        let salary = parse_amount(&self.prompter.input("Monthly salary")?, "salary")?;

        self.store.create(&id, &name, salary)?;
        self.prompter.say("Employee added.");
        Ok(())
    }

    fn view_employees(&mut self) {
        let table = render::employee_table(self.store.list());
        self.prompter.say(&table);
    }

    fn delete_employee(&mut self) -> Result<()> {
        let id = self.prompter.input("Employee ID to delete")?;
        let removed = self.store.delete(id.trim())?;
        self.prompter
            .say(&format!("Employee {} deleted.", removed.name));
        self.view_employees();
        Ok(())
    }

    fn update_employee(&mut self) -> Result<()> {
        let id = self.existing_id()?;
        if let Some(employee) = self.store.get(&id) {
            let current = format!(
                "Current details: name '{}', salary {}",
                employee.name,
                render::format_money(employee.salary)
            );
            self.prompter.say(&current);
        }

        let name = self.prompter.input("New name (blank to keep)")?;
        let salary = self.prompter.input("New salary (blank to keep)")?;
        let salary = match salary.trim() {
            "" => None,
            s => Some(parse_amount(s, "salary")?),
        };

        let outcome = self.store.update(&id, Some(&name), salary)?;
        self.prompter.say(render::update_message(outcome));
        Ok(())
    }

    fn enter_attendance(&mut self) -> Result<()> {
        let id = self.existing_id()?;
        let date = parse_date(&self.prompter.input("Date (YYYY-MM-DD)")?)?;
        let status = self.read_status()?;

        self.store.record_attendance(&id, date, status)?;
        self.confirm_attendance(&id, date);
        Ok(())
    }

    fn calculate_salary(&mut self) -> Result<()> {
        let id = self.existing_id()?;
        let label = self
            .prompter
            .input("Month (YYYY-MM, or a month name for this year)")?;
        let period = Period::parse_label(&label, self.today.year())?;

        let breakdown = self.store.salary_for(&id, period)?;
        self.show_salary(&id, period, &breakdown);
        Ok(())
    }

    fn enter_attendance_and_salary(&mut self) -> Result<()> {
        let id = self.existing_id()?;
        let date = parse_date(&self.prompter.input("Date (YYYY-MM-DD)")?)?;
        let status = self.read_status()?;

        let (period, breakdown) = self
            .store
            .record_attendance_and_compute(&id, date, status)?;
        self.confirm_attendance(&id, date);
        self.show_salary(&id, period, &breakdown);
        Ok(())
    }

    fn sales_target(&mut self) -> Result<()> {
        let id = self.existing_id()?;
        let target = parse_amount(&self.prompter.input("Sales target")?, "sales target")?;
        let achieved = parse_amount(&self.prompter.input("Achieved sales")?, "achieved sales")?;

        let outcome = self.store.award_bonus_if_target_met(&id, target, achieved)?;
        self.prompter.say(&render::bonus_message(&outcome));
        Ok(())
    }

    fn enter_own_attendance(&mut self, id: &str) -> Result<()> {
        let input = self.prompter.input("Date (YYYY-MM-DD, blank for today)")?;
        let date = if input.trim().is_empty() {
            self.today
        } else {
            parse_date(&input)?
        };
        let status = self.read_status()?;

        self.store.record_attendance(id, date, status)?;
        self.confirm_attendance(id, date);
        Ok(())
    }

    fn confirm_attendance(&mut self, id: &str, date: NaiveDate) {
        let name = self.store.get(id).map_or(id, |e| e.name.as_str());
        let message = format!("Attendance for {date} recorded for {name}.");
        self.prompter.say(&message);
    }

    fn show_salary(&mut self, id: &str, period: Period, breakdown: &SalaryBreakdown) {
        let name = self.store.get(id).map_or(id, |e| e.name.as_str());
        let details = render::salary_details(name, period, breakdown);
        self.prompter.say(&details);
    }
}
