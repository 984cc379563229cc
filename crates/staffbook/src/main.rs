//! `staffbook` - CLI for employee attendance and payroll records
//!
//! Without a command this starts the interactive menu; the subcommands run
//! one operation against the data file and exit.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;

use staffbook::cli::menu::{run_session, TerminalPrompter};
use staffbook::cli::render;
use staffbook::cli::{
    AttendanceCommand, BonusCommand, Cli, Command, ConfigCommand, EmployeeCommand, SalaryCommand,
};
use staffbook::employee::{parse_date, Period};
use staffbook::{init_logging, Config, Store, StoreOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Config commands never touch the data file
    if let Some(Command::Config(config_cmd)) = cli.command {
        return handle_config(&config, config_cmd);
    }

    let data_file = cli.data_file.clone().unwrap_or_else(|| config.data_file());
    let mut store = Store::open(&data_file, StoreOptions::from(&config))
        .with_context(|| format!("failed to open data file {}", data_file.display()))?;

    match cli.command {
        None | Some(Command::Menu) => {
            let today = Local::now().date_naive();
            run_session(&mut store, &config, &mut TerminalPrompter, today)?;
            Ok(())
        }
        Some(Command::Employee(cmd)) => handle_employee(&mut store, cmd),
        Some(Command::Attendance(cmd)) => handle_attendance(&mut store, &cmd),
        Some(Command::Salary(cmd)) => handle_salary(&store, &cmd),
        Some(Command::Bonus(cmd)) => handle_bonus(&mut store, &cmd),
        Some(Command::Config(_)) => Ok(()),
    }
}

fn handle_employee(store: &mut Store, cmd: EmployeeCommand) -> Result<()> {
    match cmd {
        EmployeeCommand::Add { id, name, salary } => {
            store.create(&id, &name, salary)?;
            println!("Employee {} added.", id.trim());
        }
        EmployeeCommand::List { json } => {
            if json {
                let employees: std::collections::BTreeMap<_, _> = store.list().collect();
                println!("{}", serde_json::to_string_pretty(&employees)?);
            } else {
                println!("{}", render::employee_table(store.list()));
            }
        }
        EmployeeCommand::Remove { id } => {
            let removed = store.delete(&id)?;
            println!("Employee {} ({id}) removed.", removed.name);
        }
        EmployeeCommand::Update { id, name, salary } => {
            let outcome = store.update(&id, name.as_deref(), salary)?;
            println!("{}", render::update_message(outcome));
        }
    }
    Ok(())
}

fn handle_attendance(store: &mut Store, cmd: &AttendanceCommand) -> Result<()> {
    let date = parse_date(&cmd.date)?;
    let status = cmd.status.into();

    if cmd.show_salary {
        let (period, breakdown) = store.record_attendance_and_compute(&cmd.id, date, status)?;
        println!("Attendance for {date} recorded ({status}).");
        let name = store.get(&cmd.id).map_or(cmd.id.as_str(), |e| e.name.as_str());
        println!("{}", render::salary_details(name, period, &breakdown));
    } else {
        store.record_attendance(&cmd.id, date, status)?;
        println!("Attendance for {date} recorded ({status}).");
    }
    Ok(())
}

fn handle_salary(store: &Store, cmd: &SalaryCommand) -> Result<()> {
    let period = Period::parse_label(&cmd.period, Local::now().year())?;
    let breakdown = store.salary_for(&cmd.id, period)?;

    if cmd.json {
        let report = serde_json::json!({
            "id": cmd.id,
            "period": period,
            "breakdown": breakdown,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let name = store.get(&cmd.id).map_or(cmd.id.as_str(), |e| e.name.as_str());
        println!("{}", render::salary_details(name, period, &breakdown));
    }
    Ok(())
}

fn handle_bonus(store: &mut Store, cmd: &BonusCommand) -> Result<()> {
    let outcome = store.award_bonus_if_target_met(&cmd.id, cmd.target, cmd.achieved)?;
    println!("{}", render::bonus_message(&outcome));
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let mut shown = config.clone();
            shown.access.admin_secret = "********".to_string();

            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data file:          {}", shown.data_file().display());
                println!("  Legacy year:        {}", shown.legacy_year());
                println!();
                println!("[Payroll]");
                println!("  Period days:        {}", shown.payroll.period_days);
                println!("  Bonus rate:         {}", shown.payroll.bonus_rate);
                println!();
                println!("[Attendance]");
                println!(
                    "  Reject duplicates:  {}",
                    shown.attendance.reject_duplicate_dates
                );
                println!();
                println!("[Access]");
                println!("  Admin secret:       {}", shown.access.admin_secret);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
