//! Configuration management for staffbook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use chrono::{Datelike, Local};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::payroll::{DEFAULT_BONUS_RATE, DEFAULT_PERIOD_DAYS};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "staffbook";

/// Default data file name.
const DATA_FILE_NAME: &str = "employees.json";

/// Shared secret for the HR menu when none is configured.
const DEFAULT_ADMIN_SECRET: &str = "Huzaifa Kabir";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (`STAFFBOOK_<SECTION>__<KEY>`)
/// 2. TOML config file at `~/.config/staffbook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Payroll configuration.
    pub payroll: PayrollConfig,
    /// Attendance configuration.
    pub attendance: AttendanceConfig,
    /// Access configuration.
    pub access: AccessConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the data file.
    /// Defaults to `~/.local/share/staffbook/employees.json`
    pub data_file: Option<PathBuf>,
    /// Year given to month-name attendance labels in old data files.
    /// Defaults to the current year.
    pub legacy_year: Option<i32>,
}

/// Payroll-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Days in a pay period; the daily rate is salary divided by this.
    pub period_days: u32,
    /// Fraction of salary added when a sales target is met.
    pub bonus_rate: f64,
}

/// Attendance-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    /// Refuse a second entry for the same employee and date.
    pub reject_duplicate_dates: bool,
}

/// Access-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Shared secret required for the HR menu.
    pub admin_secret: String,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            period_days: DEFAULT_PERIOD_DAYS,
            bonus_rate: DEFAULT_BONUS_RATE,
        }
    }
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            reject_duplicate_dates: true,
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            admin_secret: DEFAULT_ADMIN_SECRET.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("STAFFBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.payroll.period_days == 0 {
            return Err(Error::ConfigValidation {
                message: "period_days must be greater than 0".to_string(),
            });
        }

        if !self.payroll.bonus_rate.is_finite() || self.payroll.bonus_rate < 0.0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "bonus_rate ({}) must be a non-negative number",
                    self.payroll.bonus_rate
                ),
            });
        }

        if self.access.admin_secret.is_empty() {
            return Err(Error::ConfigValidation {
                message: "admin_secret must not be empty".to_string(),
            });
        }

        if let Some(year) = self.storage.legacy_year {
            if !(1..=9999).contains(&year) {
                return Err(Error::ConfigValidation {
                    message: format!("legacy_year ({year}) must be between 1 and 9999"),
                });
            }
        }

        Ok(())
    }

    /// Get the data file path, resolving defaults if not set.
    #[must_use]
    pub fn data_file(&self) -> PathBuf {
        self.storage
            .data_file
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATA_FILE_NAME))
    }

    /// Get the year for month-name labels in old data files.
    #[must_use]
    pub fn legacy_year(&self) -> i32 {
        self.storage
            .legacy_year
            .unwrap_or_else(|| Local::now().year())
    }

    /// Check a secret entered for the HR menu.
    #[must_use]
    pub fn admin_secret_matches(&self, candidate: &str) -> bool {
        self.access.admin_secret == candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.data_file.is_none());
        assert!(config.storage.legacy_year.is_none());
        assert_eq!(config.payroll.period_days, 30);
        assert!((config.payroll.bonus_rate - 0.05).abs() < f64::EPSILON);
        assert!(config.attendance.reject_duplicate_dates);
        assert_eq!(config.access.admin_secret, DEFAULT_ADMIN_SECRET);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_period_days() {
        let mut config = Config::default();
        config.payroll.period_days = 0;

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("period_days"));
    }

    #[test]
    fn test_validate_negative_bonus_rate() {
        let mut config = Config::default();
        config.payroll.bonus_rate = -0.1;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bonus_rate"));
    }

    #[test]
    fn test_validate_empty_secret() {
        let mut config = Config::default();
        config.access.admin_secret = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("admin_secret"));
    }

    #[test]
    fn test_validate_legacy_year_range() {
        let mut config = Config::default();
        config.storage.legacy_year = Some(0);
        assert!(config.validate().is_err());

        config.storage.legacy_year = Some(2023);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_data_file_default() {
        let config = Config::default();
        let path = config.data_file();

        assert!(path.to_string_lossy().contains("employees.json"));
        assert!(path.to_string_lossy().contains("staffbook"));
    }

    #[test]
    fn test_data_file_custom() {
        let mut config = Config::default();
        config.storage.data_file = Some(PathBuf::from("/custom/path/staff.json"));

        assert_eq!(config.data_file(), PathBuf::from("/custom/path/staff.json"));
    }

    #[test]
    fn test_legacy_year_default_is_current_year() {
        let config = Config::default();
        assert_eq!(config.legacy_year(), Local::now().year());
    }

    #[test]
    fn test_legacy_year_custom() {
        let mut config = Config::default();
        config.storage.legacy_year = Some(2021);
        assert_eq!(config.legacy_year(), 2021);
    }

    #[test]
    fn test_admin_secret_matches() {
        let config = Config::default();
        assert!(config.admin_secret_matches(DEFAULT_ADMIN_SECRET));
        assert!(!config.admin_secret_matches("guess"));
        assert!(!config.admin_secret_matches(""));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("staffbook"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    /// Load a config inside a [`Jail`], surfacing errors as figment errors.
    fn load(path: &str) -> figment::error::Result<Config> {
        Config::load_from(Some(PathBuf::from(path))).map_err(|e| e.to_string().into())
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        Jail::expect_with(|_| {
            let config = load("/nonexistent/config.toml")?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[payroll]
period_days = 26
bonus_rate = 0.1

[attendance]
reject_duplicate_dates = false

[storage]
data_file = "/srv/staffbook/employees.json"
legacy_year = 2022

[access]
admin_secret = "s3cret"
"#,
            )?;

            let config = load("config.toml")?;
            assert_eq!(config.payroll.period_days, 26);
            assert!((config.payroll.bonus_rate - 0.1).abs() < f64::EPSILON);
            assert!(!config.attendance.reject_duplicate_dates);
            assert_eq!(
                config.data_file(),
                PathBuf::from("/srv/staffbook/employees.json")
            );
            assert_eq!(config.legacy_year(), 2022);
            assert!(config.admin_secret_matches("s3cret"));
            assert!(!config.admin_secret_matches(DEFAULT_ADMIN_SECRET));
            Ok(())
        });
    }

    #[test]
    fn test_load_partial_file_keeps_other_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[payroll]\nbonus_rate = 0.2\n")?;

            let config = load("config.toml")?;
            assert!((config.payroll.bonus_rate - 0.2).abs() < f64::EPSILON);
            assert_eq!(config.payroll.period_days, DEFAULT_PERIOD_DAYS);
            assert_eq!(config.access.admin_secret, DEFAULT_ADMIN_SECRET);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[payroll]\nperiod_days = 0\n")?;

            let result = Config::load_from(Some(PathBuf::from("config.toml")));
            assert!(matches!(result, Err(Error::ConfigValidation { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[payroll]\nperiod_days = 31\n\n[access]\nadmin_secret = \"from-file\"\n",
            )?;
            jail.set_env("STAFFBOOK_PAYROLL__PERIOD_DAYS", 26);
            jail.set_env("STAFFBOOK_ATTENDANCE__REJECT_DUPLICATE_DATES", "false");

            let config = load("config.toml")?;
            assert_eq!(config.payroll.period_days, 26);
            assert!(!config.attendance.reject_duplicate_dates);
            assert!(config.admin_secret_matches("from-file"));
            Ok(())
        });
    }

    #[test]
    fn test_env_without_file() {
        Jail::expect_with(|jail| {
            jail.set_env("STAFFBOOK_ACCESS__ADMIN_SECRET", "from-env");
            jail.set_env("STAFFBOOK_STORAGE__LEGACY_YEAR", 2019);

            let config = load("missing.toml")?;
            assert!(config.admin_secret_matches("from-env"));
            assert_eq!(config.legacy_year(), 2019);
            Ok(())
        });
    }

    #[test]
    fn test_payroll_config_deserialize() {
        let json = r#"{"period_days": 31}"#;
        let payroll: PayrollConfig = serde_json::from_str(json).unwrap();
        assert_eq!(payroll.period_days, 31);
        assert!((payroll.bonus_rate - DEFAULT_BONUS_RATE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("period_days"));
        assert!(json.contains("reject_duplicate_dates"));
    }
}
