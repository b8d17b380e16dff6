//! TOML configuration file loading
//!
//! Settings start from built-in defaults, are overlaid with the configuration
//! file key by key, and finally with command line arguments.
//!
//! ```toml
//! masters = ["olga"]
//! data-file = "~/salon.json"
//! slot-granularity-minutes = 30
//! proposal-grace-minutes = 15
//!
//! [schedule]
//! work-hours = "10-20"
//! break-hours = "13-14"
//! work-days = "mon,tue,wed,thu,fri,sat"
//!
//! [[service]]
//! name = "Classic manicure"
//! price = 1500
//! duration = 60
//! ```

use chrono::Duration;
use std::path::{Path, PathBuf};

use super::args::{split_ids, Args};
use super::error::{ConfigError, ConfigResult};
use crate::booking::api::{
    BookingResult, Catalog, HourRange, SchedulerConfig, WeeklyTemplate,
};
use crate::core::validation::{parse_hour_range, parse_weekdays};

pub const DEFAULT_EXPIRY_SWEEP_SECONDS: u64 = 30;
pub const DEFAULT_MASTER: &str = "master";

/// A catalog entry from the `[[service]]` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSeed {
    pub name: String,
    pub price: i64,
    pub duration: i64,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub masters: Vec<String>,
    pub user: Option<String>,
    pub data_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<PathBuf>,
    pub color: Option<bool>,
    pub scheduler: SchedulerConfig,
    pub expiry_sweep: std::time::Duration,
    pub template: WeeklyTemplate,
    /// `None` keeps the built-in catalog
    pub services: Option<Vec<ServiceSeed>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            masters: Vec::new(),
            user: None,
            data_file: None,
            log_level: None,
            log_format: None,
            log_file: None,
            color: None,
            scheduler: SchedulerConfig::default(),
            expiry_sweep: std::time::Duration::from_secs(DEFAULT_EXPIRY_SWEEP_SECONDS),
            template: WeeklyTemplate::default(),
            services: None,
        }
    }
}

/// `<config dir>/Salonbook/salonbook.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Salonbook").join("salonbook.toml"))
}

/// Expand a leading `~/` to the home directory
fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}

/// `none` and `-` switch an optional path off
fn optional_path(value: &str) -> Option<PathBuf> {
    if value.eq_ignore_ascii_case("none") || value == "-" {
        None
    } else {
        Some(expand_home(value))
    }
}

impl Settings {
    /// Resolve settings from defaults, the configuration file and `args`
    pub async fn resolve(args: &Args) -> ConfigResult<Self> {
        let mut settings = Self::default();
        if let Some(path) = Self::config_path(args.config_file.as_deref())? {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
            let config = toml::from_str::<toml::Table>(&contents).map_err(|source| {
                ConfigError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;
            settings.apply_toml_values(&config)?;
            log::debug!("Configuration loaded from {}", path.display());
        }
        settings.apply_args(args);
        if settings.masters.is_empty() {
            settings.masters.push(DEFAULT_MASTER.to_string());
        }
        Ok(settings)
    }

    /// An explicit file must exist; the default one is optional
    fn config_path(explicit: Option<&Path>) -> ConfigResult<Option<PathBuf>> {
        match explicit {
            Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(ConfigError::NotFound(path.to_path_buf())),
            None => Ok(default_config_path().filter(|p| p.exists())),
        }
    }

    /// Apply TOML configuration values
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> ConfigResult<()> {
        if let Some(value) = config.get("masters") {
            self.masters = split_ids(&string_list(value, "masters")?);
        }
        if let Some(user) = config.get("user").and_then(|v| v.as_str()) {
            self.user = Some(user.to_string());
        }
        if let Some(data_file) = config.get("data-file").and_then(|v| v.as_str()) {
            self.data_file = optional_path(data_file);
        }
        if let Some(color) = config.get("color").and_then(|v| v.as_bool()) {
            self.color = Some(color);
        }
        if let Some(no_color) = config.get("no-color").and_then(|v| v.as_bool()) {
            self.color = Some(!no_color);
        }
        if let Some(log_level) = config.get("log-level").and_then(|v| v.as_str()) {
            self.log_level = Some(log_level.to_string());
        }
        if let Some(log_file) = config.get("log-file").and_then(|v| v.as_str()) {
            self.log_file = optional_path(log_file);
        }
        if let Some(log_format) = config.get("log-format").and_then(|v| v.as_str()) {
            self.log_format = Some(log_format.to_string());
        }

        if let Some(minutes) = positive_integer(config, "slot-granularity-minutes")? {
            self.scheduler.slot_granularity_minutes = u32::try_from(minutes)
                .ok()
                .filter(|m| *m <= 24 * 60)
                .ok_or_else(|| ConfigError::invalid("slot-granularity-minutes", "longer than a day"))?;
        }
        if let Some(minutes) = positive_integer(config, "proposal-grace-minutes")? {
            self.scheduler.proposal_grace = Duration::minutes(minutes);
        }
        if let Some(seconds) = positive_integer(config, "input-timeout-seconds")? {
            self.scheduler.input_timeout = Duration::seconds(seconds);
        }
        if let Some(seconds) = positive_integer(config, "expiry-sweep-seconds")? {
            self.expiry_sweep = std::time::Duration::from_secs(seconds as u64);
        }

        if let Some(schedule) = config.get("schedule") {
            let schedule = schedule
                .as_table()
                .ok_or_else(|| ConfigError::invalid("schedule", "expected a table"))?;
            self.apply_schedule(schedule)?;
        }
        if let Some(services) = config.get("service") {
            self.services = Some(service_seeds(services)?);
        }
        Ok(())
    }

    fn apply_schedule(&mut self, schedule: &toml::Table) -> ConfigResult<()> {
        if let Some(value) = schedule.get("work-hours") {
            let text = value
                .as_str()
                .ok_or_else(|| ConfigError::invalid("work-hours", "expected a string like \"10-20\""))?;
            let (start, end) =
                parse_hour_range(text).map_err(|e| ConfigError::invalid("work-hours", e))?;
            self.template.work_hours = HourRange::new(start, end);
        }
        match schedule.get("break-hours") {
            None => {}
            Some(toml::Value::Boolean(false)) => self.template.break_hours = None,
            Some(toml::Value::String(text)) if text.eq_ignore_ascii_case("none") => {
                self.template.break_hours = None
            }
            Some(toml::Value::String(text)) => {
                let (start, end) =
                    parse_hour_range(text).map_err(|e| ConfigError::invalid("break-hours", e))?;
                self.template.break_hours = Some(HourRange::new(start, end));
            }
            Some(_) => {
                return Err(ConfigError::invalid(
                    "break-hours",
                    "expected a string like \"13-14\" or \"none\"",
                ))
            }
        }
        if let Some(value) = schedule.get("work-days") {
            let joined = string_list(value, "work-days")?.join(",");
            self.template.work_days =
                parse_weekdays(&joined).map_err(|e| ConfigError::invalid("work-days", e))?;
        }
        self.template
            .day_hours()
            .validate()
            .map_err(|e| ConfigError::invalid("schedule", e.to_string()))
    }

    /// Command line values take precedence over the file
    pub fn apply_args(&mut self, args: &Args) {
        let masters = args.master_ids();
        if !masters.is_empty() {
            self.masters = masters;
        }
        if let Some(user) = &args.user {
            self.user = Some(user.clone());
        }
        if let Some(data_file) = &args.data_file {
            self.data_file = optional_path(&data_file.to_string_lossy());
        }
        if let Some(level) = &args.log_level {
            self.log_level = Some(level.clone());
        }
        if let Some(format) = &args.log_format {
            self.log_format = Some(format.clone());
        }
        if let Some(file) = &args.log_file {
            self.log_file = optional_path(&file.to_string_lossy());
        }
        if let Some(color) = args.color_override() {
            self.color = Some(color);
        }
    }

    pub fn is_master(&self, user_id: &str) -> bool {
        self.masters.iter().any(|m| m == user_id)
    }

    /// Catalog seeded from the configuration, or the built-in services
    pub fn build_catalog(&self) -> BookingResult<Catalog> {
        match &self.services {
            None => Ok(Catalog::with_default_services()),
            Some(seeds) => {
                let catalog = Catalog::new();
                for seed in seeds {
                    catalog.add_service(&seed.name, seed.price, seed.duration)?;
                }
                Ok(catalog)
            }
        }
    }
}

/// A string or an array of strings
fn string_list(value: &toml::Value, key: &str) -> ConfigResult<Vec<String>> {
    if let Some(text) = value.as_str() {
        return Ok(vec![text.to_string()]);
    }
    value
        .as_array()
        .ok_or_else(|| ConfigError::invalid(key, "expected a string or an array of strings"))?
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ConfigError::invalid(key, "expected an array of strings"))
        })
        .collect()
}

fn positive_integer(config: &toml::Table, key: &str) -> ConfigResult<Option<i64>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => match value.as_integer() {
            Some(n) if n > 0 => Ok(Some(n)),
            _ => Err(ConfigError::invalid(key, "expected a positive integer")),
        },
    }
}

fn service_seeds(value: &toml::Value) -> ConfigResult<Vec<ServiceSeed>> {
    let entries = value
        .as_array()
        .ok_or_else(|| ConfigError::invalid("service", "expected [[service]] tables"))?;
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let key = format!("service[{}]", index);
            let table = entry
                .as_table()
                .ok_or_else(|| ConfigError::invalid(&key, "expected a table"))?;
            let name = table
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ConfigError::invalid(&key, "missing name"))?;
            let price = table
                .get("price")
                .and_then(|v| v.as_integer())
                .ok_or_else(|| ConfigError::invalid(&key, "missing integer price"))?;
            let duration = table
                .get("duration")
                .and_then(|v| v.as_integer())
                .ok_or_else(|| ConfigError::invalid(&key, "missing integer duration"))?;
            Ok(ServiceSeed {
                name: name.to_string(),
                price,
                duration,
            })
        })
        .collect()
}
