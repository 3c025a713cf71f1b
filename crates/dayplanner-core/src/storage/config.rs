//! TOML-based application configuration.
//!
//! Stores planner preferences:
//! - `[planner]` default start time, buffer and minimum gap
//! - `[session]` tick period and alert pattern
//! - `[workspace]` default workspace and the passcode table
//!
//! Configuration is stored at `~/.config/dayplanner/config.toml`.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::scheduler::SchedulerConfig;
use crate::session::AlertPattern;
use crate::task::parse_fixed_time;

/// Tables whose keys are user data rather than schema; `set` may add to them.
const OPEN_TABLES: &[&str] = &["workspace.passcodes"];

/// Scheduling defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// `HH:MM` the day starts at when none is given.
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: u32,
    #[serde(default = "default_min_gap_minutes")]
    pub min_gap_minutes: u32,
}

/// Session runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_true")]
    pub alert_enabled: bool,
    #[serde(default = "default_alert_pulses")]
    pub alert_pulses: u32,
    #[serde(default = "default_alert_spacing_ms")]
    pub alert_spacing_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Used when no workspace has been unlocked.
    #[serde(default)]
    pub default: String,
    /// Passcode to workspace id.
    #[serde(default)]
    pub passcodes: BTreeMap<String, String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/dayplanner/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

fn default_start_time() -> String {
    "09:00".into()
}
fn default_buffer_minutes() -> u32 {
    5
}
fn default_min_gap_minutes() -> u32 {
    10
}
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_true() -> bool {
    true
}
fn default_alert_pulses() -> u32 {
    3
}
fn default_alert_spacing_ms() -> u64 {
    300
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            buffer_minutes: default_buffer_minutes(),
            min_gap_minutes: default_min_gap_minutes(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            alert_enabled: true,
            alert_pulses: default_alert_pulses(),
            alert_spacing_ms: default_alert_spacing_ms(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        if key.is_empty() {
            return Err(unknown());
        }
        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;

        let new_value = match obj.get(leaf) {
            Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            Some(serde_json::Value::Number(_)) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
            Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            Some(_) => serde_json::Value::String(value.into()),
            None if parent_path.is_some_and(|p| OPEN_TABLES.contains(&p)) => {
                serde_json::Value::String(value.into())
            }
            None => return Err(unknown()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing the defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds invalid values, or if the default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Change a value by dot-separated key without touching disk.
    ///
    /// The config is left unchanged if the key is unknown or the result
    /// would not validate.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.start_time()?;
        if self.session.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// `[planner].start_time` parsed.
    pub fn start_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_fixed_time(&self.planner.start_time).map_err(|e| ConfigError::InvalidValue {
            key: "planner.start_time".into(),
            message: e.to_string(),
        })
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            buffer_minutes: i64::from(self.planner.buffer_minutes),
            min_gap_minutes: i64::from(self.planner.min_gap_minutes),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.session.tick_interval_ms)
    }

    pub fn alert_pattern(&self) -> AlertPattern {
        AlertPattern {
            pulses: self.session.alert_pulses,
            spacing: Duration::from_millis(self.session.alert_spacing_ms),
        }
    }
}
