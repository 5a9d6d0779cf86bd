use std::collections::HashMap;
use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::error::LoggerError;
use crate::logger::object::{LoggerFormat, LoggerLevel, LoggerTimeZone};

const ENV_FORMAT: &str = "CRON_LOG_FORMAT";
const ENV_LEVEL: &str = "CRON_LOG_LEVEL";
const ENV_TZ: &str = "CRON_LOG_TZ";

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Filter expression (e.g. `"warn"`, `"cron_core=debug,warn"`).
    pub level: LoggerLevel,
    /// Timezone for timestamps.
    pub tz: LoggerTimeZone,
    /// Include module/target names in log lines.
    pub with_targets: bool,
    /// Colored output, only honored when stderr is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: false,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Reads `CRON_LOG_FORMAT`, `CRON_LOG_LEVEL` and `CRON_LOG_TZ`.
    ///
    /// Unset or blank variables keep their defaults.
    pub fn from_env() -> Result<Self, LoggerError> {
        let envs: HashMap<String, String> = [ENV_FORMAT, ENV_LEVEL, ENV_TZ]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self::from_env_map(&envs)
    }

    pub fn from_env_map(envs: &HashMap<String, String>) -> Result<Self, LoggerError> {
        let get = |key: &str| {
            envs.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let mut cfg = Self::default();
        if let Some(format) = get(ENV_FORMAT) {
            cfg.format = format.parse()?;
        }
        if let Some(level) = get(ENV_LEVEL) {
            cfg.level = level.parse()?;
        }
        if let Some(tz) = get(ENV_TZ) {
            cfg.tz = tz.parse()?;
        }
        Ok(cfg)
    }

    /// Whether colored output should be used.
    ///
    /// True only when `use_color` is set and stderr (where logs go) is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stderr().is_terminal()
    }
}
