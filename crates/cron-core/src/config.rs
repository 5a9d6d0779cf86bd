use std::{collections::HashMap, fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use cron_model::{RunRecord, metric_prefix};

use crate::ConfigError;

/// Default deadline: 24 hours.
pub const DEFAULT_TIMEOUT_SECS: u64 = 86_400;

/// Default directory scraped by the node_exporter textfile collector.
pub const DEFAULT_METRICS_DIR: &str = "/var/lib/node_exporter/textfile_collector";

const ENV_TIMEOUT: &str = "CRON_TIMEOUT";
const ENV_NAMESPACE: &str = "CRON_NAMESPACE";
const ENV_DRYRUN: &str = "CRON_DRYRUN";
const ENV_METRICS: &str = "CRON_METRICS";
const ENV_METRICS_PREFIX: &str = "CRON_METRICS_PREFIX";
const ENV_METRICS_DIR: &str = "CRON_METRICS_DIR";
const ENV_EXIT_CODE_POLICY: &str = "CRON_EXIT_CODE_POLICY";

const ENV_KEYS: [&str; 7] = [
    ENV_TIMEOUT,
    ENV_NAMESPACE,
    ENV_DRYRUN,
    ENV_METRICS,
    ENV_METRICS_PREFIX,
    ENV_METRICS_DIR,
    ENV_EXIT_CODE_POLICY,
];

/// What this program's own exit status should be after a finalized run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitCodePolicy {
    /// Always exit 0; the outcome is only visible through metrics.
    #[default]
    Zero,
    /// Exit with the child's exit code (out-of-range codes become 1).
    Mirror,
}

impl ExitCodePolicy {
    pub fn process_code(self, record: &RunRecord) -> u8 {
        match self {
            ExitCodePolicy::Zero => 0,
            ExitCodePolicy::Mirror => record.exit_code().as_process_code(),
        }
    }
}

impl FromStr for ExitCodePolicy {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "mirror" => Ok(Self::Mirror),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_EXIT_CODE_POLICY,
                value: s.to_string(),
                expected: "zero|mirror",
            }),
        }
    }
}

impl fmt::Display for ExitCodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExitCodePolicy::Zero => "zero",
            ExitCodePolicy::Mirror => "mirror",
        })
    }
}

/// Immutable runner configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Wall-clock deadline for the command.
    pub timeout: Duration,
    /// Namespace override; empty means "derive from the command".
    pub namespace: String,
    /// Print what would run instead of running it.
    pub dry_run: bool,
    /// Write the metrics file after the run.
    pub metrics_enabled: bool,
    /// Raw metric-name prefix, checked and normalized by [`cron_model::metric_prefix`].
    pub metrics_prefix: Option<String>,
    /// Directory the `.prom` file is written to.
    pub metrics_dir: PathBuf,
    pub exit_code_policy: ExitCodePolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            namespace: String::new(),
            dry_run: false,
            metrics_enabled: true,
            metrics_prefix: None,
            metrics_dir: PathBuf::from(DEFAULT_METRICS_DIR),
            exit_code_policy: ExitCodePolicy::default(),
        }
    }
}

impl RunnerConfig {
    /// Read the `CRON_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let envs: HashMap<String, String> = ENV_KEYS
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self::from_env_map(&envs)
    }

    /// Build from an explicit key/value map; unset or blank keys keep their defaults.
    pub fn from_env_map(envs: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            envs.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let mut cfg = Self::default();
        if let Some(v) = get(ENV_TIMEOUT) {
            cfg.timeout = Duration::from_secs(parse_secs(ENV_TIMEOUT, v)?);
        }
        if let Some(v) = get(ENV_NAMESPACE) {
            cfg.namespace = v.to_string();
        }
        if let Some(v) = get(ENV_DRYRUN) {
            cfg.dry_run = parse_bool(ENV_DRYRUN, v)?;
        }
        if let Some(v) = get(ENV_METRICS) {
            cfg.metrics_enabled = parse_bool(ENV_METRICS, v)?;
        }
        if let Some(v) = get(ENV_METRICS_PREFIX) {
            metric_prefix(Some(v)).map_err(|_| ConfigError::InvalidValue {
                key: ENV_METRICS_PREFIX,
                value: v.to_string(),
                expected: "[a-zA-Z_:][a-zA-Z0-9_:]*",
            })?;
            cfg.metrics_prefix = Some(v.to_string());
        }
        if let Some(v) = get(ENV_METRICS_DIR) {
            cfg.metrics_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_EXIT_CODE_POLICY) {
            cfg.exit_code_policy = v.parse()?;
        }
        Ok(cfg)
    }
}

fn parse_secs(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidInteger {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}
