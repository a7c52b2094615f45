//! Configuration loading for Cutoff.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults (20 records, 10s deadline, 1s write, 2s update)
//! 2. `~/.cutoff/config.toml`, or the file named by `CUTOFF_CONFIG`
//! 3. `CUTOFF_*` environment variables
//!
//! ```toml
//! [batch]
//! records = 20
//! deadline_ms = 10000
//!
//! [operations]
//! write_ms = 1000
//! update_ms = 2000
//!
//! [output]
//! path = "records.out"
//! format = "json"
//! ```
//!
//! Raw values are signed so that negative numbers are reported as configuration
//! errors instead of failing deep inside TOML deserialization.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "CUTOFF_CONFIG";

const DEFAULT_RECORDS: i64 = 20;
const DEFAULT_DEADLINE_MS: i64 = 10_000;
const DEFAULT_WRITE_MS: i64 = 1_000;
const DEFAULT_UPDATE_MS: i64 = 2_000;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CutoffConfig {
    pub batch: Option<BatchConfig>,
    pub operations: Option<OperationsConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    pub records: Option<i64>,
    pub deadline_ms: Option<i64>,
}

/// Nominal durations of the per-record operations.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationsConfig {
    pub write_ms: Option<i64>,
    pub update_ms: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// File the write operation appends records to. Unset means log only.
    pub path: Option<PathBuf>,
    pub format: Option<ReportFormat>,
}

/// How the final batch report is printed.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{var}={value:?} is not a valid value")]
    InvalidEnv { var: &'static str, value: String },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: i64 },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
}

impl ConfigError {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => {
                Some(path.as_path())
            }
            _ => None,
        }
    }
}

impl CutoffConfig {
    /// Load the config file from its default location. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }
}

/// `$CUTOFF_CONFIG` if set, otherwise `~/.cutoff/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(explicit) = env::var(CONFIG_PATH_ENV)
        && !explicit.trim().is_empty()
    {
        return Some(PathBuf::from(explicit));
    }
    dirs::home_dir().map(|home| home.join(".cutoff").join("config.toml"))
}

/// Raw `CUTOFF_*` environment values, captured once.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub records: Option<String>,
    pub deadline_ms: Option<String>,
    pub write_ms: Option<String>,
    pub update_ms: Option<String>,
    pub output: Option<String>,
    pub format: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        Self {
            records: get("CUTOFF_RECORDS"),
            deadline_ms: get("CUTOFF_DEADLINE_MS"),
            write_ms: get("CUTOFF_WRITE_MS"),
            update_ms: get("CUTOFF_UPDATE_MS"),
            output: get("CUTOFF_OUTPUT"),
            format: get("CUTOFF_FORMAT"),
        }
    }
}

/// Fully resolved, validated settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub records: usize,
    pub deadline: Duration,
    pub write: Duration,
    pub update: Duration,
    pub output_path: Option<PathBuf>,
    pub format: ReportFormat,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            records: DEFAULT_RECORDS as usize,
            deadline: Duration::from_millis(DEFAULT_DEADLINE_MS as u64),
            write: Duration::from_millis(DEFAULT_WRITE_MS as u64),
            update: Duration::from_millis(DEFAULT_UPDATE_MS as u64),
            output_path: None,
            format: ReportFormat::Text,
        }
    }
}

impl BatchSettings {
    /// Merge defaults, the optional config file, and environment overrides, then validate.
    pub fn resolve(
        config: Option<&CutoffConfig>,
        env: &EnvOverrides,
    ) -> Result<Self, ConfigError> {
        let batch = config.and_then(|c| c.batch.as_ref());
        let operations = config.and_then(|c| c.operations.as_ref());
        let output = config.and_then(|c| c.output.as_ref());

        let records = pick(
            "CUTOFF_RECORDS",
            env.records.as_deref(),
            batch.and_then(|b| b.records),
            DEFAULT_RECORDS,
        )?;
        let deadline_ms = pick(
            "CUTOFF_DEADLINE_MS",
            env.deadline_ms.as_deref(),
            batch.and_then(|b| b.deadline_ms),
            DEFAULT_DEADLINE_MS,
        )?;
        let write_ms = pick(
            "CUTOFF_WRITE_MS",
            env.write_ms.as_deref(),
            operations.and_then(|o| o.write_ms),
            DEFAULT_WRITE_MS,
        )?;
        let update_ms = pick(
            "CUTOFF_UPDATE_MS",
            env.update_ms.as_deref(),
            operations.and_then(|o| o.update_ms),
            DEFAULT_UPDATE_MS,
        )?;

        let format = match env.format.as_deref() {
            Some(raw) => raw.parse().map_err(|()| ConfigError::InvalidEnv {
                var: "CUTOFF_FORMAT",
                value: raw.to_string(),
            })?,
            None => output.and_then(|o| o.format).unwrap_or_default(),
        };
        let output_path = env
            .output
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| output.and_then(|o| o.path.clone()));

        let deadline_ms = non_negative("batch.deadline_ms", deadline_ms)?;
        if deadline_ms == 0 {
            return Err(ConfigError::NotPositive {
                field: "batch.deadline_ms",
            });
        }

        Ok(Self {
            records: non_negative("batch.records", records)? as usize,
            deadline: Duration::from_millis(deadline_ms),
            write: Duration::from_millis(non_negative("operations.write_ms", write_ms)?),
            update: Duration::from_millis(non_negative("operations.update_ms", update_ms)?),
            output_path,
            format,
        })
    }

    /// Load the default config file, apply the process environment, and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let config = CutoffConfig::load()?;
        Self::resolve(config.as_ref(), &EnvOverrides::from_env())
    }
}

fn pick(
    var: &'static str,
    env_value: Option<&str>,
    file_value: Option<i64>,
    default: i64,
) -> Result<i64, ConfigError> {
    match env_value {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidEnv {
                var,
                value: raw.to_string(),
            }),
        None => Ok(file_value.unwrap_or(default)),
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u64, ConfigError> {
    u64::try_from(value).map_err(|_| ConfigError::Negative { field, value })
}
