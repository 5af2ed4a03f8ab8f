use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filter directive variable (standard `tracing-subscriber` name).
pub const FILTER_ENV: &str = "RUST_LOG";

/// Output format variable.
pub const FORMAT_ENV: &str = "BAZAAR_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown log format {0:?} (expected json, pretty or compact)")]
    UnknownLogFormat(String),
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(ConfigError::UnknownLogFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives, e.g. `info,bazaar_invoicing=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl ObservabilityConfig {
    /// Read `RUST_LOG` and `BAZAAR_LOG_FORMAT` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unset or blank variables fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let filter = non_blank(FILTER_ENV).unwrap_or_else(|| DEFAULT_FILTER.to_string());
        let format = match non_blank(FORMAT_ENV) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self { filter, format })
    }
}
