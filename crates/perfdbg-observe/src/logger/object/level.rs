use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// Filter used when neither `PERFDBG_LOG_LEVEL` nor the `level` key is set.
pub const DEFAULT_LEVEL: &str = "info";

/// `EnvFilter` expression taken from `PERFDBG_LOG_LEVEL` or the `level` config key.
///
/// Either a bare level applied to every target (`debug`) or directives per crate
/// (`perfdbg_exec=trace,warn`). Surrounding whitespace is dropped and the expression is
/// checked when parsed, so a held value always builds a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    /// Build the subscriber filter.
    pub fn to_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.0).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self(DEFAULT_LEVEL.to_string())
    }
}

impl fmt::Display for LoggerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        if expr.is_empty() {
            return Err(LoggerError::InvalidLevel("empty filter".into()));
        }
        EnvFilter::try_new(expr)
            .map(|_| Self(expr.to_string()))
            .map_err(|e| LoggerError::InvalidLevel(format!("{expr}: {e}")))
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LoggerLevel> for String {
    fn from(l: LoggerLevel) -> Self {
        l.0
    }
}
