use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

use crate::logger::{
    error::{LoggerError, LoggerResult},
    object::{LoggerFormat, LoggerLevel, LoggerTimeZone},
};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "PERFDBG_LOG_FORMAT";

/// Environment variable with the filter expression.
pub const LOG_LEVEL_ENV: &str = "PERFDBG_LOG_LEVEL";

/// Environment variable selecting the timestamp timezone.
pub const LOG_TZ_ENV: &str = "PERFDBG_LOG_TZ";

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Log level filter expression (e.g., "info", "perfdbg_core=debug,info").
    pub level: LoggerLevel,
    /// Timezone for timestamps.
    pub tz: LoggerTimeZone,
    /// Whether to include module/target names in log output.
    pub with_targets: bool,
    /// Whether to use colored output.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Default configuration overlaid with `PERFDBG_LOG_FORMAT`, `PERFDBG_LOG_LEVEL` and `PERFDBG_LOG_TZ`.
    pub fn from_env() -> LoggerResult<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values provided by `lookup`; blank values are ignored.
    ///
    /// An invalid value is reported together with the variable it came from.
    pub fn overlay<F>(mut self, lookup: F) -> LoggerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let tag = |var: &'static str| move |e: LoggerError| LoggerError::Env {
            var,
            source: Box::new(e),
        };

        if let Some(format) = get(LOG_FORMAT_ENV) {
            self.format = format.parse().map_err(tag(LOG_FORMAT_ENV))?;
        }
        if let Some(level) = get(LOG_LEVEL_ENV) {
            self.level = level.parse().map_err(tag(LOG_LEVEL_ENV))?;
        }
        if let Some(tz) = get(LOG_TZ_ENV) {
            self.tz = tz.parse().map_err(tag(LOG_TZ_ENV))?;
        }
        Ok(self)
    }

    /// Determines whether colored output should be used.
    ///
    /// Color is enabled only if:
    /// 1. `use_color` config is `true` (user hasn't explicitly disabled it), AND
    /// 2. stdout is a terminal (not redirected to a file/pipe)
    ///
    /// # Examples
    /// ```rust
    /// use perfdbg_observe::LoggerConfig;
    ///
    /// let config = LoggerConfig::default();
    /// let should_use_color = config.should_use_color();
    /// // Returns true only if stdout is currently a terminal
    /// ```
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = LoggerConfig::default();

        assert_eq!(config.format, LoggerFormat::Text);
        assert_eq!(config.tz, LoggerTimeZone::Utc);
        assert_eq!(config.level.to_string(), "info");
        assert!(config.with_targets);
        assert!(config.use_color);
    }

    #[test]
    fn serde_uses_defaults_for_missing_fields() {
        let config: LoggerConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.level.to_string(), LoggerLevel::default().to_string());
        assert_eq!(config.format, LoggerFormat::default());
        assert_eq!(config.tz, LoggerTimeZone::default());
        assert!(config.with_targets);
        assert!(config.use_color);
    }

    #[test]
    fn partial_deserialization() {
        let json = r#"{"format": "json", "level": "perfdbg_core=debug,info", "tz": "Local"}"#;
        let config: LoggerConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.format, LoggerFormat::Json);
        assert_eq!(config.level.to_string(), "perfdbg_core=debug,info");
        assert_eq!(config.tz, LoggerTimeZone::Local);
        assert!(config.use_color);
    }

    #[test]
    fn overlay_applies_environment() {
        let config = LoggerConfig::default()
            .overlay(|key| match key {
                LOG_FORMAT_ENV => Some("json".into()),
                LOG_LEVEL_ENV => Some("perfdbg_exec=trace,warn".into()),
                LOG_TZ_ENV => Some(" ".into()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.format, LoggerFormat::Json);
        assert_eq!(config.level.to_string(), "perfdbg_exec=trace,warn");
        assert_eq!(config.tz, LoggerTimeZone::Utc);
    }

    #[test]
    fn overlay_names_the_bad_variable() {
        let err = LoggerConfig::default()
            .overlay(|key| (key == LOG_TZ_ENV).then(|| "mars".to_string()))
            .unwrap_err();

        assert!(matches!(err, LoggerError::Env { var: LOG_TZ_ENV, .. }));
        assert!(err.to_string().starts_with("PERFDBG_LOG_TZ: "));
    }
}
