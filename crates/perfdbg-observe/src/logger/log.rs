use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{
    config::LoggerConfig,
    error::{LoggerError, LoggerResult},
    object::LoggerRfc3339,
};

/// Initializes text logger.
pub fn logger_text(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter();
    let fmt_layer = fmt::layer()
        .with_ansi(use_ansi(cfg))
        .with_target(cfg.with_targets)
        .with_thread_names(true)
        .with_timer(LoggerRfc3339::new(cfg.tz));

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    init_subscriber(subscriber)
}

/// Initializes JSON (structured) logger.
pub fn logger_json(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter();
    let fmt_layer = fmt::layer()
        .json()
        .with_ansi(use_ansi(cfg))
        .with_target(cfg.with_targets)
        .with_thread_names(true)
        .with_timer(LoggerRfc3339::new(cfg.tz));

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    init_subscriber(subscriber)
}

/// Initializes journald logger (Linux only).
#[cfg(target_os = "linux")]
pub fn logger_journald(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter();
    let journald = tracing_journald::layer()
        .map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))?
        .with_syslog_identifier("perfdbg".to_string());

    let subscriber = tracing_subscriber::registry().with(filter).with(journald);
    init_subscriber(subscriber)
}

/// Stub for journald on non-Linux platforms.
#[cfg(not(target_os = "linux"))]
pub fn logger_journald(_cfg: &LoggerConfig) -> LoggerResult<()> {
    Err(LoggerError::JournaldNotSupported)
}

/// Escape codes only make sense for text written to a terminal.
fn use_ansi(cfg: &LoggerConfig) -> bool {
    !cfg.format.is_structured() && cfg.should_use_color()
}

/// Installs the subscriber as the global default.
fn init_subscriber<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::object::LoggerFormat;

    #[test]
    fn json_never_uses_ansi() {
        let config = LoggerConfig {
            format: LoggerFormat::Json,
            use_color: true,
            ..Default::default()
        };
        assert!(!use_ansi(&config));
    }

    #[test]
    fn text_respects_use_color() {
        let config = LoggerConfig {
            format: LoggerFormat::Text,
            use_color: false,
            ..Default::default()
        };
        assert!(!use_ansi(&config));
    }

    #[test]
    fn second_init_is_rejected() {
        let config = LoggerConfig {
            use_color: false,
            ..Default::default()
        };

        // the first call may lose against another test installing a subscriber
        let _ = logger_text(&config);
        assert!(matches!(
            logger_json(&config),
            Err(LoggerError::AlreadyInitialized)
        ));
    }

    #[test]
    #[cfg(not(target_os = "linux"))]
    fn init_journald_returns_error_when_not_supported() {
        let config = LoggerConfig {
            format: LoggerFormat::Journald,
            ..Default::default()
        };

        let result = logger_journald(&config);
        assert!(matches!(result, Err(LoggerError::JournaldNotSupported)));
    }
}
