mod config;
mod error;
mod log;
mod object;

pub use config::{LOG_FORMAT_ENV, LOG_LEVEL_ENV, LOG_TZ_ENV, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use object::LoggerFormat;
pub use object::{DEFAULT_LEVEL, LoggerLevel};
pub use object::{LoggerTimeZone, init_local_offset};

/// Initializes the global tracing subscriber with the given configuration.
///
/// This function configures and installs a tracing subscriber based on the provided [`LoggerConfig`].
/// Once initialized, all `tracing` macros (`info!`, `debug!`, etc.) will use this configuration.
///
/// # Important: Local Timezone
/// For using `LoggerTimeZone::Local`, you **must** call [`init_local_offset`]
/// in `main()` function before spawning any threads.
///
/// # Examples
/// ```rust
/// use perfdbg_observe::{LoggerConfig, init_logger};
///
/// fn main() {
///     let config = LoggerConfig::default();
///     init_logger(&config).expect("Failed to initialize logger");
///
///     tracing::info!("Logger initialized successfully");
/// }
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg),
        LoggerFormat::Json => log::logger_json(cfg),
        LoggerFormat::Journald => log::logger_journald(cfg),
    }
}
