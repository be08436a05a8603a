//! Values accepted by [`crate::LoggerConfig`] and the `PERFDBG_LOG_*` variables.
mod format;
mod level;
mod rfc3339;
mod timezone;

pub use format::LoggerFormat;
pub use level::{DEFAULT_LEVEL, LoggerLevel};
pub(crate) use rfc3339::LoggerRfc3339;
pub use timezone::{LoggerTimeZone, init_local_offset};
