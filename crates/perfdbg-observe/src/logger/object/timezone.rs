use std::{fmt, str::FromStr, sync::{RwLock, OnceLock}};

use serde::{Deserialize, Serialize, Serializer};
use time::UtcOffset;

use crate::logger::error::LoggerError;

/// Global cache for the local UTC offset.
///
/// Written by [`init_local_offset`] on startup or lazily on first use.
static LOCAL_OFFSET: RwLock<UtcOffset> = RwLock::new(UtcOffset::UTC);

/// Tracks whether local offset initialization has been attempted.
///
/// Set after the first detection attempt or an explicit [`init_local_offset`].
static INIT_DONE: OnceLock<()> = OnceLock::new();

/// Timezone configuration for log timestamps.
///
/// - `Utc`: All timestamps in UTC (always works, default)
/// - `Local`: Uses system timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerTimeZone {
    /// UTC timezone.
    Utc,
    /// Local system timezone.
    Local,
}

impl Default for LoggerTimeZone {
    fn default() -> Self {
        Self::Utc
    }
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = s.trim().to_ascii_lowercase();

        match normalize.as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoggerTimeZone::Utc => "utc",
            LoggerTimeZone::Local => "local",
        };
        f.write_str(s)
    }
}

impl Serialize for LoggerTimeZone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LoggerTimeZone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Initializes local timezone offset early in the program.
///
/// **CRITICAL**: Call in `main()` **before spawning any threads** (before tokio runtime).
/// Timezone detection fails in multi-thread contexts on most Unix platforms.
///
/// Falls back to UTC silently if detection fails.
///
/// # Example
/// ```no_run
/// use perfdbg_observe::init_local_offset;
///
/// fn main() {
///     init_local_offset();
///
///     let worker = std::thread::spawn(|| tracing::info!("worker started"));
///     worker.join().unwrap();
/// }
/// ```
pub fn init_local_offset() {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    if let Ok(mut guard) = LOCAL_OFFSET.write() {
        *guard = offset;
    }
    let _ = INIT_DONE.set(());
}

/// Returns current local offset for timestamp formatting.
pub(crate) fn get_or_detect_local_offset() -> UtcOffset {
    INIT_DONE.get_or_init(|| {
        match UtcOffset::current_local_offset() {
            Ok(detected) => {
                if let Ok(mut guard) = LOCAL_OFFSET.write() {
                    *guard = detected;
                }
            }
            Err(_) => {
                eprintln!("WARNING: perfdbg-observe local timezone detection failed. \
                          Call init_local_offset() in main() before starting worker threads. \
                          Falling back to UTC.");
            }
        }
    });

    LOCAL_OFFSET.read()
        .map(|guard| *guard)
        .unwrap_or(UtcOffset::UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_utc() {
        assert_eq!(LoggerTimeZone::default(), LoggerTimeZone::Utc);
    }

    #[test]
    fn parses_case_insensitive() {
        assert_eq!(
            LoggerTimeZone::from_str("utc").unwrap(),
            LoggerTimeZone::Utc
        );
        assert_eq!(
            LoggerTimeZone::from_str("UTC").unwrap(),
            LoggerTimeZone::Utc
        );
        assert_eq!(
            LoggerTimeZone::from_str("local").unwrap(),
            LoggerTimeZone::Local
        );
        assert_eq!(
            LoggerTimeZone::from_str("LOCAL").unwrap(),
            LoggerTimeZone::Local
        );
    }

    #[test]
    fn rejects_invalid_timezone() {
        assert!(LoggerTimeZone::from_str("").is_err());
        assert!(LoggerTimeZone::from_str("pst").is_err());
    }

    #[test]
    fn display_returns_canonical_names() {
        assert_eq!(LoggerTimeZone::Utc.to_string(), "utc");
        assert_eq!(LoggerTimeZone::Local.to_string(), "local");
    }

    #[test]
    fn serde_uses_canonical_names() {
        assert_eq!(serde_json::to_string(&LoggerTimeZone::Local).unwrap(), r#""local""#);
        let tz: LoggerTimeZone = serde_json::from_str(r#""UTC""#).unwrap();
        assert_eq!(tz, LoggerTimeZone::Utc);
        assert!(serde_json::from_str::<LoggerTimeZone>(r#""pst""#).is_err());
    }

    #[test]
    fn get_after_init_returns_value() {
        init_local_offset();
        let offset = get_or_detect_local_offset();
        assert!(offset.whole_hours().abs() <= 14);
    }
}
