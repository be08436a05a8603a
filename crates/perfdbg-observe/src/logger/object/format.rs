use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::logger::LoggerError;

/// Output format selected by `PERFDBG_LOG_FORMAT` or the `format` config key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum LoggerFormat {
    /// Terminal output, colored when stdout is a tty.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
    /// Native journald fields (Linux only).
    Journald,
}

impl LoggerFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Journald => "journald",
        }
    }

    /// Whether the output is meant for machines rather than a terminal.
    pub fn is_structured(self) -> bool {
        self != Self::Text
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "journald" if cfg!(target_os = "linux") => Ok(Self::Journald),
            "journald" => Err(LoggerError::JournaldNotSupported),
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

impl TryFrom<String> for LoggerFormat {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LoggerFormat> for &'static str {
    fn from(f: LoggerFormat) -> Self {
        f.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_values_parse_case_insensitively() {
        assert_eq!(" JSON ".parse::<LoggerFormat>().unwrap(), LoggerFormat::Json);
        assert_eq!("Text".parse::<LoggerFormat>().unwrap(), LoggerFormat::Text);
        assert_eq!(LoggerFormat::default(), LoggerFormat::Text);
    }

    #[test]
    fn unknown_format_is_rejected() {
        for bad in ["xml", "logfmt", "journal", ""] {
            let err = bad.parse::<LoggerFormat>().unwrap_err();
            assert!(matches!(err, LoggerError::InvalidFormat(_)), "{bad:?}: {err}");
        }
    }

    #[test]
    fn journald_only_on_linux() {
        let parsed = "journald".parse::<LoggerFormat>();
        if cfg!(target_os = "linux") {
            assert_eq!(parsed.unwrap(), LoggerFormat::Journald);
        } else {
            assert!(matches!(parsed, Err(LoggerError::JournaldNotSupported)));
        }
    }

    #[test]
    fn only_text_is_unstructured() {
        assert!(!LoggerFormat::Text.is_structured());
        assert!(LoggerFormat::Json.is_structured());
        assert!(LoggerFormat::Journald.is_structured());
    }

    #[test]
    fn config_uses_canonical_names() {
        assert_eq!(serde_json::to_string(&LoggerFormat::Json).unwrap(), r#""json""#);
        let parsed: LoggerFormat = serde_json::from_str(r#""TEXT""#).unwrap();
        assert_eq!(parsed, LoggerFormat::Text);
    }
}
