use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Operating-system identifier of a process.
///
/// Zero is never a valid identifier for a user process and is rejected on parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(u32);

impl ProcessId {
    /// Wrap a raw identifier.
    ///
    /// Returns `None` for zero.
    pub const fn new(raw: u32) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Raw numeric value.
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl FromStr for ProcessId {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ModelError::InvalidPid(s.to_string()));
        }
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ModelError::InvalidPid(s.to_string()))
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ProcessId> for u32 {
    fn from(pid: ProcessId) -> Self {
        pid.0
    }
}

#[cfg(test)]
mod tests {
    use super::ProcessId;

    #[test]
    fn parses_plain_digits() {
        let pid: ProcessId = "1234".parse().unwrap();
        assert_eq!(pid.get(), 1234);
        assert_eq!(pid.to_string(), "1234");
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let pid: ProcessId = " 42\n".parse().unwrap();
        assert_eq!(pid.get(), 42);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "  ", "0", "-1", "+7", "12a", "abc", "99999999999"] {
            assert!(
                bad.parse::<ProcessId>().is_err(),
                "expected error for {bad:?}"
            );
        }
    }

    #[test]
    fn new_rejects_zero() {
        assert!(ProcessId::new(0).is_none());
        assert_eq!(ProcessId::new(7).map(u32::from), Some(7));
    }

    #[test]
    fn serde_is_transparent() {
        let pid = ProcessId::new(31337).unwrap();
        let json = serde_json::to_string(&pid).unwrap();
        assert_eq!(json, "31337");

        let back: ProcessId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pid);
    }
}
