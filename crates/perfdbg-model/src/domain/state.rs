use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Lifecycle of a debug agent instance.
///
/// `AttachFailed` and `Attached` are terminal: an instance never goes back to `Uninitialized`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgentState {
    #[default]
    Uninitialized,
    AttachFailed,
    Attached,
}

impl AgentState {
    /// Returns `true` for states that can not change any more.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AgentState::Uninitialized)
    }

    /// Label value for metrics and logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            AgentState::Uninitialized => "uninitialized",
            AgentState::AttachFailed => "attach-failed",
            AgentState::Attached => "attached",
        }
    }
}

impl FromStr for AgentState {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uninitialized" => Ok(AgentState::Uninitialized),
            "attach-failed" | "attachfailed" | "failed" => Ok(AgentState::AttachFailed),
            "attached" => Ok(AgentState::Attached),
            other => Err(ModelError::UnknownState(other.to_string())),
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
