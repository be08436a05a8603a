use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{
    AGENT_NAME_ENV, AGENT_PATH_ENV, DEFAULT_AGENT_BINARY, DEFAULT_AGENT_NAME, DEFAULT_NAMESPACE,
    DEFAULT_SCRIPT_RESOURCE, NAMESPACE_ENV, SCRIPT_OVERLAY_ENV,
};
use crate::error::{ModelError, ModelResult};

/// Debug agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugConfig {
    /// Metrics-registry namespace the monitors are published under.
    pub namespace: String,
    /// Monitor name. `None` falls back to [`DEFAULT_AGENT_NAME`].
    ///
    /// The `PERFDBG_DEBUG_AGENT_NAME` environment variable takes precedence, see [`DebugConfig::resolve_agent_name`].
    pub agent_name: Option<String>,
    /// Instrumentation tool looked up on `PATH` when `agent_path` is not set.
    pub agent_binary: String,
    /// Explicit location of the instrumentation tool.
    pub agent_path: Option<PathBuf>,
    /// Rule script resource handed to the instrumentation tool.
    pub script_resource: String,
    /// Directory consulted before the embedded scripts: `<overlay_dir>/<script_resource>` wins.
    pub overlay_dir: Option<PathBuf>,
    /// Whether the instrumentation tool should open its own listener.
    pub listener: bool,
    /// How long the attach driver waits for the tool to settle, in milliseconds.
    pub settle_ms: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            agent_name: None,
            agent_binary: DEFAULT_AGENT_BINARY.to_string(),
            agent_path: None,
            script_resource: DEFAULT_SCRIPT_RESOURCE.to_string(),
            overlay_dir: None,
            listener: false,
            settle_ms: 250,
        }
    }
}

impl DebugConfig {
    /// Default configuration overlaid with `PERFDBG_AGENT_PATH`, `PERFDBG_DEBUG_NAMESPACE` and
    /// `PERFDBG_SCRIPT_OVERLAY`.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values provided by `lookup`; blank values are ignored.
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(AGENT_PATH_ENV) {
            self.agent_path = Some(PathBuf::from(path));
        }
        if let Some(ns) = get(NAMESPACE_ENV) {
            self.namespace = ns;
        }
        if let Some(dir) = get(SCRIPT_OVERLAY_ENV) {
            self.overlay_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Monitor name: environment variable, then configuration, then [`DEFAULT_AGENT_NAME`].
    pub fn resolve_agent_name(&self) -> String {
        self.resolve_agent_name_with(|key| std::env::var(key).ok())
    }

    /// Same as [`DebugConfig::resolve_agent_name`] with an explicit lookup.
    pub fn resolve_agent_name_with<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(AGENT_NAME_ENV)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.agent_name.clone().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string())
    }

    /// Validate the configuration.
    ///
    /// Rules:
    /// - `namespace`, `agent_binary` and `script_resource` are not blank.
    pub fn validate(&self) -> ModelResult<()> {
        if self.namespace.trim().is_empty() {
            return Err(ModelError::InvalidConfig("namespace cannot be empty".into()));
        }
        if self.agent_binary.trim().is_empty() && self.agent_path.is_none() {
            return Err(ModelError::InvalidConfig(
                "either agentBinary or agentPath must be set".into(),
            ));
        }
        if self.script_resource.trim().is_empty() {
            return Err(ModelError::InvalidConfig(
                "scriptResource cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
