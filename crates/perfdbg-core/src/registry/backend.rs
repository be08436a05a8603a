use std::sync::Arc;

use thiserror::Error;

use crate::registry::Monitors;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid namespace '{0}'")]
    InvalidNamespace(String),

    #[error("monitor '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("registry backend error: {0}")]
    Backend(String),
}

/// Registry of monitored objects.
///
/// Once registered, the monitored fields become externally observable under `namespace`.
/// Failures are backend-specific and never retried by the caller.
pub trait MonitorRegistry: Send + Sync + 'static {
    /// Register `monitors` under `namespace` as `name`.
    ///
    /// # Arguments
    /// - `namespace`: Registry namespace
    /// - `name`: Name of the monitored object inside the namespace
    /// - `monitors`: Live monitored fields, read on every collection
    fn register(
        &self,
        namespace: &str,
        name: &str,
        monitors: Arc<Monitors>,
    ) -> Result<(), RegistryError>;
}

/// Shared handle to a registry backend.
pub type RegistryHandle = Arc<dyn MonitorRegistry>;
