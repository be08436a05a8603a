use thiserror::Error;

use crate::agent::{DriverError, LocateError, ProvisionError};
use crate::registry::RegistryError;

/// Failure category of an attach attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachErrorKind {
    /// No process identifier could be determined.
    Unresolved,
    /// The instrumentation agent is not installed.
    MissingCapability,
    /// The rule script could not be materialized.
    Provisioning,
    /// The instrumentation agent could not be attached.
    Attach,
    /// The monitors could not be registered.
    Registry,
}

impl AttachErrorKind {
    /// Label value for metrics and logs.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            AttachErrorKind::Unresolved => "unresolved",
            AttachErrorKind::MissingCapability => "missing_capability",
            AttachErrorKind::Provisioning => "provisioning",
            AttachErrorKind::Attach => "attach",
            AttachErrorKind::Registry => "registry",
        }
    }
}

#[derive(Debug, Error)]
pub enum AttachError {
    #[error("unable to determine the current process id")]
    Unresolved,

    #[error("instrumentation agent not available: {0}")]
    MissingCapability(#[from] LocateError),

    #[error("unable to create debug agent rules file: {0}")]
    Provisioning(#[from] ProvisionError),

    #[error("unable to attach instrumentation agent: {0}")]
    Attach(#[from] DriverError),

    #[error("unable to register debug monitors: {0}")]
    Registry(#[from] RegistryError),
}

impl AttachError {
    /// Failure category.
    pub fn kind(&self) -> AttachErrorKind {
        match self {
            AttachError::Unresolved => AttachErrorKind::Unresolved,
            AttachError::MissingCapability(_) => AttachErrorKind::MissingCapability,
            AttachError::Provisioning(_) => AttachErrorKind::Provisioning,
            AttachError::Attach(_) => AttachErrorKind::Attach,
            AttachError::Registry(_) => AttachErrorKind::Registry,
        }
    }
}
