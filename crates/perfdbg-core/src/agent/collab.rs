use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use perfdbg_model::ProcessId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("'{binary}' was not found on PATH; install it or point {hint} at it")]
    NotFound { binary: String, hint: &'static str },

    #[error("'{0}' is not an executable file")]
    NotExecutable(PathBuf),
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("unable to read resource '{resource}': {source}")]
    Read {
        resource: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to spawn '{agent}': {source}")]
    Spawn {
        agent: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("agent exited during attach ({status})")]
    Exited { status: String },

    #[error("invalid attach configuration: {0}")]
    InvalidConfig(String),
}

/// Options handed to the instrumentation agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOptions {
    /// Whether the agent should open its own listener.
    pub listener: bool,
    /// Materialized rule script.
    pub script: PathBuf,
}

impl fmt::Display for AgentOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listener:{},script:{}",
            self.listener,
            self.script.display()
        )
    }
}

/// Finds the instrumentation agent installed on this machine.
pub trait AgentLocator: Send + Sync {
    fn locate(&self) -> Result<PathBuf, LocateError>;
}

/// Materializes resources (rule scripts) on disk.
pub trait ScriptProvisioner: Send + Sync {
    /// Write `resource` to `dest` and return `dest`.
    fn provision(&self, resource: &str, dest: &Path) -> Result<PathBuf, ProvisionError>;
}

/// Live attachment of the instrumentation agent.
///
/// Dropping the session detaches the agent.
pub trait AttachSession: Send + Sync {
    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Loads the instrumentation agent into a running process.
pub trait AttachDriver: Send + Sync {
    fn attach(
        &self,
        pid: ProcessId,
        agent: &Path,
        options: &AgentOptions,
    ) -> Result<Box<dyn AttachSession>, DriverError>;
}
