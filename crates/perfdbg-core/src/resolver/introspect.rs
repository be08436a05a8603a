use std::io;

use perfdbg_model::ProcessId;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum IntrospectError {
    #[error("no such process: {0}")]
    NoSuchProcess(ProcessId),

    #[error("permission denied for process {0}")]
    PermissionDenied(ProcessId),

    #[error("process introspection is not supported: {0}")]
    Unsupported(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl IntrospectError {
    /// Classify an io error raised while probing `pid`.
    pub fn from_io(pid: ProcessId, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NoSuchProcess(pid),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(pid),
            _ => Self::Io(err),
        }
    }
}

/// Capability to publish process-local properties and read the ones published by other local processes.
pub trait Introspector: Send + Sync {
    /// Publish `value` under `key` for the current process.
    fn publish(&self, key: &str, value: &str) -> Result<(), IntrospectError>;

    /// Withdraw a property published with [`Introspector::publish`].
    fn retract(&self, key: &str);

    /// Processes the current user is allowed to introspect.
    fn candidates(&self) -> Result<Vec<ProcessId>, IntrospectError>;

    /// Open the property table of `pid`.
    ///
    /// Prefer [`Attachment::open`], which guarantees the table gets detached.
    fn attach(&self, pid: ProcessId) -> Result<Box<dyn PropertyTable + '_>, IntrospectError>;
}

/// Property table of an attached process.
pub trait PropertyTable {
    /// Value published under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, IntrospectError>;

    /// Release the attachment.
    fn detach(&mut self) -> Result<(), IntrospectError>;
}

/// Attached property table that is detached when dropped.
pub struct Attachment<'a> {
    pid: ProcessId,
    table: Box<dyn PropertyTable + 'a>,
}

impl<'a> Attachment<'a> {
    /// Attach to `pid` through `introspector`.
    pub fn open(introspector: &'a dyn Introspector, pid: ProcessId) -> Result<Self, IntrospectError> {
        let table = introspector.attach(pid)?;
        Ok(Self { pid, table })
    }

    /// Value published under `key`, if any.
    pub fn get(&self, key: &str) -> Result<Option<String>, IntrospectError> {
        self.table.get(key)
    }
}

impl Drop for Attachment<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.table.detach() {
            trace!(pid = %self.pid, "detach failed: {e}");
        }
    }
}

/// Read `key` from `pid`; any failure yields `None`.
pub fn read_property(introspector: &dyn Introspector, pid: ProcessId, key: &str) -> Option<String> {
    let attachment = match Attachment::open(introspector, pid) {
        Ok(a) => a,
        Err(e) => {
            trace!(%pid, "skipping candidate: {e}");
            return None;
        }
    };
    match attachment.get(key) {
        Ok(value) => value,
        Err(e) => {
            trace!(%pid, key, "property read failed: {e}");
            None
        }
    }
}

/// Published property that is retracted when dropped.
pub struct Publication<'a> {
    introspector: &'a dyn Introspector,
    key: &'a str,
}

impl<'a> Publication<'a> {
    /// Publish `value` under `key`.
    pub fn new(
        introspector: &'a dyn Introspector,
        key: &'a str,
        value: &str,
    ) -> Result<Self, IntrospectError> {
        introspector.publish(key, value)?;
        Ok(Self { introspector, key })
    }
}

impl Drop for Publication<'_> {
    fn drop(&mut self) {
        self.introspector.retract(self.key);
    }
}
