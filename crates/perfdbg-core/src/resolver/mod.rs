//! Resolution of the current process identifier.
//!
//! ## Overview
//!
//! [`Resolver`] runs an ordered list of [`Probe`] strategies and returns the first identifier one of them produces:
//! 1. [`ProcStatProbe`]: leading number of `/proc/self/stat`.
//! 2. [`MarkerProbe`]: publish a unique marker, then find the local process exposing it.
//! 3. [`RuntimeNameProbe`]: parse `<id>@<host>` and confirm the id with the marker technique.
//!
//! A failing probe never aborts resolution; it is logged and the next one runs.
use std::sync::Arc;

use perfdbg_model::{ModelError, ProcessId};
use thiserror::Error;
use tracing::{debug, trace};

mod introspect;
pub use introspect::{
    Attachment, IntrospectError, Introspector, PropertyTable, Publication, read_property,
};

mod marker;
pub use marker::{MarkerProbe, unique_token};

mod proc_stat;
pub use proc_stat::ProcStatProbe;

mod runtime_name;
pub use runtime_name::{HostRuntimeName, RuntimeName, RuntimeNameProbe};

mod procfs;
pub use procfs::ProcfsIntrospector;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("no candidate exposes the marker")]
    NotFound,

    #[error("candidate {0} does not expose the marker")]
    Mismatch(ProcessId),

    #[error("introspection failed: {0}")]
    Introspect(#[from] IntrospectError),
}

impl From<ModelError> for ProbeError {
    fn from(e: ModelError) -> Self {
        ProbeError::Malformed(e.to_string())
    }
}

/// One strategy for finding the current process identifier.
pub trait Probe: Send + Sync {
    /// Strategy name used in logs.
    fn name(&self) -> &'static str;

    /// Attempt to produce the identifier.
    fn probe(&self) -> Result<ProcessId, ProbeError>;
}

/// Ordered chain of probes.
pub struct Resolver {
    probes: Vec<Box<dyn Probe>>,
}

impl Resolver {
    /// Create a resolver running `probes` in the given order.
    pub fn new(probes: Vec<Box<dyn Probe>>) -> Self {
        Self { probes }
    }

    /// `/proc/self/stat`, then marker matching, then the host runtime name.
    pub fn standard(introspector: Arc<dyn Introspector>) -> Self {
        Self::new(vec![
            Box::new(ProcStatProbe::default()),
            Box::new(MarkerProbe::new(introspector.clone())),
            Box::new(RuntimeNameProbe::new(
                Arc::new(HostRuntimeName),
                introspector,
            )),
        ])
    }

    /// Standard chain backed by [`ProcfsIntrospector`].
    pub fn procfs() -> Self {
        Self::standard(Arc::new(ProcfsIntrospector::default()))
    }

    /// Resolve the identifier of the current process.
    ///
    /// Returns `None` when every probe failed.
    pub fn resolve(&self) -> Option<ProcessId> {
        for probe in &self.probes {
            match probe.probe() {
                Ok(pid) => {
                    trace!(probe = probe.name(), %pid, "process id resolved");
                    return Some(pid);
                }
                Err(e) => {
                    debug!(probe = probe.name(), "probe failed, falling through: {e}");
                }
            }
        }
        None
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::procfs()
    }
}
