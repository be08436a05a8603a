//! Self-attaching debug agent.
//!
//! ## Overview
//!
//! [`DebugAgent::initialize`] resolves the current process id, locates the instrumentation agent,
//! materializes its rule script, attaches the agent to the current process and finally registers
//! the [`crate::Monitors`] with the metrics registry. Every failure is logged and contained:
//! the returned [`DebugHandle`] always carries an instance, attached or not.
//!
//! The handle is the reporting surface for the rest of the process; an absent handle
//! ([`DebugHandle::none`]) turns every report into a no-op.
mod collab;
pub use collab::{
    AgentLocator, AgentOptions, AttachDriver, AttachSession, DriverError, LocateError,
    ProvisionError, ScriptProvisioner,
};

mod debug;
pub use debug::DebugAgent;

mod deps;
pub use deps::AttachDeps;

mod handle;
pub use handle::DebugHandle;
