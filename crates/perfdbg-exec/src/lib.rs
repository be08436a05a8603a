//! OS-backed collaborators of the self-attach debug agent.
//!
//! - [`PathLocator`] finds the instrumentation tool.
//! - [`ResourceProvisioner`] materializes rule scripts.
//! - [`subprocess::SubprocessDriver`] attaches the tool as a child process (feature `subprocess`).
mod error;
pub use error::ExecError;

mod locator;
pub use locator::PathLocator;

mod resources;
pub use resources::ResourceProvisioner;

#[cfg(feature = "subprocess")]
pub mod subprocess;
