//! Subprocess attach driver.
//!
//! Attaches the instrumentation tool by running it as a child process pointed at the current
//! process. The child lives as long as the returned session.
mod config;
mod driver;
mod logger;

pub use config::SubprocessConfig;
pub use driver::{DEFAULT_ARGS, SubprocessDriver, SubprocessSession};
pub use logger::LogConfig;

use std::sync::Arc;

use perfdbg_core::{AttachDeps, RegistryHandle};
use perfdbg_model::DebugConfig;

use crate::{PathLocator, ResourceProvisioner};

/// Build the OS-backed collaborators for `config`.
///
/// After this call [`perfdbg_core::DebugAgent::initialize`] locates the tool via [`PathLocator`],
/// serves scripts from [`ResourceProvisioner`] (honoring `overlay_dir`) and attaches with [`SubprocessDriver`].
pub fn attach_deps(config: &DebugConfig, registry: RegistryHandle) -> AttachDeps {
    AttachDeps::new(
        Arc::new(PathLocator::from_config(config)),
        Arc::new(ResourceProvisioner::from_config(config)),
        Arc::new(SubprocessDriver::from_config(config)),
        registry,
    )
}
