//! Metrics-registry abstraction for the debug agent.
//!
//! The agent owns a [`Monitors`] object and, after a successful attach, hands it to a [`MonitorRegistry`].
//! Registry backends (prometheus, etc) implement the trait and read the monitored fields at collection time.
mod backend;
pub use backend::{MonitorRegistry, RegistryError, RegistryHandle};

mod monitors;
pub use monitors::Monitors;

mod noop;
pub use noop::NoOpRegistry;

use std::sync::Arc;

/// Create a no-op registry handle.
#[inline]
pub fn noop_registry() -> RegistryHandle {
    Arc::new(NoOpRegistry)
}
