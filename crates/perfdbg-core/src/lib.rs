pub mod accumulator;
pub mod agent;
pub mod error;
pub mod registry;
pub mod resolver;

pub use accumulator::{Accumulator, SumAccumulator};
pub use agent::{AttachDeps, DebugAgent, DebugHandle};
pub use error::{AttachError, AttachErrorKind};
pub use registry::{MonitorRegistry, Monitors, NoOpRegistry, RegistryError, RegistryHandle};
pub use resolver::Resolver;

pub mod prelude {
    pub use crate::agent::{
        AgentLocator, AgentOptions, AttachDeps, AttachDriver, AttachSession, DebugAgent,
        DebugHandle, ScriptProvisioner,
    };
    pub use crate::error::{AttachError, AttachErrorKind};
    pub use crate::registry::{MonitorRegistry, Monitors, RegistryHandle};
    pub use crate::resolver::{Introspector, Probe, Resolver};
}
