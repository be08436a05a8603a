use std::{fmt, sync::Arc};

use crate::agent::{AgentLocator, AttachDriver, ScriptProvisioner};
use crate::registry::RegistryHandle;
use crate::resolver::Resolver;

/// Collaborators used by [`crate::DebugAgent::initialize`].
#[derive(Clone)]
pub struct AttachDeps {
    resolver: Arc<Resolver>,
    locator: Arc<dyn AgentLocator>,
    provisioner: Arc<dyn ScriptProvisioner>,
    driver: Arc<dyn AttachDriver>,
    registry: RegistryHandle,
}

impl AttachDeps {
    /// Bundle the given collaborators; the resolver is the procfs-backed standard chain.
    pub fn new(
        locator: Arc<dyn AgentLocator>,
        provisioner: Arc<dyn ScriptProvisioner>,
        driver: Arc<dyn AttachDriver>,
        registry: RegistryHandle,
    ) -> Self {
        Self {
            resolver: Arc::new(Resolver::procfs()),
            locator,
            provisioner,
            driver,
            registry,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn locator(&self) -> &dyn AgentLocator {
        self.locator.as_ref()
    }

    pub fn provisioner(&self) -> &dyn ScriptProvisioner {
        self.provisioner.as_ref()
    }

    pub fn driver(&self) -> &dyn AttachDriver {
        self.driver.as_ref()
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    /// Replace the resolver and return updated deps.
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Replace the registry and return updated deps.
    pub fn with_registry(mut self, registry: RegistryHandle) -> Self {
        self.registry = registry;
        self
    }
}

impl fmt::Debug for AttachDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachDeps")
            .field("resolver", &"<resolver>")
            .field("locator", &"<locator>")
            .field("provisioner", &"<provisioner>")
            .field("driver", &"<driver>")
            .field("registry", &"<handle>")
            .finish()
    }
}
