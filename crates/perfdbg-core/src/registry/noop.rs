use std::sync::Arc;

use crate::registry::{MonitorRegistry, Monitors, RegistryError};

/// Registry that accepts everything and exposes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpRegistry;

impl MonitorRegistry for NoOpRegistry {
    #[inline(always)]
    fn register(&self, _: &str, _: &str, _: Arc<Monitors>) -> Result<(), RegistryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_registry_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpRegistry>(), 0);
    }

    #[test]
    fn noop_accepts_repeated_registrations() {
        let registry = NoOpRegistry;
        let monitors = Arc::new(Monitors::default());
        for _ in 0..100 {
            assert!(registry.register("ns", "same", monitors.clone()).is_ok());
        }
    }
}
