use std::sync::Arc;

use prometheus::{Encoder, Registry, TextEncoder, proto::MetricFamily};
use tracing::debug;

use perfdbg_core::{MonitorRegistry, Monitors, RegistryError};

use crate::collector::MonitorsCollector;

/// Prometheus registry backend for the debug agent.
///
/// Implements [`MonitorRegistry`]; every registered [`Monitors`] object becomes a [`MonitorsCollector`]
/// inside the underlying prometheus [`Registry`].
///
/// ## Label cardinality
/// - `agent`: one value per registered monitor
/// - `generator`: exactly one series at a time, the generator currently reported
#[derive(Clone)]
pub struct PrometheusRegistry {
    registry: Arc<Registry>,
}

impl PrometheusRegistry {
    /// Create a backend on top of a custom registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Create a backend with its own registry.
    pub fn new() -> Self {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render all metrics in the Prometheus text format.
    ///
    /// Use this to implement `/metrics` HTTP endpoint.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Get reference to underlying prometheus registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl Default for PrometheusRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorRegistry for PrometheusRegistry {
    fn register(
        &self,
        namespace: &str,
        name: &str,
        monitors: Arc<Monitors>,
    ) -> Result<(), RegistryError> {
        let ns = sanitize_namespace(namespace)
            .ok_or_else(|| RegistryError::InvalidNamespace(namespace.to_string()))?;

        let collector = MonitorsCollector::new(&ns, name, monitors)
            .map_err(|e| RegistryError::Backend(e.to_string()))?;

        match self.registry.register(Box::new(collector)) {
            Ok(()) => {
                debug!(namespace = %ns, name, "debug monitors registered");
                Ok(())
            }
            Err(prometheus::Error::AlreadyReg) => {
                Err(RegistryError::AlreadyRegistered(name.to_string()))
            }
            Err(e) => Err(RegistryError::Backend(e.to_string())),
        }
    }
}

/// Map a namespace onto the prometheus metric name charset.
///
/// Characters outside `[a-zA-Z0-9_]` become `_`; a leading digit gets a `_` prefix.
fn sanitize_namespace(namespace: &str) -> Option<String> {
    let trimmed = namespace.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut out: String = trimmed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    Some(out)
}
