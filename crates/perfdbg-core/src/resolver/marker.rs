use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::{SystemTime, UNIX_EPOCH};

use perfdbg_model::{MARKER_PROPERTY, ProcessId};
use tracing::trace;

use crate::resolver::{Introspector, Probe, ProbeError, Publication, read_property};

/// Per-process sequence mixed into marker tokens.
static TOKEN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Build a marker token unique for this call.
///
/// Format: `{unix_nanos:x}-{seq:x}`.
pub fn unique_token() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{nanos:x}-{:x}", TOKEN_SEQ.fetch_add(1, Ordering::Relaxed))
}

/// Publish a unique marker and find the attachable process exposing it.
pub struct MarkerProbe {
    introspector: Arc<dyn Introspector>,
    key: &'static str,
}

impl MarkerProbe {
    /// Marker probe using [`MARKER_PROPERTY`] as the key.
    pub fn new(introspector: Arc<dyn Introspector>) -> Self {
        Self {
            introspector,
            key: MARKER_PROPERTY,
        }
    }
}

impl Probe for MarkerProbe {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn probe(&self) -> Result<ProcessId, ProbeError> {
        let introspector = self.introspector.as_ref();
        let token = unique_token();
        let _publication = Publication::new(introspector, self.key, &token)?;

        let candidates = introspector.candidates()?;
        trace!(candidates = candidates.len(), "scanning attachable processes");

        candidates
            .into_iter()
            .find(|pid| read_property(introspector, *pid, self.key).as_deref() == Some(token.as_str()))
            .ok_or(ProbeError::NotFound)
    }
}
