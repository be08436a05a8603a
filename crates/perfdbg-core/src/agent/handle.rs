use std::{fmt, sync::Arc};

use crate::agent::DebugAgent;

/// Process-wide reporting handle.
///
/// Created once by [`DebugAgent::initialize`] and cloned into every component that reports.
/// A handle without an agent models "not initialized": all reports are ignored.
#[derive(Clone, Default)]
pub struct DebugHandle {
    agent: Option<Arc<DebugAgent>>,
}

impl DebugHandle {
    /// Handle without an agent.
    pub fn none() -> Self {
        Self::default()
    }

    pub(crate) fn new(agent: Arc<DebugAgent>) -> Self {
        Self { agent: Some(agent) }
    }

    /// The agent instance, `None` when the agent was not initialized.
    pub fn instance(&self) -> Option<&Arc<DebugAgent>> {
        self.agent.as_ref()
    }

    /// Report the workload generator in use.
    #[inline]
    pub fn report_generator_name(&self, name: impl Into<String>) {
        if let Some(agent) = &self.agent {
            agent.report_generator_name(name);
        }
    }

    /// Report that a new sender task was created.
    #[inline]
    pub fn report_new_sender_task(&self) {
        if let Some(agent) = &self.agent {
            agent.report_new_sender_task();
        }
    }
}

impl fmt::Debug for DebugHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugHandle")
            .field("state", &self.agent.as_ref().map(|a| a.state()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::DebugHandle;

    #[test]
    fn reports_without_agent_are_ignored() {
        let handle = DebugHandle::none();
        handle.report_new_sender_task();
        handle.report_new_sender_task();
        handle.report_new_sender_task();
        handle.report_generator_name("LoadGen");

        assert!(handle.instance().is_none());
    }

    #[test]
    fn default_is_none() {
        assert!(DebugHandle::default().instance().is_none());
        assert_eq!(format!("{:?}", DebugHandle::none()), "DebugHandle { state: None }");
    }
}
