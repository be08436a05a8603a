use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use perfdbg_model::{AgentState, DebugConfig, ProcessId};
use tempfile::TempPath;
use tracing::{error, info, warn};

use crate::agent::{AgentOptions, AttachDeps, AttachSession, DebugHandle, ProvisionError};
use crate::error::{AttachError, AttachErrorKind};
use crate::registry::Monitors;

/// Serializes attach sequences.
static INIT_LOCK: Mutex<()> = Mutex::new(());

const SCRIPT_PREFIX: &str = "perfdbgAgent";
const SCRIPT_SUFFIX: &str = ".bt";

/// Debug agent providing live information about the running load test.
pub struct DebugAgent {
    state: AgentState,
    failure: Option<AttachErrorKind>,
    pid: Option<ProcessId>,
    monitors: Arc<Monitors>,
    // dropped before the script it reads
    session: Option<Box<dyn AttachSession>>,
    script: Option<TempPath>,
}

impl DebugAgent {
    fn new() -> Self {
        Self {
            state: AgentState::Uninitialized,
            failure: None,
            pid: None,
            monitors: Arc::new(Monitors::default()),
            session: None,
            script: None,
        }
    }

    /// Initialize and install the agent.
    ///
    /// Intended to be called once at startup. Concurrent calls are serialized; every call builds a new agent,
    /// so keep the returned handle instead of initializing again. Never fails: attach problems are logged and
    /// leave the agent in [`AgentState::AttachFailed`].
    pub fn initialize(cfg: &DebugConfig, deps: &AttachDeps) -> DebugHandle {
        let _guard = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let mut agent = Self::new();
        match agent.install(cfg, deps) {
            Ok(()) => {
                agent.state = AgentState::Attached;
                info!(
                    pid = ?agent.pid.map(|p| p.get()),
                    namespace = %cfg.namespace,
                    "debug agent installed"
                );
            }
            Err(e) => {
                agent.state = AgentState::AttachFailed;
                agent.failure = Some(e.kind());
                log_failure(&e);
            }
        }
        DebugHandle::new(Arc::new(agent))
    }

    fn install(&mut self, cfg: &DebugConfig, deps: &AttachDeps) -> Result<(), AttachError> {
        let pid = deps.resolver().resolve().ok_or(AttachError::Unresolved)?;
        self.pid = Some(pid);

        let agent = deps.locator().locate()?;
        let script = self.provision_script(cfg, deps)?;

        let options = AgentOptions {
            listener: cfg.listener,
            script,
        };
        let session = deps.driver().attach(pid, &agent, &options)?;
        info!(%pid, agent = %agent.display(), session = %session.describe(), "instrumentation agent attached");

        let name = cfg.resolve_agent_name();
        deps.registry()
            .register(&cfg.namespace, &name, self.monitors.clone())?;

        self.session = Some(session);
        Ok(())
    }

    /// Materialize the rule script into a temporary file owned by the agent.
    fn provision_script(
        &mut self,
        cfg: &DebugConfig,
        deps: &AttachDeps,
    ) -> Result<PathBuf, AttachError> {
        let tmp = tempfile::Builder::new()
            .prefix(SCRIPT_PREFIX)
            .suffix(SCRIPT_SUFFIX)
            .tempfile()
            .map_err(|source| ProvisionError::Write {
                path: std::env::temp_dir(),
                source,
            })?
            .into_temp_path();

        let written = deps.provisioner().provision(&cfg.script_resource, &tmp)?;
        self.script = Some(tmp);
        Ok(written)
    }

    /// Lifecycle state.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Returns `true` once the agent is attached and registered.
    pub fn is_attached(&self) -> bool {
        self.state == AgentState::Attached
    }

    /// Why the attach failed, if it did.
    pub fn failure(&self) -> Option<AttachErrorKind> {
        self.failure
    }

    /// Resolved process id.
    pub fn pid(&self) -> Option<ProcessId> {
        self.pid
    }

    /// Monitored values.
    pub fn monitors(&self) -> &Arc<Monitors> {
        &self.monitors
    }

    /// Location of the materialized rule script, removed when the agent is dropped.
    pub fn script_path(&self) -> Option<&Path> {
        self.script.as_deref()
    }

    /// Replace the reported generator name.
    pub fn report_generator_name(&self, name: impl Into<String>) {
        self.monitors.set_generator_name(name);
    }

    /// Count a newly created sender task.
    pub fn report_new_sender_task(&self) {
        self.monitors.inc_sender_tasks();
    }
}

fn log_failure(e: &AttachError) {
    match e.kind() {
        AttachErrorKind::Unresolved => {
            warn!("unable to determine own process id, debugging information will not be available");
        }
        AttachErrorKind::MissingCapability => {
            error!(
                kind = e.kind().as_label(),
                "unable to install debug agent. Make sure the instrumentation tool is installed. \
                 Debugging information will not be available: {e}"
            );
        }
        kind => {
            error!(
                kind = kind.as_label(),
                "unable to install debug agent, debugging information will not be available: {e}"
            );
        }
    }
}

impl fmt::Debug for DebugAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugAgent")
            .field("state", &self.state)
            .field("failure", &self.failure)
            .field("pid", &self.pid)
            .field("script", &self.script_path())
            .field("monitors", &self.monitors)
            .finish()
    }
}
