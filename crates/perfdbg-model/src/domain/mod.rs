mod pid;
pub use pid::ProcessId;

mod state;
pub use state::AgentState;

mod constants;
pub use constants::{
    AGENT_NAME_ENV, AGENT_OPTIONS_ENV, AGENT_PATH_ENV, DEFAULT_AGENT_BINARY, DEFAULT_AGENT_NAME,
    DEFAULT_NAMESPACE, DEFAULT_SCRIPT_RESOURCE, MARKER_PROPERTY, NAMESPACE_ENV,
    SCRIPT_OVERLAY_ENV,
};
