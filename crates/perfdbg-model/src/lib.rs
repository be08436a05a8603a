mod domain;
pub use domain::{
    AGENT_NAME_ENV, AGENT_OPTIONS_ENV, AGENT_PATH_ENV, DEFAULT_AGENT_BINARY, DEFAULT_AGENT_NAME,
    DEFAULT_NAMESPACE, DEFAULT_SCRIPT_RESOURCE, MARKER_PROPERTY, NAMESPACE_ENV,
    SCRIPT_OVERLAY_ENV,
};
pub use domain::{AgentState, ProcessId};

mod config;
pub use config::DebugConfig;

mod error;
pub use error::{ModelError, ModelResult};
