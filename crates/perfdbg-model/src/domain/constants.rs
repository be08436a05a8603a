//! Well-known names shared by the debug agent crates.
//!
//! Keeping them here avoids scattering magic strings across the resolver, the agent and the collaborators.

/// Name under which the debug monitors are registered when nothing else is configured.
pub const DEFAULT_AGENT_NAME: &str = "perfdbg-debug";

/// Environment variable overriding the monitor name.
///
/// Read once, at the moment the agent registers its monitors after a successful attach.
pub const AGENT_NAME_ENV: &str = "PERFDBG_DEBUG_AGENT_NAME";

/// Default metrics-registry namespace.
pub const DEFAULT_NAMESPACE: &str = "perfdbg";

/// Environment variable overriding the metrics-registry namespace.
pub const NAMESPACE_ENV: &str = "PERFDBG_DEBUG_NAMESPACE";

/// Instrumentation tool searched on `PATH` when no explicit location is configured.
pub const DEFAULT_AGENT_BINARY: &str = "bpftrace";

/// Environment variable with an explicit location of the instrumentation tool.
pub const AGENT_PATH_ENV: &str = "PERFDBG_AGENT_PATH";

/// Environment variable exported to the instrumentation tool with its rendered options.
pub const AGENT_OPTIONS_ENV: &str = "PERFDBG_AGENT_OPTIONS";

/// Environment variable with a directory whose scripts replace the embedded ones.
pub const SCRIPT_OVERLAY_ENV: &str = "PERFDBG_SCRIPT_OVERLAY";

/// Rule script resource materialized for the instrumentation tool.
pub const DEFAULT_SCRIPT_RESOURCE: &str = "debug/agent.bt";

/// Property key used to recognize the current process among attachable candidates.
pub const MARKER_PROPERTY: &str = "perfdbg.resolver.marker";
