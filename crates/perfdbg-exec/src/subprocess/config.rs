use std::{fmt, path::PathBuf, time::Duration};

use tracing::trace;

use crate::ExecError;

/// Resolved configuration of one attach subprocess.
#[derive(Debug, Clone)]
pub struct SubprocessConfig {
    /// End-to-End log identifier.
    pub(crate) run_id: String,
    /// Instrumentation tool to execute.
    pub(crate) command: PathBuf,
    /// Command-line arguments with placeholders already substituted.
    pub(crate) args: Vec<String>,
    /// Extra environment exported to the tool on top of the inherited one.
    pub(crate) env: Vec<(String, String)>,
    /// How long the tool has to stay alive before the attach counts as successful.
    pub(crate) settle: Duration,
}

impl SubprocessConfig {
    /// Validate the configuration before spawning a subprocess.
    ///
    /// Rules:
    /// - `command` is not empty;
    /// - environment keys are not empty and contain no `=`.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.command.as_os_str().is_empty() {
            return Err(ExecError::InvalidDriverConfig(
                "agent command is empty".into(),
            ));
        }
        for (key, _) in &self.env {
            if key.is_empty() || key.contains('=') {
                return Err(ExecError::InvalidDriverConfig(format!(
                    "invalid environment key '{key}'"
                )));
            }
        }
        Ok(())
    }

    /// Emit a trace-level log with the essential configuration fields.
    pub fn trace_state(&self) {
        trace!(
            run = %self.run_id,
            command = %self.command.display(),
            args = ?self.args,
            env_len = self.env.len(),
            settle_ms = self.settle.as_millis() as u64,
            "attach subprocess config resolved"
        );
    }
}

impl fmt::Display for SubprocessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SubprocessConfig(cmd='{}', args={}, env={}, settle={:?})",
            self.command.display(),
            self.args.len(),
            self.env.len(),
            self.settle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SubprocessConfig {
        SubprocessConfig {
            run_id: "attach-42".into(),
            command: PathBuf::from("/usr/bin/bpftrace"),
            args: vec!["-p".into(), "42".into()],
            env: vec![("PERFDBG_AGENT_OPTIONS".into(), "listener:false".into())],
            settle: Duration::from_millis(250),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn empty_command_is_rejected() {
        let mut cfg = config();
        cfg.command = PathBuf::new();
        assert!(matches!(
            cfg.validate(),
            Err(ExecError::InvalidDriverConfig(_))
        ));
    }

    #[test]
    fn bad_env_key_is_rejected() {
        let mut cfg = config();
        cfg.env.push(("A=B".into(), "x".into()));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            config().to_string(),
            "SubprocessConfig(cmd='/usr/bin/bpftrace', args=2, env=1, settle=250ms)"
        );
    }
}
