use std::{
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use perfdbg_core::agent::{AgentOptions, AttachDriver, AttachSession, DriverError};
use perfdbg_model::{AGENT_OPTIONS_ENV, DebugConfig, ProcessId};
use tracing::{debug, warn};

use crate::{
    ExecError,
    subprocess::{
        config::SubprocessConfig,
        logger::{LogConfig, Stream, spawn_pump},
    },
};

/// Default argument template: `bpftrace -p <pid> <script> <pid>`.
pub const DEFAULT_ARGS: &[&str] = &["-p", "{pid}", "{script}", "{pid}"];

/// Interval between liveness checks while the tool settles.
const SETTLE_POLL: Duration = Duration::from_millis(25);

/// Attach driver running the instrumentation tool as a child process.
///
/// Arguments are rendered from a template supporting three placeholders:
/// - `{pid}`: id of the process to attach to;
/// - `{script}`: path of the materialized rule script;
/// - `{options}`: rendered [`AgentOptions`].
///
/// Braces around anything that is not a lowercase identifier are passed through untouched,
/// so inline programs such as `-e 'BEGIN { exit(); }'` work as arguments.
///
/// The rendered options are also exported to the tool as `PERFDBG_AGENT_OPTIONS`.
#[derive(Debug, Clone)]
pub struct SubprocessDriver {
    args: Vec<String>,
    settle: Duration,
    log: LogConfig,
}

impl SubprocessDriver {
    /// Driver with [`DEFAULT_ARGS`] and a 250 ms settle period.
    pub fn new() -> Self {
        Self {
            args: DEFAULT_ARGS.iter().map(|a| a.to_string()).collect(),
            settle: Duration::from_millis(250),
            log: LogConfig::default(),
        }
    }

    /// Driver using the settle period of `config`.
    pub fn from_config(config: &DebugConfig) -> Self {
        Self::new().with_settle(Duration::from_millis(config.settle_ms))
    }

    /// Replace the argument template.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the settle period.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Replace the output logging configuration.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Check the argument template for unknown placeholders.
    pub fn validate(&self) -> Result<(), ExecError> {
        let values = [("pid", "1"), ("script", "s"), ("options", "o")];
        for arg in &self.args {
            substitute(arg, &values)?;
        }
        Ok(())
    }

    /// Render the subprocess configuration for one attach.
    pub(crate) fn build_config(
        &self,
        pid: ProcessId,
        agent: &Path,
        options: &AgentOptions,
    ) -> Result<SubprocessConfig, ExecError> {
        let pid_str = pid.to_string();
        let script = options.script.to_string_lossy();
        let rendered = options.to_string();
        let values = [
            ("pid", pid_str.as_str()),
            ("script", script.as_ref()),
            ("options", rendered.as_str()),
        ];

        let args = self
            .args
            .iter()
            .map(|arg| substitute(arg, &values))
            .collect::<Result<Vec<_>, _>>()?;

        let cfg = SubprocessConfig {
            run_id: format!("attach-{pid}"),
            command: agent.to_path_buf(),
            args,
            env: vec![(AGENT_OPTIONS_ENV.to_string(), rendered)],
            settle: self.settle,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

impl Default for SubprocessDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachDriver for SubprocessDriver {
    fn attach(
        &self,
        pid: ProcessId,
        agent: &Path,
        options: &AgentOptions,
    ) -> Result<Box<dyn AttachSession>, DriverError> {
        let cfg = self
            .build_config(pid, agent, options)
            .map_err(|e| DriverError::InvalidConfig(e.to_string()))?;
        cfg.trace_state();

        let mut session = SubprocessSession::spawn(&cfg, pid, self.log)?;
        session.settle(cfg.settle)?;

        debug!(
            run = %cfg.run_id,
            agent = %agent.display(),
            agent_pid = session.child_id(),
            "agent attached"
        );
        Ok(Box::new(session))
    }
}

/// Running instrumentation tool; killed and reaped on drop.
pub struct SubprocessSession {
    run_id: String,
    agent: PathBuf,
    target: ProcessId,
    child: Child,
}

impl SubprocessSession {
    fn spawn(cfg: &SubprocessConfig, target: ProcessId, log: LogConfig) -> Result<Self, DriverError> {
        let mut cmd = Command::new(&cfg.command);
        cmd.args(&cfg.args)
            .envs(cfg.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| DriverError::Spawn {
            agent: cfg.command.clone(),
            source,
        })?;
        let child_id = child.id();

        // pumps end on their own once the child closes its pipes
        if let Some(out) = child.stdout.take() {
            if let Err(e) = spawn_pump(out, Stream::Stdout, child_id, log) {
                warn!(run = %cfg.run_id, "failed to forward agent stdout: {e}");
            }
        }
        if let Some(err) = child.stderr.take() {
            if let Err(e) = spawn_pump(err, Stream::Stderr, child_id, log) {
                warn!(run = %cfg.run_id, "failed to forward agent stderr: {e}");
            }
        }

        Ok(Self {
            run_id: cfg.run_id.clone(),
            agent: cfg.command.clone(),
            target,
            child,
        })
    }

    /// Wait up to `settle` and fail if the tool exits in the meantime.
    fn settle(&mut self, settle: Duration) -> Result<(), DriverError> {
        let deadline = Instant::now() + settle;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    return Err(DriverError::Exited {
                        status: status.to_string(),
                    });
                }
                Ok(None) => {}
                Err(source) => {
                    return Err(DriverError::Spawn {
                        agent: self.agent.clone(),
                        source,
                    });
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep(SETTLE_POLL.min(deadline - now));
        }
    }

    /// OS id of the tool process.
    pub fn child_id(&self) -> u32 {
        self.child.id()
    }
}

impl AttachSession for SubprocessSession {
    fn describe(&self) -> String {
        format!(
            "{} (pid {}) attached to pid {}",
            self.agent.display(),
            self.child.id(),
            self.target
        )
    }
}

impl Drop for SubprocessSession {
    fn drop(&mut self) {
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!(run = %self.run_id, %status, "agent already exited");
            return;
        }
        if let Err(e) = self.child.kill() {
            debug!(run = %self.run_id, "failed to kill agent: {e}");
        }
        match self.child.wait() {
            Ok(status) => debug!(run = %self.run_id, %status, "agent detached"),
            Err(e) => warn!(run = %self.run_id, "failed to reap agent: {e}"),
        }
    }
}

/// Replace `{name}` placeholders in `arg` with `values`.
///
/// Only lowercase identifiers count as placeholders; other braces are copied as is.
fn substitute(arg: &str, values: &[(&str, &str)]) -> Result<String, ExecError> {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];

        let name = tail.find('}').map(|close| &tail[..close]).filter(|name| {
            !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '_')
        });
        let Some(name) = name else {
            out.push('{');
            rest = tail;
            continue;
        };

        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                return Err(ExecError::UnknownPlaceholder {
                    placeholder: name.to_string(),
                    arg: arg.to_string(),
                });
            }
        }
        rest = &tail[name.len() + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u32) -> ProcessId {
        ProcessId::new(n).unwrap()
    }

    fn options() -> AgentOptions {
        AgentOptions {
            listener: false,
            script: PathBuf::from("/tmp/perfdbgAgent1.bt"),
        }
    }

    #[test]
    fn default_template_renders_bpftrace_arguments() {
        let cfg = SubprocessDriver::new()
            .build_config(pid(42), Path::new("/usr/bin/bpftrace"), &options())
            .unwrap();

        assert_eq!(cfg.args, ["-p", "42", "/tmp/perfdbgAgent1.bt", "42"]);
        assert_eq!(cfg.run_id, "attach-42");
        assert_eq!(
            cfg.env,
            [(
                AGENT_OPTIONS_ENV.to_string(),
                "listener:false,script:/tmp/perfdbgAgent1.bt".to_string()
            )]
        );
    }

    #[test]
    fn substitute_handles_mixed_text() {
        let values = [("pid", "7"), ("options", "listener:true")];
        assert_eq!(substitute("--pid={pid}", &values).unwrap(), "--pid=7");
        assert_eq!(substitute("{options};{pid}", &values).unwrap(), "listener:true;7");
        assert_eq!(
            substitute("BEGIN { exit(); }", &values).unwrap(),
            "BEGIN { exit(); }"
        );
        assert_eq!(substitute("{}{", &values).unwrap(), "{}{");
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let driver = SubprocessDriver::new().with_args(["-p", "{tid}"]);
        let err = driver.validate().unwrap_err();
        assert!(matches!(
            err,
            ExecError::UnknownPlaceholder { ref placeholder, .. } if placeholder == "tid"
        ));
        assert_eq!(err.to_string(), "unknown placeholder '{tid}' in argument '{tid}'");

        let err = driver
            .attach(pid(1), Path::new("/bin/sh"), &options())
            .err()
            .unwrap();
        assert!(matches!(err, DriverError::InvalidConfig(_)));
    }

    #[test]
    fn from_config_uses_settle_period() {
        let cfg = DebugConfig {
            settle_ms: 10,
            ..DebugConfig::default()
        };
        assert_eq!(SubprocessDriver::from_config(&cfg).settle, Duration::from_millis(10));
    }

    #[test]
    fn missing_agent_fails_to_spawn() {
        let err = SubprocessDriver::new()
            .attach(pid(1), Path::new("/nonexistent/perfdbg/bpftrace"), &options())
            .err()
            .unwrap();
        assert!(matches!(err, DriverError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_is_reported() {
        let err = SubprocessDriver::new()
            .with_args(["-c", "exit 3"])
            .with_settle(Duration::from_secs(2))
            .attach(pid(1), Path::new("/bin/sh"), &options())
            .err()
            .unwrap();
        assert!(matches!(err, DriverError::Exited { .. }), "got {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn options_are_exported_to_the_agent() {
        let script = r#"test "$PERFDBG_AGENT_OPTIONS" = "listener:false,script:/tmp/perfdbgAgent1.bt" || exit 7; exec sleep 30"#;
        let session = SubprocessDriver::new()
            .with_args(["-c", script])
            .with_settle(Duration::from_millis(300))
            .attach(pid(1), Path::new("/bin/sh"), &options())
            .unwrap();
        assert!(session.describe().contains("attached to pid 1"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_output_does_not_break_the_agent() {
        let script = r#"printf '\377\n'; sleep 0.2; while true; do echo alive || exit 9; sleep 0.05; done"#;
        let session = SubprocessDriver::new()
            .with_args(["-c", script])
            .with_settle(Duration::from_millis(800))
            .attach(pid(1), Path::new("/bin/sh"), &options());
        assert!(session.is_ok(), "got {:?}", session.err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn drop_kills_and_reaps_the_agent() {
        let driver = SubprocessDriver::new().with_args(["-c", "exec sleep 30"]);
        let cfg = driver
            .build_config(pid(1), Path::new("/bin/sh"), &options())
            .unwrap();

        let mut session = SubprocessSession::spawn(&cfg, pid(1), LogConfig::default()).unwrap();
        session.settle(Duration::from_millis(50)).unwrap();
        let child = session.child_id();
        assert!(Path::new(&format!("/proc/{child}")).exists());

        drop(session);
        assert!(!Path::new(&format!("/proc/{child}")).exists());
    }
}
