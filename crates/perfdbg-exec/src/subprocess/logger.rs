use std::{
    io::{self, BufRead, BufReader, Read},
    thread::{self, JoinHandle},
};

use tracing::{debug, info, warn};

/// Configuration for subprocess output logging.
#[derive(Debug, Clone, Copy)]
pub struct LogConfig {
    /// Max line length before truncation.
    pub max_line_length: usize,
    /// Log stdout at INFO level (false = DEBUG).
    pub stdout_info: bool,
    /// Log stderr at WARN level (false = DEBUG).
    pub stderr_warn: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_line_length: 4096,
            stdout_info: true,
            stderr_warn: true,
        }
    }
}

/// Output stream of the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Forward every line of `reader` to `tracing` until EOF.
pub(crate) fn spawn_pump<R>(
    reader: R,
    stream: Stream,
    agent_pid: u32,
    config: LogConfig,
) -> io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(format!("perfdbg-agent-{}", stream.as_str()))
        .spawn(move || {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            // keep draining until EOF so the child never writes into a closed pipe
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(trim_newline(&buf));
                        emit(stream, agent_pid, truncate(&line, config.max_line_length), &config);
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        debug!(agent_pid, stream = stream.as_str(), "output pump stopped: {e}");
                        break;
                    }
                }
            }
        })
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn emit(stream: Stream, agent_pid: u32, line: &str, config: &LogConfig) {
    match stream {
        Stream::Stdout if config.stdout_info => info!(agent_pid, stream = "stdout", "{line}"),
        Stream::Stderr if config.stderr_warn => warn!(agent_pid, stream = "stderr", "{line}"),
        _ => debug!(agent_pid, stream = stream.as_str(), "{line}"),
    }
}

/// Cut `line` to at most `max` bytes on a char boundary.
fn truncate(line: &str, max: usize) -> &str {
    if line.len() <= max {
        return line;
    }
    let mut end = max;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
