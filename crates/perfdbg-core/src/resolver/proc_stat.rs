use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use perfdbg_model::ProcessId;

use crate::resolver::{Probe, ProbeError};

const PROC_SELF_STAT: &str = "/proc/self/stat";

/// Bytes read from the stat file; a pid never has more digits.
const READ_BUDGET: usize = 10;

/// Fast path: leading number of `/proc/self/stat`.
#[derive(Debug, Clone)]
pub struct ProcStatProbe {
    path: PathBuf,
}

impl ProcStatProbe {
    /// Probe reading `path` instead of `/proc/self/stat`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse the leading ASCII digits of `bytes`.
    fn parse(bytes: &[u8]) -> Result<ProcessId, ProbeError> {
        let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return Err(ProbeError::Malformed("no leading pid".into()));
        }
        // ascii digits are valid utf-8
        let text = std::str::from_utf8(&bytes[..digits])
            .map_err(|e| ProbeError::Malformed(e.to_string()))?;
        Ok(text.parse::<ProcessId>()?)
    }

    fn read_prefix(path: &Path) -> Result<Vec<u8>, ProbeError> {
        let file = File::open(path)
            .map_err(|e| ProbeError::Unavailable(format!("{}: {e}", path.display())))?;

        let mut buf = Vec::with_capacity(READ_BUDGET);
        file.take(READ_BUDGET as u64)
            .read_to_end(&mut buf)
            .map_err(|e| ProbeError::Unavailable(format!("{}: {e}", path.display())))?;
        Ok(buf)
    }
}

impl Default for ProcStatProbe {
    fn default() -> Self {
        Self::new(PROC_SELF_STAT)
    }
}

impl Probe for ProcStatProbe {
    fn name(&self) -> &'static str {
        "proc-stat"
    }

    fn probe(&self) -> Result<ProcessId, ProbeError> {
        Self::parse(&Self::read_prefix(&self.path)?)
    }
}
