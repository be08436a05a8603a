use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use perfdbg_core::agent::{AgentLocator, LocateError};
use perfdbg_model::{AGENT_PATH_ENV, DebugConfig};
use tracing::trace;

/// Finds the instrumentation tool from an explicit path or a `PATH` search.
#[derive(Debug, Clone)]
pub struct PathLocator {
    /// Binary name searched on `PATH`.
    binary: String,
    /// Explicit location; skips the search when set.
    explicit: Option<PathBuf>,
    /// Search path; `None` reads `PATH` at lookup time.
    search_path: Option<OsString>,
}

impl PathLocator {
    /// Locator searching `PATH` for `binary`.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            explicit: None,
            search_path: None,
        }
    }

    /// Locator for `DebugConfig::agent_path`, falling back to `agent_binary` on `PATH`.
    pub fn from_config(config: &DebugConfig) -> Self {
        let mut locator = Self::new(config.agent_binary.clone());
        locator.explicit = config.agent_path.clone();
        locator
    }

    /// Use an explicit location instead of searching.
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    /// Search `path` instead of the `PATH` environment variable.
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    fn search(&self) -> Option<PathBuf> {
        // a binary given with a directory part is not searched
        if self.binary.contains('/') {
            let path = PathBuf::from(&self.binary);
            return is_executable(&path).then_some(path);
        }

        let search_path = self.search_path.clone().or_else(|| env::var_os("PATH"))?;
        env::split_paths(&search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.join(&self.binary))
            .find(|candidate| is_executable(candidate))
    }
}

impl AgentLocator for PathLocator {
    fn locate(&self) -> Result<PathBuf, LocateError> {
        if let Some(path) = &self.explicit {
            trace!(agent = %path.display(), "using explicit agent location");
            return if is_executable(path) {
                Ok(path.clone())
            } else {
                Err(LocateError::NotExecutable(path.clone()))
            };
        }

        if self.binary.trim().is_empty() {
            return Err(LocateError::NotFound {
                binary: self.binary.clone(),
                hint: AGENT_PATH_ENV,
            });
        }

        match self.search() {
            Some(path) => {
                trace!(agent = %path.display(), "agent found on PATH");
                Ok(path)
            }
            None => Err(LocateError::NotFound {
                binary: self.binary.clone(),
                hint: AGENT_PATH_ENV,
            }),
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
