//! procfs-backed process introspection.
//!
//! ## Overview
//!
//! - A property is published by creating a marker file named `<key>=<value>` in a per-user marker directory
//!   and keeping it open for as long as the property is published.
//! - Candidates are the `/proc/<pid>` entries owned by the effective uid.
//! - Attaching to a candidate reads its `/proc/<pid>/fd` links and collects the marker files it holds open.
//!
//! On non-Linux platforms publishing still works but enumeration and attach report [`IntrospectError::Unsupported`].
use std::{
    collections::HashMap,
    fs::{self, File},
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use perfdbg_model::ProcessId;
use tracing::trace;

use crate::resolver::{IntrospectError, Introspector, PropertyTable};

/// Introspection through `/proc` and marker files.
#[derive(Debug)]
pub struct ProcfsIntrospector {
    /// Directory holding the marker files.
    marker_dir: PathBuf,
    /// procfs mount point.
    proc_root: PathBuf,
    /// Open marker files by key.
    published: Mutex<HashMap<String, (PathBuf, File)>>,
}

impl ProcfsIntrospector {
    /// Introspector with explicit marker directory and procfs root.
    pub fn new(marker_dir: impl Into<PathBuf>, proc_root: impl Into<PathBuf>) -> Self {
        Self {
            marker_dir: marker_dir.into(),
            proc_root: proc_root.into(),
            published: Mutex::new(HashMap::new()),
        }
    }

    /// Marker directory used by default: `$TMPDIR/perfdbg-markers-<euid>`.
    pub fn default_marker_dir() -> PathBuf {
        std::env::temp_dir().join(format!("perfdbg-markers-{}", effective_uid()))
    }

    /// Marker file name for a property.
    fn marker_name(key: &str, value: &str) -> String {
        format!("{key}={value}")
    }

    /// Inverse of [`ProcfsIntrospector::marker_name`].
    fn split_marker(name: &str) -> Option<(&str, &str)> {
        name.split_once('=')
    }

    fn published(&self) -> std::sync::MutexGuard<'_, HashMap<String, (PathBuf, File)>> {
        self.published.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ProcfsIntrospector {
    fn default() -> Self {
        Self::new(Self::default_marker_dir(), "/proc")
    }
}

impl Introspector for ProcfsIntrospector {
    fn publish(&self, key: &str, value: &str) -> Result<(), IntrospectError> {
        if key.contains(['/', '=']) || value.contains('/') {
            return Err(IntrospectError::Unsupported(format!(
                "property '{key}' can not be expressed as a marker file"
            )));
        }
        self.retract(key);

        fs::create_dir_all(&self.marker_dir)?;
        let path = self.marker_dir.join(Self::marker_name(key, value));
        let file = File::create(&path)?;

        trace!(marker = %path.display(), "marker published");
        self.published().insert(key.to_string(), (path, file));
        Ok(())
    }

    fn retract(&self, key: &str) {
        if let Some((path, file)) = self.published().remove(key) {
            drop(file);
            if let Err(e) = fs::remove_file(&path) {
                trace!(marker = %path.display(), "failed to remove marker: {e}");
            }
        }
    }

    #[cfg(target_os = "linux")]
    fn candidates(&self) -> Result<Vec<ProcessId>, IntrospectError> {
        use std::os::unix::fs::MetadataExt;

        let uid = effective_uid();
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.proc_root)? {
            let Ok(entry) = entry else { continue };
            let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<ProcessId>().ok())
            else {
                continue;
            };
            // processes may exit while we scan
            match entry.metadata() {
                Ok(meta) if meta.uid() == uid => out.push(pid),
                _ => {}
            }
        }
        out.sort();
        Ok(out)
    }

    #[cfg(not(target_os = "linux"))]
    fn candidates(&self) -> Result<Vec<ProcessId>, IntrospectError> {
        Err(IntrospectError::Unsupported(format!(
            "process enumeration on {}",
            std::env::consts::OS
        )))
    }

    #[cfg(target_os = "linux")]
    fn attach(&self, pid: ProcessId) -> Result<Box<dyn PropertyTable + '_>, IntrospectError> {
        let fd_dir = self.proc_root.join(pid.to_string()).join("fd");
        let entries = fs::read_dir(&fd_dir).map_err(|e| IntrospectError::from_io(pid, e))?;

        // fd links always show the canonical path
        let marker_dir = fs::canonicalize(&self.marker_dir).unwrap_or_else(|_| self.marker_dir.clone());

        let mut props = HashMap::new();
        for entry in entries.flatten() {
            // fds close concurrently; a vanished link is not an error
            let Ok(target) = fs::read_link(entry.path()) else {
                continue;
            };
            if target.parent() != Some(marker_dir.as_path()) {
                continue;
            }
            if let Some((key, value)) = target
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(Self::split_marker)
            {
                props.insert(key.to_string(), value.to_string());
            }
        }
        Ok(Box::new(ProcfsTable {
            pid,
            props: Some(props),
        }))
    }

    #[cfg(not(target_os = "linux"))]
    fn attach(&self, _pid: ProcessId) -> Result<Box<dyn PropertyTable + '_>, IntrospectError> {
        Err(IntrospectError::Unsupported(format!(
            "process attach on {}",
            std::env::consts::OS
        )))
    }
}

impl Drop for ProcfsIntrospector {
    fn drop(&mut self) {
        let keys: Vec<String> = self.published().keys().cloned().collect();
        for key in keys {
            self.retract(&key);
        }
    }
}

/// Snapshot of the marker properties of one process.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
struct ProcfsTable {
    pid: ProcessId,
    props: Option<HashMap<String, String>>,
}

impl PropertyTable for ProcfsTable {
    fn get(&self, key: &str) -> Result<Option<String>, IntrospectError> {
        match &self.props {
            Some(props) => Ok(props.get(key).cloned()),
            None => Err(IntrospectError::NoSuchProcess(self.pid)),
        }
    }

    fn detach(&mut self) -> Result<(), IntrospectError> {
        self.props = None;
        Ok(())
    }
}

#[cfg(unix)]
fn effective_uid() -> u32 {
    unsafe { libc::geteuid() }
}

#[cfg(not(unix))]
fn effective_uid() -> u32 {
    0
}
