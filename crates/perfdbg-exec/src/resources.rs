use std::{
    borrow::Cow,
    fs, io,
    path::{Component, Path, PathBuf},
};

use perfdbg_core::agent::{ProvisionError, ScriptProvisioner};
use perfdbg_model::DebugConfig;
use tracing::{debug, trace};

/// Resources compiled into the binary, keyed by resource name.
const EMBEDDED: &[(&str, &str)] = &[(
    perfdbg_model::DEFAULT_SCRIPT_RESOURCE,
    include_str!("../resources/debug/agent.bt"),
)];

/// Serves rule scripts embedded at compile time.
///
/// An optional overlay directory is consulted first: `<overlay>/<resource>` replaces the embedded
/// copy, which lets operators tune the rules without rebuilding.
#[derive(Debug, Clone, Default)]
pub struct ResourceProvisioner {
    overlay: Option<PathBuf>,
}

impl ResourceProvisioner {
    /// Provisioner serving embedded resources only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provisioner honoring `config.overlay_dir`.
    pub fn from_config(config: &DebugConfig) -> Self {
        Self {
            overlay: config.overlay_dir.clone(),
        }
    }

    /// Look resources up in `dir` before the embedded set.
    pub fn with_overlay(mut self, dir: impl Into<PathBuf>) -> Self {
        self.overlay = Some(dir.into());
        self
    }

    /// Names of the embedded resources.
    pub fn embedded() -> impl Iterator<Item = &'static str> {
        EMBEDDED.iter().map(|(name, _)| *name)
    }

    fn load(&self, resource: &str) -> Result<Cow<'static, [u8]>, ProvisionError> {
        if !is_relative_name(resource) {
            return Err(ProvisionError::UnknownResource(resource.to_string()));
        }

        if let Some(dir) = &self.overlay {
            let path = dir.join(resource);
            match fs::read(&path) {
                Ok(bytes) => {
                    debug!(resource, path = %path.display(), "resource served from overlay");
                    return Ok(Cow::Owned(bytes));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(ProvisionError::Read {
                        resource: resource.to_string(),
                        source,
                    });
                }
            }
        }

        EMBEDDED
            .iter()
            .find(|(name, _)| *name == resource)
            .map(|(_, body)| Cow::Borrowed(body.as_bytes()))
            .ok_or_else(|| ProvisionError::UnknownResource(resource.to_string()))
    }
}

impl ScriptProvisioner for ResourceProvisioner {
    fn provision(&self, resource: &str, dest: &Path) -> Result<PathBuf, ProvisionError> {
        let body = self.load(resource)?;
        fs::write(dest, &body).map_err(|source| ProvisionError::Write {
            path: dest.to_path_buf(),
            source,
        })?;

        trace!(resource, script = %dest.display(), bytes = body.len(), "resource provisioned");
        Ok(dest.to_path_buf())
    }
}

/// Resource names are relative paths without parent or root components.
fn is_relative_name(resource: &str) -> bool {
    !resource.is_empty()
        && Path::new(resource)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_script_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("perfdbgAgent.bt");

        let out = ResourceProvisioner::new()
            .provision("debug/agent.bt", &dest)
            .unwrap();
        assert_eq!(out, dest);

        let body = fs::read_to_string(&dest).unwrap();
        assert!(body.contains("BEGIN"));
        assert!(body.contains("$1"));
    }

    #[test]
    fn default_resource_is_embedded() {
        assert!(ResourceProvisioner::embedded().any(|r| r == perfdbg_model::DEFAULT_SCRIPT_RESOURCE));
    }

    #[test]
    fn unknown_resource_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bt");

        let err = ResourceProvisioner::new()
            .provision("debug/missing.bt", &dest)
            .unwrap_err();
        assert!(matches!(err, ProvisionError::UnknownResource(r) if r == "debug/missing.bt"));
        assert!(!dest.exists());
    }

    #[test]
    fn escaping_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let provisioner = ResourceProvisioner::new().with_overlay(dir.path());
        for bad in ["", "../agent.bt", "/etc/passwd", "debug/../../x"] {
            let err = provisioner
                .provision(bad, &dir.path().join("out.bt"))
                .unwrap_err();
            assert!(
                matches!(err, ProvisionError::UnknownResource(_)),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn overlay_replaces_embedded_copy() {
        let overlay = tempfile::tempdir().unwrap();
        fs::create_dir_all(overlay.path().join("debug")).unwrap();
        fs::write(overlay.path().join("debug/agent.bt"), "BEGIN { exit(); }\n").unwrap();

        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("agent.bt");
        ResourceProvisioner::new()
            .with_overlay(overlay.path())
            .provision("debug/agent.bt", &dest)
            .unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "BEGIN { exit(); }\n");
    }

    #[test]
    fn overlay_falls_back_to_embedded() {
        let overlay = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("agent.bt");

        ResourceProvisioner::new()
            .with_overlay(overlay.path())
            .provision("debug/agent.bt", &dest)
            .unwrap();
        assert!(fs::read_to_string(&dest).unwrap().contains("perfdbg"));
    }

    #[test]
    fn from_config_uses_overlay_dir() {
        let overlay = tempfile::tempdir().unwrap();
        fs::create_dir_all(overlay.path().join("debug")).unwrap();
        fs::write(overlay.path().join("debug/agent.bt"), "// tuned\n").unwrap();
        let cfg = DebugConfig {
            overlay_dir: Some(overlay.path().to_path_buf()),
            ..Default::default()
        };

        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("agent.bt");
        ResourceProvisioner::from_config(&cfg)
            .provision(&cfg.script_resource, &dest)
            .unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "// tuned\n");

        let plain = ResourceProvisioner::from_config(&DebugConfig::default());
        assert!(plain.overlay.is_none());
    }

    #[test]
    fn unwritable_destination_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing-dir").join("agent.bt");

        let err = ResourceProvisioner::new()
            .provision("debug/agent.bt", &dest)
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Write { path, .. } if path == dest));
    }
}
