use std::sync::Arc;

use perfdbg_model::{MARKER_PROPERTY, ProcessId};

use crate::resolver::{
    Introspector, Probe, ProbeError, Publication, marker::unique_token, read_property,
};

/// Source of the runtime's self-reported name, conventionally `<id>@<host>`.
pub trait RuntimeName: Send + Sync {
    fn runtime_name(&self) -> Option<String>;
}

/// Runtime name of the current process: `<pid>@<hostname>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostRuntimeName;

impl RuntimeName for HostRuntimeName {
    fn runtime_name(&self) -> Option<String> {
        Some(format!("{}@{}", std::process::id(), hostname()?))
    }
}

#[cfg(unix)]
fn hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc != 0 {
        return None;
    }
    let len = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    Some(String::from_utf8_lossy(&buf[..len]).into_owned())
}

#[cfg(not(unix))]
fn hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok()
}

/// Last resort: take the id from the runtime name and confirm it with a marker.
pub struct RuntimeNameProbe {
    source: Arc<dyn RuntimeName>,
    introspector: Arc<dyn Introspector>,
}

impl RuntimeNameProbe {
    pub fn new(source: Arc<dyn RuntimeName>, introspector: Arc<dyn Introspector>) -> Self {
        Self {
            source,
            introspector,
        }
    }

    /// Identifier prefix of `<id>@<host>`.
    fn parse(name: &str) -> Result<ProcessId, ProbeError> {
        let Some((id, _host)) = name.split_once('@') else {
            return Err(ProbeError::Malformed(format!("runtime name '{name}' has no '@'")));
        };
        Ok(id.parse::<ProcessId>()?)
    }
}

impl Probe for RuntimeNameProbe {
    fn name(&self) -> &'static str {
        "runtime-name"
    }

    fn probe(&self) -> Result<ProcessId, ProbeError> {
        let name = self
            .source
            .runtime_name()
            .ok_or_else(|| ProbeError::Unavailable("runtime name".into()))?;
        let pid = Self::parse(&name)?;

        let introspector = self.introspector.as_ref();
        let token = unique_token();
        let _publication = Publication::new(introspector, MARKER_PROPERTY, &token)?;

        match read_property(introspector, pid, MARKER_PROPERTY) {
            Some(value) if value == token => Ok(pid),
            _ => Err(ProbeError::Mismatch(pid)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testing::FakeIntrospector;

    struct Named(Option<&'static str>);

    impl RuntimeName for Named {
        fn runtime_name(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn probe(name: Option<&'static str>, fake: Arc<FakeIntrospector>) -> Result<ProcessId, ProbeError> {
        RuntimeNameProbe::new(Arc::new(Named(name)), fake).probe()
    }

    #[test]
    fn parse_extracts_prefix() {
        assert_eq!(RuntimeNameProbe::parse("1234@hostname").unwrap().get(), 1234);
        assert_eq!(RuntimeNameProbe::parse("1@a@b").unwrap().get(), 1);
    }

    #[test]
    fn parse_rejects_bad_names() {
        for bad in ["1234", "@host", "abc@host", "12x@host", ""] {
            assert!(RuntimeNameProbe::parse(bad).is_err(), "expected error for {bad:?}");
        }
    }

    #[test]
    fn confirmed_id_is_returned() {
        let fake = Arc::new(FakeIntrospector::with_own(1234));
        assert_eq!(probe(Some("1234@hostname"), fake).unwrap().get(), 1234);
    }

    #[test]
    fn id_of_another_process_is_rejected() {
        let fake = Arc::new(FakeIntrospector::with_own(1));
        fake.add_other(1234, MARKER_PROPERTY, "not-our-token");

        let err = probe(Some("1234@hostname"), fake).unwrap_err();
        assert!(matches!(err, ProbeError::Mismatch(pid) if pid.get() == 1234));
    }

    #[test]
    fn unknown_process_is_rejected() {
        let fake = Arc::new(FakeIntrospector::with_own(1));
        let err = probe(Some("4321@hostname"), fake).unwrap_err();
        assert!(matches!(err, ProbeError::Mismatch(_)));
    }

    #[test]
    fn missing_name_is_unavailable() {
        let fake = Arc::new(FakeIntrospector::with_own(1));
        let err = probe(None, fake).unwrap_err();
        assert!(matches!(err, ProbeError::Unavailable(_)));
    }

    #[test]
    fn host_runtime_name_starts_with_own_pid() {
        let name = HostRuntimeName.runtime_name().unwrap();
        assert!(name.starts_with(&format!("{}@", std::process::id())));
    }
}
