use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use perfdbg_core::{Accumulator, DebugAgent, DebugHandle, SumAccumulator};
use perfdbg_exec::subprocess::attach_deps;
use perfdbg_model::DebugConfig;
use perfdbg_observe::{LoggerConfig, init_local_offset, init_logger};
use perfdbg_prometheus::PrometheusRegistry;

/// Generator name reported to the debug agent.
const GENERATOR: &str = "ConstantSpeedGenerator";

/// Concurrent sender tasks started by the demo.
const SENDERS: usize = 8;

/// Messages sent by every sender task.
const MESSAGES_PER_SENDER: u64 = 500;

fn main() -> anyhow::Result<()> {
    // 1) timezone + logger, before any thread exists
    init_local_offset();
    init_logger(&LoggerConfig::from_env()?)?;
    info!("logger initialized");

    // 2) debug agent
    let cfg = DebugConfig::from_env();
    cfg.validate()?;
    let registry = PrometheusRegistry::new();
    let deps = attach_deps(&cfg, Arc::new(registry.clone()));
    let handle = DebugAgent::initialize(&cfg, &deps);

    match handle.instance() {
        Some(agent) if agent.is_attached() => info!(
            pid = ?agent.pid(),
            script = ?agent.script_path(),
            "debug agent attached"
        ),
        Some(agent) => warn!(state = %agent.state(), "running without debug agent"),
        None => warn!("debug agent not initialized"),
    }

    // 3) load
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let total = runtime.block_on(generate(&handle, SENDERS, MESSAGES_PER_SENDER))?;
    info!(total, "load finished");

    // 4) what a scrape would see; the agent stays attached until the handle drops
    info!("metrics:\n{}", registry.render()?);
    drop(handle);
    Ok(())
}

/// Run `senders` tasks sending `messages` each; returns the summed simulated response times.
async fn generate(handle: &DebugHandle, senders: usize, messages: u64) -> anyhow::Result<i64> {
    handle.report_generator_name(GENERATOR);
    let response_times = Arc::new(SumAccumulator::new());

    let mut tasks = Vec::with_capacity(senders);
    for sender in 0..senders {
        handle.report_new_sender_task();
        let response_times = response_times.clone();
        tasks.push(tokio::spawn(async move {
            for message in 0..messages {
                response_times.add(simulated_response_time(sender, message));
                if message % 100 == 99 {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            }
        }));
    }
    for task in tasks {
        task.await?;
    }
    Ok(response_times.result())
}

/// Deterministic stand-in for a measured response time, in microseconds.
fn simulated_response_time(sender: usize, message: u64) -> i64 {
    100 + (sender as i64 * 7 + message as i64 * 13) % 50
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use perfdbg_core::agent::{
        AgentLocator, AgentOptions, AttachDriver, AttachSession, DriverError, LocateError,
    };
    use perfdbg_core::AttachDeps;
    use perfdbg_exec::ResourceProvisioner;
    use perfdbg_model::ProcessId;

    use super::*;

    struct Locator;

    impl AgentLocator for Locator {
        fn locate(&self) -> Result<PathBuf, LocateError> {
            Ok(PathBuf::from("/usr/bin/bpftrace"))
        }
    }

    struct Session;

    impl AttachSession for Session {
        fn describe(&self) -> String {
            "in-process".into()
        }
    }

    struct Driver;

    impl AttachDriver for Driver {
        fn attach(
            &self,
            _pid: ProcessId,
            _agent: &Path,
            _options: &AgentOptions,
        ) -> Result<Box<dyn AttachSession>, DriverError> {
            Ok(Box::new(Session))
        }
    }

    #[tokio::test]
    async fn generate_without_agent_sums_all_messages() {
        let expected: i64 = (0..2)
            .flat_map(|s| (0..10).map(move |m| simulated_response_time(s, m)))
            .sum();

        let total = generate(&DebugHandle::none(), 2, 10).await.unwrap();
        assert_eq!(total, expected);
    }

    #[tokio::test]
    async fn metrics_render_after_load_sees_the_agent() {
        let registry = PrometheusRegistry::new();
        let deps = AttachDeps::new(
            Arc::new(Locator),
            Arc::new(ResourceProvisioner::new()),
            Arc::new(Driver),
            Arc::new(registry.clone()),
        );
        let cfg = DebugConfig {
            agent_name: Some("agentd-test".into()),
            ..Default::default()
        };
        let handle = DebugAgent::initialize(&cfg, &deps);
        assert!(handle.instance().unwrap().is_attached());

        generate(&handle, 3, 5).await.unwrap();

        assert!(handle.instance().unwrap().is_attached());
        let text = registry.render().unwrap();
        assert!(text.contains("sender_tasks_total"));
        assert!(text.contains("} 3"), "{text}");
        assert!(text.contains(GENERATOR));
    }
}
