use std::sync::{Arc, Mutex, PoisonError};

use prometheus::{
    IntCounter, IntGaugeVec, Opts,
    core::{Collector, Desc},
    proto::MetricFamily,
};

use perfdbg_core::Monitors;

/// Prometheus collector reading [`Monitors`] at scrape time.
///
/// ## Metrics
/// - `<ns>_generator_info{agent, generator}` - `1` for the generator currently reported
/// - `<ns>_sender_tasks_total{agent}` - sender tasks created so far
pub struct MonitorsCollector {
    monitors: Arc<Monitors>,
    generator: IntGaugeVec,
    sender_tasks: IntCounter,
    /// Keeps concurrent scrapes from applying the same counter delta twice.
    sync: Mutex<()>,
}

impl MonitorsCollector {
    /// Create a collector for `monitors` registered as `name` under `namespace`.
    pub fn new(
        namespace: &str,
        name: &str,
        monitors: Arc<Monitors>,
    ) -> Result<Self, prometheus::Error> {
        let generator = IntGaugeVec::new(
            Opts::new("generator_info", "Workload generator currently in use")
                .namespace(namespace)
                .const_label("agent", name),
            &["generator"],
        )?;
        let sender_tasks = IntCounter::with_opts(
            Opts::new("sender_tasks_total", "Total number of sender tasks created")
                .namespace(namespace)
                .const_label("agent", name),
        )?;

        Ok(Self {
            monitors,
            generator,
            sender_tasks,
            sync: Mutex::new(()),
        })
    }
}

impl Collector for MonitorsCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.generator
            .desc()
            .into_iter()
            .chain(self.sender_tasks.desc())
            .collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let _guard = self.sync.lock().unwrap_or_else(PoisonError::into_inner);

        let generator = self.monitors.generator_name();
        self.generator.reset();
        self.generator
            .with_label_values(&[generator.as_str()])
            .set(1);

        let total = self.monitors.sender_tasks();
        let exported = self.sender_tasks.get();
        if total > exported {
            self.sender_tasks.inc_by(total - exported);
        }

        let mut families = self.generator.collect();
        families.extend(self.sender_tasks.collect());
        families
    }
}
