use std::sync::{
    PoisonError, RwLock,
    atomic::{AtomicU64, Ordering},
};

/// Live values exposed by the debug agent.
///
/// Both fields are safe to update and read from any number of threads.
#[derive(Debug, Default)]
pub struct Monitors {
    /// Name of the active workload generator.
    generator_name: RwLock<String>,
    /// Sender tasks created so far.
    sender_tasks: AtomicU64,
}

impl Monitors {
    /// Replace the generator name.
    pub fn set_generator_name(&self, name: impl Into<String>) {
        let name = name.into();
        *self
            .generator_name
            .write()
            .unwrap_or_else(PoisonError::into_inner) = name;
    }

    /// Current generator name, empty until reported.
    pub fn generator_name(&self) -> String {
        self.generator_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Count one more sender task; returns the new total.
    pub fn inc_sender_tasks(&self) -> u64 {
        self.sender_tasks.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Sender tasks created so far.
    pub fn sender_tasks(&self) -> u64 {
        self.sender_tasks.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::Monitors;

    #[test]
    fn defaults_are_empty() {
        let m = Monitors::default();
        assert_eq!(m.generator_name(), "");
        assert_eq!(m.sender_tasks(), 0);
    }

    #[test]
    fn generator_name_is_replaced() {
        let m = Monitors::default();
        m.set_generator_name("LoadGen");
        m.set_generator_name("StressGen");
        assert_eq!(m.generator_name(), "StressGen");
    }

    #[test]
    fn concurrent_increments_are_counted() {
        let m = Arc::new(Monitors::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = m.clone();
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        m.inc_sender_tasks();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(m.sender_tasks(), 4_000);
    }
}
