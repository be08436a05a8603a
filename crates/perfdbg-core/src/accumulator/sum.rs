use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::accumulator::Accumulator;

/// Running sum of reported values.
///
/// A single mutex guards the total instead of an atomic so that derived state
/// added next to the sum is always updated together with it.
///
/// ## Overflow
/// Additions wrap around on `i64` overflow (two's complement), the same way a
/// release build treats plain integer arithmetic. Nothing saturates or panics.
#[derive(Debug, Default)]
pub struct SumAccumulator {
    sum: Mutex<i64>,
}

impl SumAccumulator {
    /// Create an accumulator with a zero total.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, i64> {
        self.sum.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Accumulator for SumAccumulator {
    type Value = i64;

    fn add(&self, value: i64) {
        let mut sum = self.lock();
        *sum = sum.wrapping_add(value);
    }

    fn result(&self) -> i64 {
        *self.lock()
    }

    fn reset(&self) {
        *self.lock() = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(SumAccumulator::new().result(), 0);
    }

    #[test]
    fn sums_all_added_values() {
        let acc = SumAccumulator::new();
        let values = [5, -3, 120, 0, 7_000_000_000];
        for v in values {
            acc.add(v);
        }
        assert_eq!(acc.result(), values.iter().sum::<i64>());
        // reading does not reset
        assert_eq!(acc.result(), values.iter().sum::<i64>());
    }

    #[test]
    fn reset_returns_to_zero() {
        let acc = SumAccumulator::new();
        acc.add(42);
        acc.add(-1);
        acc.reset();
        assert_eq!(acc.result(), 0);

        acc.add(3);
        assert_eq!(acc.result(), 3);
    }

    #[test]
    fn overflow_wraps() {
        let acc = SumAccumulator::new();
        acc.add(i64::MAX);
        acc.add(1);
        assert_eq!(acc.result(), i64::MIN);
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let acc = Arc::new(SumAccumulator::new());
        let threads = 8;
        let per_thread = 10_000;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let acc = acc.clone();
                thread::spawn(move || {
                    for i in 0..per_thread {
                        acc.add(t * per_thread + i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let n = threads * per_thread;
        assert_eq!(acc.result(), n * (n - 1) / 2);
    }
}
