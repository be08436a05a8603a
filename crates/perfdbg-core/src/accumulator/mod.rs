//! Thread-safe accumulators used by reporters.
mod sum;
pub use sum::SumAccumulator;

/// Accumulates reported values into a single result.
///
/// Implementations must keep `add`, `result` and `reset` mutually exclusive so that a result never observes a
/// half-applied update.
pub trait Accumulator: Send + Sync {
    /// Accumulated value type.
    type Value;

    /// Fold `value` into the accumulated state.
    fn add(&self, value: Self::Value);
    /// Current result; does not reset.
    fn result(&self) -> Self::Value;
    /// Return to the initial state.
    fn reset(&self);
}
