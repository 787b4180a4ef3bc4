use std::sync::atomic::{AtomicI64, Ordering};

/// The shared counter behind the demo widget.
///
/// One store is created per server and handed to the [`Dispatcher`] at construction; every read
/// and mutation goes through the single atomic inside it, so concurrent requests are serialized
/// without a lock. The value lives as long as the process, and starts at 0.
///
/// Arithmetic wraps on overflow (two's complement): adding 1 to `i64::MAX` yields `i64::MIN`.
///
/// [`Dispatcher`]: crate::Dispatcher
#[derive(Debug, Default)]
pub struct CounterStore {
    value: AtomicI64,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `value`.
    pub fn with_value(value: i64) -> Self {
        Self {
            value: AtomicI64::new(value),
        }
    }

    pub fn read(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Add `delta` and return the value this call produced.
    pub fn add(&self, delta: i64) -> i64 {
        // fetch_add wraps, and returns the previous value.
        self.value
            .fetch_add(delta, Ordering::SeqCst)
            .wrapping_add(delta)
    }

    /// Set the value back to 0. Always returns 0.
    pub fn reset(&self) -> i64 {
        self.value.store(0, Ordering::SeqCst);
        0
    }
}
