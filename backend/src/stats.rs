//! Dispatch statistics
//!
//! A single monotonically increasing counter of real dispatches,
//! reset to zero by day close. The engine mirrors every change to the
//! persistence collaborator so read-only views can show the same total.

use serde::{Deserialize, Serialize};

/// Counts successful dispatches since the last day close.
///
/// # Example
/// ```
/// use taxi_dispatch_core_rs::DispatchCounter;
///
/// let mut counter = DispatchCounter::new();
/// assert_eq!(counter.value(), 0);
///
/// assert_eq!(counter.increment(), 1);
/// assert_eq!(counter.increment(), 2);
///
/// counter.reset();
/// assert_eq!(counter.value(), 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchCounter {
    /// Dispatches recorded since the last reset
    count: u64,
}

impl DispatchCounter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self { count: 0 }
    }

    /// Current total.
    pub fn value(&self) -> u64 {
        self.count
    }

    /// Record one dispatch, returning the new total.
    pub fn increment(&mut self) -> u64 {
        self.count += 1;
        self.count
    }

    /// Day-close reset.
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

impl From<u64> for DispatchCounter {
    /// Restore a counter from a persisted total.
    fn from(count: u64) -> Self {
        Self { count }
    }
}
