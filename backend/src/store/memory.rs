//! In-memory store
//!
//! Reference [`DispatchStore`] backed by a HashMap. Used as the default
//! collaborator in tests and demos, with a small fault-injection knob
//! so the engine's retry path can be exercised deterministically.

use crate::models::taxi::Taxi;
use crate::store::{DispatchStore, StoreError};
use std::collections::HashMap;

/// HashMap-backed persistence collaborator.
///
/// # Example
/// ```
/// use taxi_dispatch_core_rs::{DispatchStore, InMemoryStore, Stand, Taxi};
///
/// let mut store = InMemoryStore::new();
/// let taxi = Taxi::register("T-1".to_string(), Stand::Airport, 0);
///
/// store.put_taxi(&taxi).unwrap();
/// assert_eq!(store.get_all_taxis().unwrap().len(), 1);
/// assert_eq!(store.increment_dispatch_count().unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    /// Persisted records, keyed by taxi id
    taxis: HashMap<String, Taxi>,

    /// Persisted dispatch total
    dispatch_count: u64,

    /// Remaining puts that will fail with `StoreError::Unavailable`
    fail_next_puts: usize,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` calls to [`DispatchStore::put_taxi`] fail.
    ///
    /// Fault injection for retry tests; each failing call consumes one
    /// from the budget, so a store with `fail_next_puts(2)` recovers on
    /// the third attempt.
    pub fn fail_next_puts(&mut self, n: usize) {
        self.fail_next_puts = n;
    }

    /// Persisted record for one taxi, if present.
    pub fn get_taxi(&self, id: &str) -> Option<&Taxi> {
        self.taxis.get(id)
    }

    /// Number of persisted records.
    pub fn len(&self) -> usize {
        self.taxis.len()
    }

    /// True if nothing has been persisted.
    pub fn is_empty(&self) -> bool {
        self.taxis.is_empty()
    }
}

impl DispatchStore for InMemoryStore {
    fn get_all_taxis(&self) -> Result<Vec<Taxi>, StoreError> {
        Ok(self.taxis.values().cloned().collect())
    }

    fn put_taxi(&mut self, taxi: &Taxi) -> Result<(), StoreError> {
        if self.fail_next_puts > 0 {
            self.fail_next_puts -= 1;
            return Err(StoreError::Unavailable {
                reason: "injected put failure".to_string(),
            });
        }
        self.taxis.insert(taxi.id().to_string(), taxi.clone());
        Ok(())
    }

    fn get_dispatch_count(&self) -> Result<u64, StoreError> {
        Ok(self.dispatch_count)
    }

    fn increment_dispatch_count(&mut self) -> Result<u64, StoreError> {
        self.dispatch_count += 1;
        Ok(self.dispatch_count)
    }

    fn reset_dispatch_count(&mut self) -> Result<(), StoreError> {
        self.dispatch_count = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::taxi::Stand;

    #[test]
    fn test_put_is_upsert() {
        let mut store = InMemoryStore::new();
        let mut taxi = Taxi::register("T-1".to_string(), Stand::Airport, 0);

        store.put_taxi(&taxi).unwrap();
        taxi.set_order(4);
        store.put_taxi(&taxi).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_taxi("T-1").unwrap().order(), 4);
    }

    #[test]
    fn test_counter_round_trip() {
        let mut store = InMemoryStore::new();

        assert_eq!(store.get_dispatch_count().unwrap(), 0);
        assert_eq!(store.increment_dispatch_count().unwrap(), 1);
        assert_eq!(store.increment_dispatch_count().unwrap(), 2);

        store.reset_dispatch_count().unwrap();
        assert_eq!(store.get_dispatch_count().unwrap(), 0);
    }

    #[test]
    fn test_fault_injection_consumes_budget() {
        let mut store = InMemoryStore::new();
        let taxi = Taxi::register("T-1".to_string(), Stand::Airport, 0);

        store.fail_next_puts(2);
        assert!(store.put_taxi(&taxi).is_err());
        assert!(store.put_taxi(&taxi).is_err());
        assert!(store.put_taxi(&taxi).is_ok());
        assert_eq!(store.len(), 1);
    }
}
