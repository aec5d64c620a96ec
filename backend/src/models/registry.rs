//! Taxi Registry
//!
//! Owns every taxi record on the board, indexed by id, and answers the
//! one ordered query everything else is built on: the order-ascending
//! queue of a single stand.
//!
//! # Critical Invariants
//!
//! 1. **Id Uniqueness**: each taxi id appears exactly once, across all stands
//! 2. **Dense Orders**: within a stand, `order` values are a permutation
//!    of `0..count` (maintained by the engine's reorder operations;
//!    [`TaxiRegistry::stand_orders_are_dense`] checks it)
//! 3. **No Deletion**: records are only ever added or mutated

use crate::models::taxi::{Stand, Taxi};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during registry operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("taxi id {id:?} is already registered")]
    DuplicateId { id: String },

    #[error("no taxi registered with id {id:?}")]
    TaxiNotFound { id: String },
}

/// Mapping from taxi id to record, with ordered per-stand views.
///
/// # Example
///
/// ```
/// use taxi_dispatch_core_rs::{Stand, TaxiRegistry};
///
/// let mut registry = TaxiRegistry::new();
/// registry.add_taxi("T-1", Stand::Airport).unwrap();
/// registry.add_taxi("T-2", Stand::Airport).unwrap();
///
/// let queue = registry.list_by_stand(Stand::Airport);
/// assert_eq!(queue.len(), 2);
/// assert_eq!(queue[0].id(), "T-1");
/// assert_eq!(queue[1].order(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaxiRegistry {
    /// All taxis on the board, indexed by id
    taxis: HashMap<String, Taxi>,
}

impl TaxiRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            taxis: HashMap::new(),
        }
    }

    /// Register a new taxi at the given stand.
    ///
    /// The new record starts unavailable with the reduced-service flag
    /// unset, queued at the back of the stand (order = current count).
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] if the id is already registered;
    /// nothing is mutated in that case.
    pub fn add_taxi(&mut self, id: &str, stand: Stand) -> Result<&Taxi, RegistryError> {
        let order = self.count_at(stand);
        match self.taxis.entry(id.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateId { id: id.to_string() }),
            Entry::Vacant(slot) => Ok(&*slot.insert(Taxi::register(id.to_string(), stand, order))),
        }
    }

    /// Look up a taxi by id.
    pub fn get(&self, id: &str) -> Result<&Taxi, RegistryError> {
        self.taxis
            .get(id)
            .ok_or_else(|| RegistryError::TaxiNotFound { id: id.to_string() })
    }

    /// Look up a taxi by id for mutation.
    pub fn get_mut(&mut self, id: &str) -> Result<&mut Taxi, RegistryError> {
        self.taxis
            .get_mut(id)
            .ok_or_else(|| RegistryError::TaxiNotFound { id: id.to_string() })
    }

    /// Whether a taxi with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.taxis.contains_key(id)
    }

    /// Ordered queue of a single stand, ascending by `order`.
    ///
    /// This is the one pure query the engine and presentation layers
    /// share; views are never re-derived ad hoc elsewhere.
    pub fn list_by_stand(&self, stand: Stand) -> Vec<&Taxi> {
        let mut queue: Vec<&Taxi> = self
            .taxis
            .values()
            .filter(|taxi| taxi.stand() == stand)
            .collect();
        queue.sort_by_key(|taxi| taxi.order());
        queue
    }

    /// Iterator over every taxi, in unspecified order.
    pub fn taxis(&self) -> impl Iterator<Item = &Taxi> {
        self.taxis.values()
    }

    /// Number of taxis queued at a stand.
    pub fn count_at(&self, stand: Stand) -> usize {
        self.taxis.values().filter(|t| t.stand() == stand).count()
    }

    /// Total number of registered taxis.
    pub fn len(&self) -> usize {
        self.taxis.len()
    }

    /// True if no taxi has been registered.
    pub fn is_empty(&self) -> bool {
        self.taxis.is_empty()
    }

    /// Replace the entire registry contents (full reload from the store
    /// or a snapshot restore).
    pub fn replace_all(&mut self, taxis: Vec<Taxi>) {
        self.taxis = taxis
            .into_iter()
            .map(|taxi| (taxi.id().to_string(), taxi))
            .collect();
    }

    /// Check invariant 2: the stand's `order` values form a dense
    /// zero-based permutation.
    pub fn stand_orders_are_dense(&self, stand: Stand) -> bool {
        let mut orders: Vec<usize> = self
            .taxis
            .values()
            .filter(|t| t.stand() == stand)
            .map(|t| t.order())
            .collect();
        orders.sort_unstable();
        orders.iter().copied().eq(0..orders.len())
    }
}
