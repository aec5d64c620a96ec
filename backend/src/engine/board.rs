//! Dispatch Queue Engine
//!
//! Single owner of the board's mutable state: the taxi registry, the
//! dispatch counter and the event log. Every operator intent from the
//! presentation layer lands here as one method call, runs to completion
//! against in-memory state, and is mirrored record-by-record to the
//! persistence collaborator before the call returns.
//!
//! # Operation loop
//!
//! ```text
//! For each operator intent:
//! 1. Resolve the target queue (order-ascending view of one stand)
//! 2. Apply the mutation to the registry / counter
//! 3. Mirror every changed record to the store (bounded retry)
//! 4. Append one event to the log
//! 5. Return the outcome; presentation re-renders from `board()`
//! ```
//!
//! # Failure semantics
//!
//! - "No eligible taxi" conditions are informational outcomes, not
//!   errors: the operation is a no-op and nothing is persisted.
//! - Duplicate registration is rejected before any mutation.
//! - A persistence failure after the retry budget surfaces as
//!   [`EngineError::Persistence`]; the in-memory mutation is kept and
//!   remains authoritative until the next [`DispatchEngine::load`].
//!
//! # Concurrency
//!
//! Single-operator model: every mutating method takes `&mut self`, so
//! an operation can never observe another's partially renumbered
//! queue. Cross-process coordination is the deployment's problem, not
//! this crate's.

use crate::models::event::{Event, EventLog};
use crate::models::registry::{RegistryError, TaxiRegistry};
use crate::models::taxi::{Stand, Taxi, TaxiStatus};
use crate::stats::DispatchCounter;
use crate::store::{DispatchStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::snapshot::SnapshotError;

// ============================================================================
// Configuration Types
// ============================================================================

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Stand where plain registrations enter service
    pub intake_stand: Stand,

    /// Extra attempts per store call after the first one fails
    pub persist_retries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            intake_stand: Stand::INTAKE,
            persist_retries: 3,
        }
    }
}

// ============================================================================
// Outcome Types
// ============================================================================

/// Proof of a successful dispatch, minted once per counter increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchTicket {
    /// Generated ticket id (UUID)
    pub id: String,

    /// Taxi that took the trip
    pub taxi_id: String,

    /// Stand the taxi was dispatched from
    pub stand: Stand,

    /// Dispatch counter value after this dispatch
    pub sequence: u64,
}

impl DispatchTicket {
    fn mint(taxi_id: &str, stand: Stand, sequence: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            taxi_id: taxi_id.to_string(),
            stand,
            sequence,
        }
    }
}

/// Result of [`DispatchEngine::dispatch_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A taxi was dispatched and the stand's queue reshuffled
    Dispatched {
        ticket: DispatchTicket,
        /// Unavailable taxis that were skipped over and moved to the back
        penalized: Vec<String>,
    },

    /// Every taxi at the stand was unavailable; nothing changed
    NoAvailableTaxi,
}

/// Result of [`DispatchEngine::reduced_service_remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The last eligible available taxi was taken out of service
    Removed { taxi_id: String },

    /// No available taxi without the reduced-service flag; nothing changed
    NoEligibleTaxi,
}

/// Result of [`DispatchEngine::close_day`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCloseReport {
    /// Taxis funneled back to the intake stand
    pub taxis_consolidated: usize,
}

/// One stand's ordered queue, as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandQueue {
    pub stand: Stand,
    /// Taxis ascending by queue position
    pub taxis: Vec<Taxi>,
}

/// Full render model: every stand's queue plus the dispatch total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    /// Stands in display order
    pub stands: Vec<StandQueue>,

    /// Dispatches since the last day close
    pub dispatch_count: u64,
}

// ============================================================================
// Errors
// ============================================================================

/// Engine error types
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// Registry rejected the operation (duplicate or unknown id)
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The store kept failing after the retry budget was spent.
    /// The in-memory mutation is preserved; retrying the operation or
    /// reloading are both safe.
    #[error("persistence failed after {attempts} attempt(s): {source}")]
    Persistence {
        #[source]
        source: StoreError,
        attempts: usize,
    },

    /// Snapshot could not be produced or restored
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

// ============================================================================
// Engine
// ============================================================================

/// The dispatch queue engine.
///
/// # Example
///
/// ```
/// use taxi_dispatch_core_rs::{DispatchEngine, DispatchOutcome, InMemoryStore, Stand};
///
/// let mut engine = DispatchEngine::new(Box::new(InMemoryStore::new()));
///
/// engine.add_taxi("T-101").unwrap();
/// engine.add_taxi("T-102").unwrap();
/// engine.toggle_status("T-102").unwrap();
///
/// match engine.dispatch_next(Stand::Airport).unwrap() {
///     DispatchOutcome::Dispatched { ticket, penalized } => {
///         assert_eq!(ticket.taxi_id, "T-102");
///         assert_eq!(ticket.sequence, 1);
///         // T-101 was skipped while unavailable and goes to the back
///         assert_eq!(penalized, vec!["T-101".to_string()]);
///     }
///     DispatchOutcome::NoAvailableTaxi => unreachable!(),
/// }
/// assert_eq!(engine.dispatch_count(), 1);
/// ```
pub struct DispatchEngine {
    /// All taxi records, per-stand ordered views
    registry: TaxiRegistry,

    /// Dispatches since the last day close
    counter: DispatchCounter,

    /// Persistence collaborator
    store: Box<dyn DispatchStore>,

    /// Operation history
    event_log: EventLog,

    /// Tuning knobs
    config: EngineConfig,
}

impl DispatchEngine {
    /// Create an engine with default configuration over the given store.
    ///
    /// The engine starts empty; call [`DispatchEngine::load`] to adopt
    /// state the store already holds.
    pub fn new(store: Box<dyn DispatchStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(store: Box<dyn DispatchStore>, config: EngineConfig) -> Self {
        Self {
            registry: TaxiRegistry::new(),
            counter: DispatchCounter::new(),
            store,
            event_log: EventLog::new(),
            config,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Render model for the presentation layer: every stand's ordered
    /// queue plus the dispatch total.
    pub fn board(&self) -> BoardView {
        BoardView {
            stands: Stand::ALL
                .iter()
                .map(|&stand| StandQueue {
                    stand,
                    taxis: self
                        .registry
                        .list_by_stand(stand)
                        .into_iter()
                        .cloned()
                        .collect(),
                })
                .collect(),
            dispatch_count: self.counter.value(),
        }
    }

    /// Ordered queue of a single stand.
    pub fn list_by_stand(&self, stand: Stand) -> Vec<&Taxi> {
        self.registry.list_by_stand(stand)
    }

    /// Dispatches since the last day close.
    pub fn dispatch_count(&self) -> u64 {
        self.counter.value()
    }

    /// Operation history.
    pub fn events(&self) -> &EventLog {
        &self.event_log
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &TaxiRegistry {
        &self.registry
    }

    /// Read access to the persistence collaborator.
    pub fn store(&self) -> &dyn DispatchStore {
        self.store.as_ref()
    }

    pub(super) fn state_parts(&self) -> (&TaxiRegistry, &DispatchCounter) {
        (&self.registry, &self.counter)
    }

    pub(super) fn replace_state(&mut self, taxis: Vec<Taxi>, count: u64) {
        let loaded = taxis.len();
        self.registry.replace_all(taxis);
        self.counter = DispatchCounter::from(count);
        self.event_log.log(Event::BoardReloaded { taxis: loaded });
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Replace in-memory state with what the store holds.
    ///
    /// This is the defined full-reload point: any mutation the store
    /// missed (after a persistence failure) is overwritten here.
    ///
    /// # Returns
    ///
    /// Number of taxi records loaded.
    pub fn load(&mut self) -> Result<usize, EngineError> {
        let taxis = self.mirror(|store| store.get_all_taxis())?;
        let count = self.mirror(|store| store.get_dispatch_count())?;
        let loaded = taxis.len();
        self.replace_state(taxis, count);
        Ok(loaded)
    }

    /// Register a new taxi at the configured intake stand.
    ///
    /// The record starts unavailable, reduced-service unset, at the
    /// back of the queue.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] (wrapped) if the id is taken;
    /// nothing is mutated or persisted in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use taxi_dispatch_core_rs::{DispatchEngine, InMemoryStore, Stand};
    ///
    /// let mut engine = DispatchEngine::new(Box::new(InMemoryStore::new()));
    /// let taxi = engine.add_taxi("T-1").unwrap();
    ///
    /// assert_eq!(taxi.stand(), Stand::Airport);
    /// assert_eq!(taxi.order(), 0);
    /// assert!(engine.add_taxi("T-1").is_err());
    /// ```
    pub fn add_taxi(&mut self, id: &str) -> Result<Taxi, EngineError> {
        self.add_taxi_at(id, self.config.intake_stand)
    }

    /// Register a new taxi at an explicit stand.
    pub fn add_taxi_at(&mut self, id: &str, stand: Stand) -> Result<Taxi, EngineError> {
        let taxi = self.registry.add_taxi(id, stand)?.clone();
        self.persist_taxi(taxi.id())?;
        self.event_log.log(Event::TaxiRegistered {
            taxi_id: taxi.id().to_string(),
            stand,
        });
        Ok(taxi)
    }

    /// Flip a single taxi's availability. No reordering; the change is
    /// persisted immediately.
    pub fn toggle_status(&mut self, id: &str) -> Result<TaxiStatus, EngineError> {
        let status = self.registry.get_mut(id)?.toggle_status();
        self.persist_taxi(id)?;
        self.event_log.log(Event::StatusToggled {
            taxi_id: id.to_string(),
            status,
        });
        Ok(status)
    }

    /// Dispatch the next available taxi at a stand.
    ///
    /// The first available taxi (lowest order) takes the trip. Taxis
    /// that were skipped over while unavailable are penalized: they
    /// move to the back of the queue, behind the dispatched taxi, which
    /// itself re-enters unavailable. Everything behind the dispatched
    /// taxi moves up. Orders are then reassigned densely, changed
    /// records persisted, and the dispatch counter incremented by one.
    ///
    /// With no available taxi the call reports
    /// [`DispatchOutcome::NoAvailableTaxi`] and leaves the entire state
    /// untouched, counter included.
    pub fn dispatch_next(&mut self, stand: Stand) -> Result<DispatchOutcome, EngineError> {
        let queue: Vec<(String, TaxiStatus)> = self
            .registry
            .list_by_stand(stand)
            .iter()
            .map(|taxi| (taxi.id().to_string(), taxi.status()))
            .collect();

        let dispatched_at = match queue.iter().position(|(_, status)| status.is_available()) {
            Some(position) => position,
            None => return Ok(DispatchOutcome::NoAvailableTaxi),
        };
        let dispatched_id = queue[dispatched_at].0.clone();

        // Unavailable taxis skipped on the way to the dispatched one,
        // keeping their relative order
        let penalized: Vec<String> = queue[..dispatched_at]
            .iter()
            .filter(|(_, status)| !status.is_available())
            .map(|(id, _)| id.clone())
            .collect();

        // New queue: survivors behind the dispatched taxi move up, the
        // dispatched taxi re-enters at the back, penalized taxis last
        let mut reordered: Vec<String> = queue[dispatched_at + 1..]
            .iter()
            .map(|(id, _)| id.clone())
            .filter(|id| !penalized.contains(id))
            .collect();
        reordered.push(dispatched_id.clone());
        reordered.extend(penalized.iter().cloned());

        self.registry
            .get_mut(&dispatched_id)?
            .set_status(TaxiStatus::Unavailable);

        let mut changed: Vec<String> = Vec::new();
        for (position, id) in reordered.iter().enumerate() {
            let taxi = self.registry.get_mut(id)?;
            let moved = taxi.order() != position;
            if moved {
                taxi.set_order(position);
            }
            if moved || *id == dispatched_id {
                changed.push(id.clone());
            }
        }

        for id in &changed {
            self.persist_taxi(id)?;
        }

        let sequence = self.counter.increment();
        self.mirror(|store| store.increment_dispatch_count())?;

        let ticket = DispatchTicket::mint(&dispatched_id, stand, sequence);
        self.event_log.log(Event::TaxiDispatched {
            ticket_id: ticket.id.clone(),
            taxi_id: dispatched_id,
            stand,
            sequence,
            penalized: penalized.clone(),
        });

        Ok(DispatchOutcome::Dispatched { ticket, penalized })
    }

    /// Out-of-turn removal ("tabela baja").
    ///
    /// Scans the stand's queue from the back (highest order) for the
    /// first available taxi that has not already taken this exception,
    /// then sets it unavailable and marks it reduced-service. No
    /// reordering, no counter change.
    pub fn reduced_service_remove(&mut self, stand: Stand) -> Result<RemovalOutcome, EngineError> {
        let candidate = self
            .registry
            .list_by_stand(stand)
            .iter()
            .rev()
            .find(|taxi| taxi.is_available() && !taxi.reduced_service())
            .map(|taxi| taxi.id().to_string());

        let taxi_id = match candidate {
            Some(id) => id,
            None => return Ok(RemovalOutcome::NoEligibleTaxi),
        };

        {
            let taxi = self.registry.get_mut(&taxi_id)?;
            taxi.set_status(TaxiStatus::Unavailable);
            taxi.mark_reduced_service();
        }
        self.persist_taxi(&taxi_id)?;
        self.event_log.log(Event::ReducedServiceRemoval {
            taxi_id: taxi_id.clone(),
            stand,
        });
        Ok(RemovalOutcome::Removed { taxi_id })
    }

    /// End-of-day consolidation.
    ///
    /// Concatenates the per-stand queues in the fixed closing
    /// precedence (five corners, waterfalls, airport), reassigns every
    /// taxi to the intake stand with its position in that concatenation
    /// as the new order, persists all records, and resets the dispatch
    /// counter. Reduced-service flags survive; relative seniority
    /// across stands is preserved by the precedence.
    pub fn close_day(&mut self) -> Result<DayCloseReport, EngineError> {
        let mut consolidated: Vec<String> = Vec::new();
        for stand in Stand::CLOSING_PRECEDENCE {
            consolidated.extend(
                self.registry
                    .list_by_stand(stand)
                    .iter()
                    .map(|taxi| taxi.id().to_string()),
            );
        }

        for (position, id) in consolidated.iter().enumerate() {
            let taxi = self.registry.get_mut(id)?;
            taxi.transfer_to(Stand::INTAKE);
            taxi.set_order(position);
        }

        for id in &consolidated {
            self.persist_taxi(id)?;
        }

        self.counter.reset();
        self.mirror(|store| store.reset_dispatch_count())?;

        self.event_log.log(Event::DayClosed {
            taxis_consolidated: consolidated.len(),
        });
        Ok(DayCloseReport {
            taxis_consolidated: consolidated.len(),
        })
    }

    // ========================================================================
    // Store mirroring
    // ========================================================================

    /// Run one store call with the configured retry budget.
    ///
    /// Attempts = 1 + `persist_retries`; exhaustion maps to
    /// [`EngineError::Persistence`] with the final cause and the number
    /// of attempts made.
    fn mirror<T>(
        &mut self,
        mut call: impl FnMut(&mut dyn DispatchStore) -> Result<T, StoreError>,
    ) -> Result<T, EngineError> {
        let max_attempts = self.config.persist_retries + 1;
        let mut attempts = 0;
        loop {
            attempts += 1;
            match call(self.store.as_mut()) {
                Ok(value) => return Ok(value),
                Err(source) if attempts >= max_attempts => {
                    return Err(EngineError::Persistence { source, attempts })
                }
                Err(_) => {}
            }
        }
    }

    /// Mirror one taxi record to the store.
    fn persist_taxi(&mut self, id: &str) -> Result<(), EngineError> {
        let taxi = self.registry.get(id)?.clone();
        self.mirror(|store| store.put_taxi(&taxi))
    }
}
