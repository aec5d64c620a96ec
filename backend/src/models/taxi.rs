//! Taxi record model
//!
//! Represents a single taxi registered on the dispatch board.
//! Each taxi has:
//! - An operator-assigned id (unique across all stands)
//! - The stand it is currently queued at
//! - Availability status (Available / Unavailable)
//! - A sticky reduced-service flag (set by the out-of-turn removal)
//! - A zero-based position within its stand's queue
//!
//! CRITICAL: `order` values within a stand are dense (0..count, no gaps).
//! The registry and engine are responsible for maintaining that invariant;
//! this module only provides the record and its controlled mutators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A physical taxi stand (queue location).
///
/// The set of stands is a fixed policy constant of the dispatch board,
/// as are the intake stand for new registrations and the precedence
/// used when consolidating queues at day close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stand {
    /// Primary intake stand (airport rank)
    Airport,

    /// Waterfalls stop
    Waterfalls,

    /// Five Corners stop
    FiveCorners,
}

impl Stand {
    /// All stands in display order.
    pub const ALL: [Stand; 3] = [Stand::Airport, Stand::Waterfalls, Stand::FiveCorners];

    /// Stand where newly registered taxis enter service.
    pub const INTAKE: Stand = Stand::Airport;

    /// Fixed consolidation order for day close: remaining queues are
    /// funneled back to the airport preserving this precedence.
    pub const CLOSING_PRECEDENCE: [Stand; 3] =
        [Stand::FiveCorners, Stand::Waterfalls, Stand::Airport];

    /// Human-readable stand name.
    pub fn name(&self) -> &'static str {
        match self {
            Stand::Airport => "airport",
            Stand::Waterfalls => "waterfalls",
            Stand::FiveCorners => "five corners",
        }
    }
}

impl fmt::Display for Stand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Availability status of a taxi within its stand's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxiStatus {
    /// Ready to take the next trip
    Available,

    /// Not ready (driver absent, on a trip, or penalized)
    Unavailable,
}

impl TaxiStatus {
    /// The opposite status.
    pub fn toggled(self) -> Self {
        match self {
            TaxiStatus::Available => TaxiStatus::Unavailable,
            TaxiStatus::Unavailable => TaxiStatus::Available,
        }
    }

    /// True if the taxi can be dispatched.
    pub fn is_available(self) -> bool {
        self == TaxiStatus::Available
    }
}

impl fmt::Display for TaxiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxiStatus::Available => f.write_str("available"),
            TaxiStatus::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// A taxi registered on the dispatch board.
///
/// Records are created by registration, mutated by status toggles,
/// dispatch, reduced-service removal and day close; they are never
/// deleted. The registry owns every record and hands out per-stand
/// ordered views.
///
/// # Example
/// ```
/// use taxi_dispatch_core_rs::{Stand, Taxi, TaxiStatus};
///
/// let mut taxi = Taxi::register("T-101".to_string(), Stand::Airport, 0);
/// assert_eq!(taxi.status(), TaxiStatus::Unavailable);
/// assert!(!taxi.reduced_service());
///
/// taxi.toggle_status();
/// assert!(taxi.is_available());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxi {
    /// Operator-assigned identifier (e.g. plate or fleet number)
    id: String,

    /// Stand the taxi is currently queued at
    stand: Stand,

    /// Availability status
    status: TaxiStatus,

    /// Sticky reduced-service flag: set by the out-of-turn removal,
    /// never cleared by any queue operation. Only a fresh registration
    /// starts unset.
    reduced_service: bool,

    /// Zero-based position within the stand's queue (dense, no gaps)
    order: usize,
}

impl Taxi {
    /// Create a freshly registered taxi.
    ///
    /// New taxis always enter service unavailable, with the
    /// reduced-service flag unset, at the given queue position.
    pub fn register(id: String, stand: Stand, order: usize) -> Self {
        Self {
            id,
            stand,
            status: TaxiStatus::Unavailable,
            reduced_service: false,
            order,
        }
    }

    /// Operator-assigned id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stand the taxi is currently queued at.
    pub fn stand(&self) -> Stand {
        self.stand
    }

    /// Current availability status.
    pub fn status(&self) -> TaxiStatus {
        self.status
    }

    /// True if the taxi can be dispatched.
    pub fn is_available(&self) -> bool {
        self.status.is_available()
    }

    /// Whether the taxi has taken its out-of-turn removal.
    pub fn reduced_service(&self) -> bool {
        self.reduced_service
    }

    /// Zero-based position within the stand's queue.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Flip availability, returning the new status.
    pub fn toggle_status(&mut self) -> TaxiStatus {
        self.status = self.status.toggled();
        self.status
    }

    /// Force a specific status (used by dispatch and removal).
    pub fn set_status(&mut self, status: TaxiStatus) {
        self.status = status;
    }

    /// Set the sticky reduced-service flag. There is deliberately no
    /// way to clear it on an existing record.
    pub fn mark_reduced_service(&mut self) {
        self.reduced_service = true;
    }

    /// Reassign the queue position.
    pub fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    /// Move the taxi to another stand. The caller is responsible for
    /// assigning a valid position in the destination queue.
    pub fn transfer_to(&mut self, stand: Stand) {
        self.stand = stand;
    }
}
