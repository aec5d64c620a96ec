//! Event logging for board auditing and replay.
//!
//! Every mutating engine operation appends one event describing what
//! changed. The log is the board's observability surface: an operator
//! console can tail it, a consulta view can show the last dispatch, and
//! a test can assert the exact history of a scenario.
//!
//! # Event Types
//!
//! - **TaxiRegistered**: a new record entered the board
//! - **StatusToggled**: single-taxi availability flip
//! - **TaxiDispatched**: successful dispatch with its penalty set
//! - **ReducedServiceRemoval**: out-of-turn removal ("tabela baja")
//! - **DayClosed**: end-of-day consolidation
//! - **BoardReloaded**: full reload from the store or a snapshot

use crate::models::taxi::{Stand, TaxiStatus};

/// A recorded state change on the dispatch board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// New taxi registered at a stand
    TaxiRegistered { taxi_id: String, stand: Stand },

    /// Availability flipped for a single taxi (no reordering)
    StatusToggled { taxi_id: String, status: TaxiStatus },

    /// A taxi was dispatched and its stand's queue reshuffled
    TaxiDispatched {
        /// Generated ticket id for the trip
        ticket_id: String,
        taxi_id: String,
        stand: Stand,
        /// Dispatch counter value after this dispatch
        sequence: u64,
        /// Ids of the unavailable taxis moved to the back of the queue
        penalized: Vec<String>,
    },

    /// Out-of-turn removal of the last eligible available taxi
    ReducedServiceRemoval { taxi_id: String, stand: Stand },

    /// End-of-day consolidation back to the intake stand
    DayClosed { taxis_consolidated: usize },

    /// Full in-memory state replacement from the store or a snapshot
    BoardReloaded { taxis: usize },
}

impl Event {
    /// Short type tag, useful for filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::TaxiRegistered { .. } => "taxi_registered",
            Event::StatusToggled { .. } => "status_toggled",
            Event::TaxiDispatched { .. } => "taxi_dispatched",
            Event::ReducedServiceRemoval { .. } => "reduced_service_removal",
            Event::DayClosed { .. } => "day_closed",
            Event::BoardReloaded { .. } => "board_reloaded",
        }
    }

    /// The taxi this event concerns, if it concerns exactly one.
    pub fn taxi_id(&self) -> Option<&str> {
        match self {
            Event::TaxiRegistered { taxi_id, .. }
            | Event::StatusToggled { taxi_id, .. }
            | Event::TaxiDispatched { taxi_id, .. }
            | Event::ReducedServiceRemoval { taxi_id, .. } => Some(taxi_id),
            Event::DayClosed { .. } | Event::BoardReloaded { .. } => None,
        }
    }
}

/// Append-only log of board events, in operation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Most recent event, if any
    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events touching a specific taxi
    pub fn events_for_taxi(&self, taxi_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.taxi_id() == Some(taxi_id))
            .collect()
    }
}
