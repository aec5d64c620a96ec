//! Taxi Dispatch Board Core - Rust Engine
//!
//! Queue engine for a multi-stand taxi dispatch board: ordered queues,
//! availability toggling, dispatch with penalty reordering, out-of-turn
//! removal, and end-of-day consolidation.
//!
//! # Architecture
//!
//! - **models**: Domain types (Taxi, Stand, Registry, Event)
//! - **engine**: Board operations and snapshots
//! - **store**: Persistence collaborator trait + in-memory reference
//! - **stats**: Dispatch counter
//!
//! # Critical Invariants
//!
//! 1. Taxi ids are unique across all stands
//! 2. Within a stand, `order` values are a dense 0-based permutation
//! 3. The reduced-service flag is sticky: only a fresh registration starts unset
//! 4. Each mutating operation is atomic; in-memory state is authoritative
//!    over the persistence collaborator between full reloads

// Module declarations
pub mod engine;
pub mod models;
pub mod stats;
pub mod store;

// Re-exports for convenience
pub use crate::engine::{
    BoardSnapshot, BoardView, DayCloseReport, DispatchEngine, DispatchOutcome, DispatchTicket,
    EngineConfig, EngineError, RemovalOutcome, SnapshotError, StandQueue,
};
pub use crate::models::{
    event::{Event, EventLog},
    registry::{RegistryError, TaxiRegistry},
    taxi::{Stand, Taxi, TaxiStatus},
};
pub use crate::stats::DispatchCounter;
pub use crate::store::{DispatchStore, InMemoryStore, StoreError};
