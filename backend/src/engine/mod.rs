//! Dispatch Queue Engine - board operations
//!
//! Implements every operator intent against the board: registration,
//! status toggles, dispatch with penalty reordering, out-of-turn
//! removal, and day close.
//!
//! See `board.rs` for the operations and `snapshot.rs` for
//! save/restore.

pub mod board;
pub mod snapshot;

// Re-export main types for convenience
pub use board::{
    BoardView, DayCloseReport, DispatchEngine, DispatchOutcome, DispatchTicket, EngineConfig,
    EngineError, RemovalOutcome, StandQueue,
};

// Re-export snapshot types
pub use snapshot::{BoardSnapshot, SnapshotError};
