//! Persistence collaborator
//!
//! The engine does not own durable state; it mirrors every changed
//! record and counter update to a [`DispatchStore`]. The trait captures
//! the shape of that collaborator without fixing a transport: a
//! deployment typically speaks JSON over HTTP to a small REST backend,
//! and any implementation with these five capabilities slots in.
//!
//! In-memory state stays authoritative between mirror calls: a failed
//! put is retried by the engine and, if it keeps failing, surfaced as a
//! retryable error while the board keeps serving from memory until the
//! next full reload.

use crate::models::taxi::Taxi;
use thiserror::Error;

pub mod memory;

pub use memory::InMemoryStore;

/// Errors reported by a persistence collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or refused the write
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The store answered with data the engine cannot use
    #[error("store returned corrupt data: {0}")]
    Corrupt(String),
}

/// Capabilities the engine requires from its persistence collaborator.
///
/// Implementations must treat each call as independent; the engine
/// handles retries and ordering. [`memory::InMemoryStore`] is the
/// reference implementation used throughout the test suite.
pub trait DispatchStore {
    /// Fetch every persisted taxi record, in unspecified order.
    fn get_all_taxis(&self) -> Result<Vec<Taxi>, StoreError>;

    /// Upsert a single taxi record.
    fn put_taxi(&mut self, taxi: &Taxi) -> Result<(), StoreError>;

    /// Current persisted dispatch total.
    fn get_dispatch_count(&self) -> Result<u64, StoreError>;

    /// Add one to the persisted dispatch total, returning the new value.
    fn increment_dispatch_count(&mut self) -> Result<u64, StoreError>;

    /// Zero the persisted dispatch total (day close).
    fn reset_dispatch_count(&mut self) -> Result<(), StoreError>;
}
