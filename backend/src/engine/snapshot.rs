//! Snapshot - Save/Restore Board State
//!
//! Serializes the complete board (every taxi record plus the dispatch
//! counter) into a self-validating value that round-trips through JSON.
//!
//! # Critical Invariants
//!
//! - **Integrity**: the snapshot carries a SHA256 hash of its payload;
//!   restore rejects tampered or truncated state
//! - **Id Uniqueness**: no taxi id appears twice
//! - **Dense Orders**: every stand's orders form a 0-based permutation
//!
//! Restore replaces in-memory state only; the persistence collaborator
//! is untouched and re-converges as subsequent operations mirror their
//! changes.

use crate::engine::board::{DispatchEngine, EngineError};
use crate::models::taxi::{Stand, Taxi};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while producing or adopting a snapshot
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),

    #[error("snapshot hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch { expected: String, computed: String },

    #[error("snapshot contains duplicate taxi id {id:?}")]
    DuplicateTaxiId { id: String },

    #[error("snapshot orders for the {stand} stand are not dense")]
    CorruptOrders { stand: Stand },
}

/// Complete board state snapshot.
///
/// Taxis are listed per stand in queue order, so equal board states
/// produce byte-identical payloads and therefore equal hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Every taxi record, grouped by stand in queue order
    pub taxis: Vec<Taxi>,

    /// Dispatch counter value
    pub dispatch_count: u64,

    /// SHA256 hash of the serialized payload above
    pub state_hash: String,
}

// ============================================================================
// State Hashing
// ============================================================================

/// Compute the deterministic SHA256 hash of a snapshot payload.
///
/// The payload contains no maps, so plain JSON serialization is already
/// canonical: field order is fixed by the struct definitions and taxi
/// order is fixed by the snapshot builder.
pub fn compute_state_hash(taxis: &[Taxi], dispatch_count: u64) -> Result<String, SnapshotError> {
    let payload = serde_json::to_string(&(taxis, dispatch_count))
        .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation
// ============================================================================

/// Validate snapshot integrity: unique ids and dense per-stand orders.
pub fn validate_snapshot(snapshot: &BoardSnapshot) -> Result<(), SnapshotError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(snapshot.taxis.len());
    for taxi in &snapshot.taxis {
        if !seen.insert(taxi.id()) {
            return Err(SnapshotError::DuplicateTaxiId {
                id: taxi.id().to_string(),
            });
        }
    }

    for stand in Stand::ALL {
        let mut orders: Vec<usize> = snapshot
            .taxis
            .iter()
            .filter(|taxi| taxi.stand() == stand)
            .map(|taxi| taxi.order())
            .collect();
        orders.sort_unstable();
        if !orders.iter().copied().eq(0..orders.len()) {
            return Err(SnapshotError::CorruptOrders { stand });
        }
    }

    Ok(())
}

// ============================================================================
// Engine Integration
// ============================================================================

impl DispatchEngine {
    /// Capture the current board as a self-validating snapshot.
    ///
    /// # Example
    ///
    /// ```
    /// use taxi_dispatch_core_rs::{DispatchEngine, InMemoryStore};
    ///
    /// let mut engine = DispatchEngine::new(Box::new(InMemoryStore::new()));
    /// engine.add_taxi("T-1").unwrap();
    ///
    /// let snapshot = engine.snapshot().unwrap();
    /// assert_eq!(snapshot.taxis.len(), 1);
    ///
    /// let json = serde_json::to_string(&snapshot).unwrap();
    /// let mut other = DispatchEngine::new(Box::new(InMemoryStore::new()));
    /// other.restore(serde_json::from_str(&json).unwrap()).unwrap();
    /// assert!(other.registry().contains("T-1"));
    /// ```
    pub fn snapshot(&self) -> Result<BoardSnapshot, EngineError> {
        let (registry, counter) = self.state_parts();

        let mut taxis: Vec<Taxi> = Vec::with_capacity(registry.len());
        for stand in Stand::ALL {
            taxis.extend(registry.list_by_stand(stand).into_iter().cloned());
        }

        let state_hash = compute_state_hash(&taxis, counter.value())?;
        Ok(BoardSnapshot {
            taxis,
            dispatch_count: counter.value(),
            state_hash,
        })
    }

    /// Replace in-memory state with a validated snapshot.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::HashMismatch`] (wrapped) if the payload does
    /// not match its hash; [`SnapshotError::DuplicateTaxiId`] or
    /// [`SnapshotError::CorruptOrders`] if the payload violates board
    /// invariants. State is untouched on any error.
    pub fn restore(&mut self, snapshot: BoardSnapshot) -> Result<(), EngineError> {
        let computed = compute_state_hash(&snapshot.taxis, snapshot.dispatch_count)?;
        if computed != snapshot.state_hash {
            return Err(SnapshotError::HashMismatch {
                expected: snapshot.state_hash,
                computed,
            }
            .into());
        }

        validate_snapshot(&snapshot)?;
        self.replace_state(snapshot.taxis, snapshot.dispatch_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let taxis = vec![
            Taxi::register("A".to_string(), Stand::Airport, 0),
            Taxi::register("B".to_string(), Stand::Airport, 1),
        ];

        let h1 = compute_state_hash(&taxis, 3).unwrap();
        let h2 = compute_state_hash(&taxis, 3).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_hash_changes_with_counter() {
        let taxis = vec![Taxi::register("A".to_string(), Stand::Airport, 0)];

        let h1 = compute_state_hash(&taxis, 0).unwrap();
        let h2 = compute_state_hash(&taxis, 1).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let taxis = vec![
            Taxi::register("A".to_string(), Stand::Airport, 0),
            Taxi::register("A".to_string(), Stand::Waterfalls, 0),
        ];
        let state_hash = compute_state_hash(&taxis, 0).unwrap();
        let snapshot = BoardSnapshot {
            taxis,
            dispatch_count: 0,
            state_hash,
        };

        assert_eq!(
            validate_snapshot(&snapshot).unwrap_err(),
            SnapshotError::DuplicateTaxiId {
                id: "A".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_order_gap() {
        let taxis = vec![
            Taxi::register("A".to_string(), Stand::Airport, 0),
            Taxi::register("B".to_string(), Stand::Airport, 2),
        ];
        let state_hash = compute_state_hash(&taxis, 0).unwrap();
        let snapshot = BoardSnapshot {
            taxis,
            dispatch_count: 0,
            state_hash,
        };

        assert_eq!(
            validate_snapshot(&snapshot).unwrap_err(),
            SnapshotError::CorruptOrders {
                stand: Stand::Airport
            }
        );
    }
}
