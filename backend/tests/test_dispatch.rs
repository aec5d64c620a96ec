//! Dispatch Tests - penalty reordering and counter behavior
//!
//! Covers the core dispatch algorithm:
//! - First available taxi takes the trip
//! - Skipped unavailable taxis are penalized to the back of the queue
//! - Orders are reassigned densely after every dispatch
//! - The no-op branch leaves the entire state untouched

use taxi_dispatch_core_rs::{
    DispatchEngine, DispatchOutcome, InMemoryStore, Stand, TaxiStatus,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Build an engine with the given taxis, registered in slice order.
fn board_with(taxis: &[(&str, Stand, TaxiStatus)]) -> DispatchEngine {
    let mut engine = DispatchEngine::new(Box::new(InMemoryStore::new()));
    for (id, stand, status) in taxis {
        engine.add_taxi_at(id, *stand).expect("registration failed");
        if *status == TaxiStatus::Available {
            engine.toggle_status(id).expect("toggle failed");
        }
    }
    engine
}

fn queue_ids(engine: &DispatchEngine, stand: Stand) -> Vec<String> {
    engine
        .list_by_stand(stand)
        .iter()
        .map(|t| t.id().to_string())
        .collect()
}

// ============================================================================
// Penalty Reordering
// ============================================================================

#[test]
fn test_dispatch_penalizes_skipped_unavailable_taxis() {
    // Queue: a(U) b(A) c(U) d(A) with orders 0..3
    let mut engine = board_with(&[
        ("a", Stand::Airport, TaxiStatus::Unavailable),
        ("b", Stand::Airport, TaxiStatus::Available),
        ("c", Stand::Airport, TaxiStatus::Unavailable),
        ("d", Stand::Airport, TaxiStatus::Available),
    ]);

    let outcome = engine.dispatch_next(Stand::Airport).unwrap();
    match outcome {
        DispatchOutcome::Dispatched { ticket, penalized } => {
            assert_eq!(ticket.taxi_id, "b");
            assert_eq!(ticket.stand, Stand::Airport);
            assert_eq!(ticket.sequence, 1);
            // Only `a` was skipped while unavailable; `c` sat behind `b`
            assert_eq!(penalized, vec!["a".to_string()]);
        }
        DispatchOutcome::NoAvailableTaxi => panic!("expected a dispatch"),
    }

    // New queue: the taxis behind `b` move up, `b` re-enters
    // unavailable, then the penalized `a`
    assert_eq!(queue_ids(&engine, Stand::Airport), vec!["c", "d", "b", "a"]);

    let queue = engine.list_by_stand(Stand::Airport);
    for (position, taxi) in queue.iter().enumerate() {
        assert_eq!(taxi.order(), position);
    }

    // The dispatched taxi is forced unavailable; the penalized taxi
    // keeps its (unavailable) status, `d` keeps its availability
    assert_eq!(
        engine.registry().get("b").unwrap().status(),
        TaxiStatus::Unavailable
    );
    assert_eq!(
        engine.registry().get("a").unwrap().status(),
        TaxiStatus::Unavailable
    );
    assert!(engine.registry().get("d").unwrap().is_available());

    assert_eq!(engine.dispatch_count(), 1);
}

#[test]
fn test_dispatch_head_of_queue_no_penalty() {
    let mut engine = board_with(&[
        ("a", Stand::Airport, TaxiStatus::Available),
        ("b", Stand::Airport, TaxiStatus::Available),
    ]);

    match engine.dispatch_next(Stand::Airport).unwrap() {
        DispatchOutcome::Dispatched { ticket, penalized } => {
            assert_eq!(ticket.taxi_id, "a");
            assert!(penalized.is_empty());
        }
        DispatchOutcome::NoAvailableTaxi => panic!("expected a dispatch"),
    }

    assert_eq!(queue_ids(&engine, Stand::Airport), vec!["b", "a"]);
}

#[test]
fn test_dispatch_last_in_queue_moves_all_skipped_back() {
    // Every taxi ahead of the available one is unavailable
    let mut engine = board_with(&[
        ("u1", Stand::Airport, TaxiStatus::Unavailable),
        ("u2", Stand::Airport, TaxiStatus::Unavailable),
        ("x", Stand::Airport, TaxiStatus::Available),
    ]);

    match engine.dispatch_next(Stand::Airport).unwrap() {
        DispatchOutcome::Dispatched { penalized, .. } => {
            // Relative order of the penalized taxis is preserved
            assert_eq!(penalized, vec!["u1".to_string(), "u2".to_string()]);
        }
        DispatchOutcome::NoAvailableTaxi => panic!("expected a dispatch"),
    }

    assert_eq!(queue_ids(&engine, Stand::Airport), vec!["x", "u1", "u2"]);
}

#[test]
fn test_dispatch_single_taxi_queue() {
    let mut engine = board_with(&[("solo", Stand::Waterfalls, TaxiStatus::Available)]);

    match engine.dispatch_next(Stand::Waterfalls).unwrap() {
        DispatchOutcome::Dispatched { ticket, penalized } => {
            assert_eq!(ticket.taxi_id, "solo");
            assert!(penalized.is_empty());
        }
        DispatchOutcome::NoAvailableTaxi => panic!("expected a dispatch"),
    }

    let queue = engine.list_by_stand(Stand::Waterfalls);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].order(), 0);
    assert!(!queue[0].is_available());
}

#[test]
fn test_dispatch_only_touches_its_stand() {
    let mut engine = board_with(&[
        ("a1", Stand::Airport, TaxiStatus::Unavailable),
        ("a2", Stand::Airport, TaxiStatus::Available),
        ("w1", Stand::Waterfalls, TaxiStatus::Available),
        ("f1", Stand::FiveCorners, TaxiStatus::Unavailable),
    ]);

    engine.dispatch_next(Stand::Airport).unwrap();

    // Other stands keep their queues and statuses untouched
    assert_eq!(queue_ids(&engine, Stand::Waterfalls), vec!["w1"]);
    assert!(engine.registry().get("w1").unwrap().is_available());
    assert_eq!(queue_ids(&engine, Stand::FiveCorners), vec!["f1"]);
    assert_eq!(engine.registry().get("f1").unwrap().order(), 0);
}

// ============================================================================
// Counter
// ============================================================================

#[test]
fn test_counter_increments_once_per_dispatch() {
    let mut engine = board_with(&[
        ("a", Stand::Airport, TaxiStatus::Available),
        ("b", Stand::Airport, TaxiStatus::Available),
        ("c", Stand::Airport, TaxiStatus::Available),
    ]);

    for expected in 1..=3u64 {
        match engine.dispatch_next(Stand::Airport).unwrap() {
            DispatchOutcome::Dispatched { ticket, .. } => {
                assert_eq!(ticket.sequence, expected);
            }
            DispatchOutcome::NoAvailableTaxi => panic!("expected a dispatch"),
        }
        assert_eq!(engine.dispatch_count(), expected);
    }

    // Everyone has been dispatched and is now unavailable
    assert_eq!(
        engine.dispatch_next(Stand::Airport).unwrap(),
        DispatchOutcome::NoAvailableTaxi
    );
    assert_eq!(engine.dispatch_count(), 3);
}

// ============================================================================
// No-op Branch
// ============================================================================

#[test]
fn test_dispatch_on_empty_stand_is_a_noop() {
    let mut engine = board_with(&[]);

    let before = engine.board();
    assert_eq!(
        engine.dispatch_next(Stand::Airport).unwrap(),
        DispatchOutcome::NoAvailableTaxi
    );
    assert_eq!(engine.board(), before);
    assert_eq!(engine.dispatch_count(), 0);
}

#[test]
fn test_dispatch_with_no_available_taxi_changes_nothing() {
    let mut engine = board_with(&[
        ("a", Stand::Airport, TaxiStatus::Unavailable),
        ("b", Stand::Airport, TaxiStatus::Unavailable),
    ]);

    let before = engine.board();
    let events_before = engine.events().len();

    assert_eq!(
        engine.dispatch_next(Stand::Airport).unwrap(),
        DispatchOutcome::NoAvailableTaxi
    );

    // Entire state unchanged: queue, orders, statuses, counter, log
    assert_eq!(engine.board(), before);
    assert_eq!(engine.events().len(), events_before);
}

// ============================================================================
// Event Log
// ============================================================================

#[test]
fn test_dispatch_is_logged_with_penalty_set() {
    let mut engine = board_with(&[
        ("a", Stand::Airport, TaxiStatus::Unavailable),
        ("b", Stand::Airport, TaxiStatus::Available),
    ]);

    engine.dispatch_next(Stand::Airport).unwrap();

    let dispatched = engine.events().events_of_type("taxi_dispatched");
    assert_eq!(dispatched.len(), 1);
    match dispatched[0] {
        taxi_dispatch_core_rs::Event::TaxiDispatched {
            taxi_id,
            sequence,
            penalized,
            ..
        } => {
            assert_eq!(taxi_id, "b");
            assert_eq!(*sequence, 1);
            assert_eq!(penalized, &vec!["a".to_string()]);
        }
        other => panic!("unexpected event {other:?}"),
    }
}
