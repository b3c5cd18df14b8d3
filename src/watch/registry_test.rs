use std::sync::Arc;
use std::sync::Barrier;
use std::time::Duration;

use prometheus::IntGauge;
use tokio::time::Instant;

use super::*;
use crate::UNKNOWN_INDEX;

#[test]
fn test_new_registry_is_empty() {
    let registry = WatchRegistry::new();
    assert_eq!(registry.len(), 0);
    assert!(registry.is_empty());
    assert!(registry.snapshot().is_empty());
}

#[test]
fn test_register_key_is_idempotent() {
    let registry = WatchRegistry::new();
    registry.register("someKey1");
    assert_eq!(registry.len(), 1);
    registry.register("someKey2");
    assert_eq!(registry.len(), 2);
    registry.register("someKey2");
    assert_eq!(registry.len(), 2);

    assert_eq!(registry.get("someKey1"), Some(WatchState::default()));
}

#[test]
fn test_register_does_not_overwrite_existing_state() {
    let registry = WatchRegistry::new();
    let locked = WatchState::locked_until(2, 40, Instant::now() + Duration::from_secs(60));
    registry.insert_state("someKey1", locked);

    registry.register("someKey1");

    assert_eq!(registry.len(), 1);
    let state = registry.get("someKey1").unwrap();
    assert_eq!(state, locked);
    assert_eq!(state.attempt(), 2);
    assert_eq!(state.last_known_index(), 40);
}

#[test]
fn test_register_many_collapses_duplicates() {
    let registry = WatchRegistry::new();
    registry.register_many(["someKey1", "someKey2", "someKey2"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_deregister_key() {
    let registry = WatchRegistry::new();
    registry.register_many(["someKey1", "someKey2", "someKey2"]);

    registry.deregister("someKey1");
    assert_eq!(registry.len(), 1);
    assert!(!registry.contains("someKey1"));

    registry.deregister("someKey2");
    assert_eq!(registry.len(), 0);

    registry.deregister("someUnknown");
    assert_eq!(registry.len(), 0);
}

#[test]
fn test_deregister_many_ignores_unknown_keys() {
    let registry = WatchRegistry::new();
    registry.register_many(vec!["someKey1".to_string(), "someKey2".to_string()]);
    assert_eq!(registry.len(), 2);

    registry.deregister_many(["someKey1", "someKey2", "someKey2", "someUnknown"]);
    assert_eq!(registry.len(), 0);
}

#[test]
fn test_snapshot_is_detached_copy() {
    let registry = WatchRegistry::new();
    registry.register("someKey1");

    let mut snapshot = registry.snapshot();
    snapshot.remove("someKey1");

    assert!(registry.contains("someKey1"));
}

#[test]
fn test_transition_all_unlocks_only_due_keys() {
    let registry = WatchRegistry::new();
    let now = Instant::now();
    registry.insert_state("due", WatchState::locked_until(3, 9, now));
    registry.insert_state("pending", WatchState::locked_until(1, UNKNOWN_INDEX, now + Duration::from_secs(60)));
    registry.register("free");

    let unlocked = registry.transition_all(now);

    assert_eq!(unlocked, 1);
    assert_eq!(
        registry.get("due"),
        Some(WatchState::Unlocked {
            attempt: 3,
            last_known_index: 9,
        })
    );
    assert!(registry.get("pending").unwrap().is_locked());

    let mut eligible = registry.eligible_keys();
    eligible.sort();
    assert_eq!(eligible, vec!["due".to_string(), "free".to_string()]);
}

#[test]
fn test_concurrent_register_and_deregister() {
    let registry = Arc::new(WatchRegistry::new());
    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    registry.register(format!("key-{i}"));
                    if t % 2 == 0 {
                        registry.transition_all(Instant::now());
                    }
                }
                barrier.wait();
                for i in 0..50 {
                    registry.deregister(&format!("key-{i}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 50);
    assert!((50..100).all(|i| registry.get(&format!("key-{i}")) == Some(WatchState::default())));
}

fn test_gauge() -> IntGauge {
    IntGauge::new("test_watched_keys", "watched keys").unwrap()
}

#[test]
fn test_gauge_counts_keys_of_every_registry() {
    let gauge = test_gauge();
    let first = WatchRegistry::with_gauge(gauge.clone());
    let second = WatchRegistry::with_gauge(gauge.clone());

    first.register_many(["a1", "a2", "a3"]);
    second.register("b1");
    assert_eq!(gauge.get(), 4);

    first.deregister("a1");
    assert_eq!(gauge.get(), 3);
    assert_eq!(gauge.get(), (first.len() + second.len()) as i64);
}

#[test]
fn test_gauge_ignores_no_op_register_and_deregister() {
    let gauge = test_gauge();
    let registry = WatchRegistry::with_gauge(gauge.clone());

    registry.register_many(["someKey1", "someKey2", "someKey2"]);
    registry.register("someKey1");
    assert_eq!(gauge.get(), 2);

    registry.deregister_many(["someKey1", "someKey1", "unknown"]);
    assert_eq!(gauge.get(), 1);
}

#[test]
fn test_dropping_registry_releases_its_keys_from_gauge() {
    let gauge = test_gauge();
    let kept = WatchRegistry::with_gauge(gauge.clone());
    kept.register("kept");
    {
        let dropped = WatchRegistry::with_gauge(gauge.clone());
        dropped.register_many(["x", "y"]);
        dropped.insert_state("z", WatchState::default());
        assert_eq!(gauge.get(), 4);
    }
    assert_eq!(gauge.get(), 1);
}

#[test]
fn test_gauge_matches_len_after_concurrent_updates() {
    let gauge = test_gauge();
    let registry = Arc::new(WatchRegistry::with_gauge(gauge.clone()));
    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    registry.register(format!("key-{i}"));
                }
                barrier.wait();
                for i in 0..30 {
                    registry.deregister(&format!("key-{i}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 70);
    assert_eq!(gauge.get(), 70);
}
