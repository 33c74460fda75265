/*!
 * Tracker Lifecycle Integration Tests
 */

use pip_sandbox::{
    AccessDecision, ManifestBuilder, ManifestError, PipRegistry, PipTracker, TrackerConfig,
    TrackerError,
};

fn payload(pip_id: u64) -> Vec<u8> {
    ManifestBuilder::new(pip_id)
        .rule("/usr", AccessDecision::allow())
        .build()
        .unwrap()
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_empty_payload_is_a_launch_failure() {
    init_logging();
    let result = PipTracker::new(1, 100, &[], TrackerConfig::default());
    assert!(matches!(
        result,
        Err(TrackerError::ManifestRejected(ManifestError::EmptyPayload))
    ));
}

#[test]
fn test_garbage_payload_is_a_launch_failure() {
    init_logging();
    let result = PipTracker::new(1, 100, &[0xDE, 0xAD, 0xBE, 0xEF], TrackerConfig::default());
    assert!(matches!(
        result,
        Err(TrackerError::ManifestRejected(ManifestError::Decode(_)))
    ));
}

#[test]
fn test_tree_size_starts_at_one() {
    let tracker = PipTracker::new(1, 100, &payload(0x51), TrackerConfig::default()).unwrap();
    assert_eq!(tracker.tree_size(), 1);
    assert!(!tracker.can_teardown());
}

#[test]
fn test_attach_detach_k_children_returns_to_one() {
    let tracker = PipTracker::new(1, 100, &payload(0x52), TrackerConfig::default()).unwrap();
    const K: u32 = 12;
    for _ in 0..K {
        tracker.attach_child();
    }
    assert_eq!(tracker.tree_size(), 1 + K);
    for _ in 0..K {
        tracker.detach_child();
    }
    assert_eq!(tracker.tree_size(), 1);
    assert!(!tracker.can_teardown(), "root still alive");

    tracker.detach_child();
    assert!(tracker.can_teardown());
}

#[test]
fn test_registry_refuses_teardown_while_tree_alive() {
    let registry = PipRegistry::new();
    registry
        .track_root(1, 100, &payload(0x53), TrackerConfig::default())
        .unwrap();
    registry.track_child(100, 101).unwrap();
    registry.track_child(100, 102).unwrap();

    assert!(registry.untrack(101).is_none(), "tree still has members");
    assert!(registry.untrack(100).is_none(), "child 102 still alive");

    let released = registry.untrack(102).expect("last member releases the pip");
    assert!(released.can_teardown());
    assert_eq!(released.tree_size(), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_resolution_works_for_any_tree_member() {
    let registry = PipRegistry::new();
    registry
        .track_root(1, 100, &payload(0x54), TrackerConfig::default())
        .unwrap();
    registry.track_child(100, 101).unwrap();

    let via_root = registry.find(100).unwrap().resolve("/usr/bin/cc");
    let via_child = registry.find(101).unwrap().resolve("/usr/bin/cc");
    assert_eq!(via_root, via_child);
    assert!(via_root.is_allowed());

    // one shared cache entry, not one per process
    let info = registry.find(100).unwrap().introspect();
    assert_eq!(info.cache_size, 1);
}

#[test]
fn test_introspect_snapshot() {
    let tracker = PipTracker::new(7, 700, &payload(0x55), TrackerConfig::default()).unwrap();
    tracker.resolve("/usr/bin/ld");
    tracker.attach_child();

    let info = tracker.introspect();
    assert_eq!(info.process_id, 700);
    assert_eq!(info.client_pid, 7);
    assert_eq!(info.pip_id, 0x55);
    assert_eq!(info.cache_size, 1);
    assert_eq!(info.tree_size, 2);
    assert_eq!(info.last_lookup_slots, 1);
    assert_eq!(info.counters.misses, 1);
}

#[test]
fn test_introspect_serializes() {
    let tracker = PipTracker::new(1, 100, &payload(0x56), TrackerConfig::default()).unwrap();
    let info = tracker.introspect();
    let encoded = bincode::serialize(&info).unwrap();
    assert!(!encoded.is_empty());
}
