/*!
 * Tracker Concurrency Integration Tests
 */

use pip_sandbox::{AccessDecision, ManifestBuilder, PipRegistry, PipTracker, TrackerConfig};
use rand::seq::SliceRandom;
use serial_test::serial;
use std::sync::Arc;
use std::thread;

fn build_tracker(config: TrackerConfig) -> PipTracker {
    let payload = ManifestBuilder::new(0xCC)
        .default_decision(AccessDecision::deny().with_report(true))
        .rule("/usr/include", AccessDecision::allow())
        .build()
        .unwrap();
    PipTracker::new(1, 100, &payload, config).unwrap()
}

#[test]
#[serial]
fn test_concurrent_resolves_agree() {
    let tracker = Arc::new(build_tracker(TrackerConfig::default()));

    let mut handles = Vec::new();
    for t in 0..8u32 {
        let tracker = Arc::clone(&tracker);
        handles.push(thread::spawn(move || {
            let mut paths: Vec<String> = (0..250)
                .map(|i| format!("/usr/include/shared/h{}.h", i))
                .collect();
            paths.shuffle(&mut rand::thread_rng());

            for path in &paths {
                assert!(tracker.resolve(path).is_allowed());
            }
            for i in 0..250 {
                let private = format!("/work/{}/obj{}.o", t, i);
                assert!(!tracker.resolve(&private).is_allowed());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let info = tracker.introspect();
    // every resolve recorded exactly one hit or one miss
    assert_eq!(info.counters.hits + info.counters.misses, 8 * 500);
    // 250 shared paths + 8 x 250 private ones, each cached once
    assert_eq!(info.cache_size, 250 + 8 * 250);
    assert_eq!(info.last_lookup_slots, 8);
}

#[test]
#[serial]
fn test_concurrent_disable_produces_one_replacement() {
    let tracker = Arc::new(build_tracker(TrackerConfig {
        cache_enabled: true,
        min_cache_entries: 100,
        max_hit_percent: 20,
    }));

    // every thread resolves distinct paths, so the hit rate stays at zero
    // and the governor trips shortly past 100 entries while probes are
    // still racing in
    let mut handles = Vec::new();
    for t in 0..8u32 {
        let tracker = Arc::clone(&tracker);
        handles.push(thread::spawn(move || {
            for i in 0..200 {
                let decision = tracker.resolve(&format!("/work/{}/src{}.c", t, i));
                assert!(!decision.is_allowed());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // the surviving active cache is the sealed replacement
    let info = tracker.introspect();
    assert_eq!(info.cache_size, 0, "exactly one empty replacement survives");

    // decisions remain correct and the cache stays empty
    assert!(tracker.resolve("/usr/include/late.h").is_allowed());
    assert!(!tracker.resolve("/work/late.o").is_allowed());
    assert_eq!(tracker.introspect().cache_size, 0);
}

#[test]
#[serial]
fn test_concurrent_attach_detach_balances() {
    let tracker = Arc::new(build_tracker(TrackerConfig::default()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let tracker = Arc::clone(&tracker);
        handles.push(thread::spawn(move || {
            for _ in 0..1000 {
                tracker.attach_child();
                tracker.detach_child();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(tracker.tree_size(), 1);
}

#[test]
#[serial]
fn test_concurrent_registry_routing() {
    let registry = PipRegistry::new();
    let payload = ManifestBuilder::new(0xD0)
        .rule("/usr", AccessDecision::allow())
        .build()
        .unwrap();
    registry
        .track_root(1, 100, &payload, TrackerConfig::default())
        .unwrap();

    let mut handles = Vec::new();
    for t in 0..8u32 {
        let registry = registry.clone();
        handles.push(thread::spawn(move || {
            let child_pid = 1000 + t;
            let tracker = registry.track_child(100, child_pid).unwrap();
            for i in 0..100 {
                assert!(tracker
                    .resolve(&format!("/usr/lib/lib{}.so", i))
                    .is_allowed());
            }
            assert!(registry.untrack(child_pid).is_none(), "root keeps pip alive");
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let root = registry.find(100).unwrap();
    assert_eq!(root.tree_size(), 1);
    assert_eq!(registry.len(), 1);
    drop(root);
    assert!(registry.untrack(100).is_some());
}
