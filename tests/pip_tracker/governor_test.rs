/*!
 * Cache Governor Integration Tests
 */

use pip_sandbox::{AccessDecision, ManifestBuilder, PipTracker, TrackerConfig};

fn build_tracker(config: TrackerConfig) -> PipTracker {
    let payload = ManifestBuilder::new(0x60)
        .default_decision(AccessDecision::deny())
        .rule("/usr/include", AccessDecision::allow())
        .build()
        .unwrap();
    PipTracker::new(1, 100, &payload, config).unwrap()
}

#[test]
fn test_hit_and_miss_counting() {
    // the scenario from the policy contract: one miss, then one hit
    let tracker = build_tracker(TrackerConfig::default());

    assert!(tracker.resolve("/usr/include/stdio.h").is_allowed());
    let info = tracker.introspect();
    assert_eq!(info.counters.misses, 1);
    assert_eq!(info.counters.hits, 0);

    assert!(tracker.resolve("/usr/include/stdio.h").is_allowed());
    let info = tracker.introspect();
    assert_eq!(info.counters.misses, 1);
    assert_eq!(info.counters.hits, 1);
}

#[test]
fn test_thrashing_cache_is_abandoned() {
    let tracker = build_tracker(TrackerConfig {
        cache_enabled: true,
        min_cache_entries: 4,
        max_hit_percent: 50,
    });

    // five distinct paths: all misses, so the fifth probe sees
    // entries > 4 at a 0% hit rate and disables caching
    for i in 0..5 {
        tracker.resolve(&format!("/src/file{}.c", i));
    }

    let info = tracker.introspect();
    assert_eq!(info.cache_size, 0, "replacement cache must be empty");
    assert_eq!(info.counters.misses, 5);

    // inserts are no-ops from now on
    tracker.resolve("/src/file9.c");
    tracker.resolve("/src/file0.c");
    assert_eq!(tracker.introspect().cache_size, 0);
}

#[test]
fn test_disable_is_permanent_despite_recovery() {
    let tracker = build_tracker(TrackerConfig {
        cache_enabled: true,
        min_cache_entries: 2,
        max_hit_percent: 90,
    });

    for i in 0..3 {
        tracker.resolve(&format!("/src/file{}.c", i));
    }
    assert_eq!(tracker.introspect().cache_size, 0, "caching disabled");

    // drive the observed hit rate far above the threshold via the
    // per-thread slot; caching must stay abandoned
    for _ in 0..200 {
        tracker.resolve("/src/file0.c");
    }
    let info = tracker.introspect();
    assert!(info.counters.hit_percent > 90);

    tracker.resolve("/src/fresh.c");
    assert_eq!(tracker.introspect().cache_size, 0);
}

#[test]
fn test_healthy_cache_is_kept() {
    let tracker = build_tracker(TrackerConfig {
        cache_enabled: true,
        min_cache_entries: 4,
        max_hit_percent: 50,
    });

    // interleave two revisits per new path so the hit rate never drops
    // below the threshold while the cache grows past it
    for i in 0..8 {
        tracker.resolve(&format!("/usr/include/h{}.h", i));
        for back in 1..=2 {
            if i >= back {
                tracker.resolve(&format!("/usr/include/h{}.h", i - back));
            }
        }
    }

    let info = tracker.introspect();
    assert_eq!(info.cache_size, 8, "cache must survive a healthy workload");
    assert!(info.counters.hit_percent >= 50);
}

#[test]
fn test_caching_disabled_by_configuration() {
    let tracker = build_tracker(TrackerConfig {
        cache_enabled: false,
        ..TrackerConfig::default()
    });

    for i in 0..10 {
        tracker.resolve(&format!("/usr/include/h{}.h", i));
    }
    let info = tracker.introspect();
    assert_eq!(info.cache_size, 0);
    assert_eq!(info.counters.misses, 10);
}
