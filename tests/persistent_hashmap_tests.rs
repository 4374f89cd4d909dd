//! Integration tests for `PersistentHashMap`.

use std::hash::{Hash, Hasher};

use rstest::rstest;
use trieste::persistent::PersistentHashMap;

/// A key whose hash collapses to one of a handful of buckets, forcing
/// full-hash collisions while keeping keys distinguishable by equality.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CollidingKey {
    id: u32,
}

impl CollidingKey {
    const fn new(id: u32) -> Self {
        Self { id }
    }
}

impl Hash for CollidingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Only two buckets: every key collides with roughly half the rest.
        state.write_u32(self.id % 2);
    }
}

// =============================================================================
// Versioned Map Scenario
// =============================================================================

#[rstest]
fn test_version_chain_preserves_every_snapshot() {
    let empty: PersistentHashMap<String, i32> = PersistentHashMap::new();
    let with_first = empty.insert("first".to_string(), 1);
    let with_both = with_first.insert("second".to_string(), 2);
    let without_first = with_both.remove("first");

    // Every version remains observable after the chain is built.
    assert_eq!(empty.len(), 0);
    assert_eq!(empty.get("first"), None);

    assert_eq!(with_first.len(), 1);
    assert_eq!(with_first.get("first"), Some(&1));
    assert_eq!(with_first.get("second"), None);

    assert_eq!(with_both.len(), 2);
    assert_eq!(with_both.get("first"), Some(&1));
    assert_eq!(with_both.get("second"), Some(&2));

    assert_eq!(without_first.len(), 1);
    assert_eq!(without_first.get("first"), None);
    assert_eq!(without_first.get("second"), Some(&2));
}

#[rstest]
fn test_overwrite_creates_independent_version() {
    let original = PersistentHashMap::new().insert("key".to_string(), 1);
    let overwritten = original.insert("key".to_string(), 2);

    assert_eq!(original.get("key"), Some(&1));
    assert_eq!(overwritten.get("key"), Some(&2));
    assert_eq!(original.len(), 1);
    assert_eq!(overwritten.len(), 1);
}

// =============================================================================
// Scale Tests
// =============================================================================

#[rstest]
fn test_large_map_insert_get_remove() {
    let mut map = PersistentHashMap::new();
    for index in 0..10_000 {
        map = map.insert(index, index * 2);
    }
    assert_eq!(map.len(), 10_000);

    for index in (0..10_000).step_by(97) {
        assert_eq!(map.get(&index), Some(&(index * 2)));
    }

    let mut shrunk = map.clone();
    for index in 0..5_000 {
        shrunk = shrunk.remove(&index);
    }
    assert_eq!(shrunk.len(), 5_000);
    assert_eq!(shrunk.get(&100), None);
    assert_eq!(shrunk.get(&7_500), Some(&15_000));
    // The source map is unaffected by the removals.
    assert_eq!(map.len(), 10_000);
}

#[rstest]
fn test_remove_everything_returns_to_empty() {
    let mut map = PersistentHashMap::new();
    for index in 0..1_000 {
        map = map.insert(index, index);
    }
    for index in 0..1_000 {
        map = map.remove(&index);
    }
    assert!(map.is_empty());
    assert_eq!(map, PersistentHashMap::new());
}

#[rstest]
fn test_iteration_covers_large_map_exactly_once() {
    let mut map = PersistentHashMap::new();
    for index in 0..2_500 {
        map = map.insert(index, ());
    }

    let mut keys: Vec<i32> = map.keys().copied().collect();
    keys.sort_unstable();
    assert_eq!(keys, (0..2_500).collect::<Vec<_>>());
}

// =============================================================================
// Collision Tests
// =============================================================================

#[rstest]
fn test_colliding_keys_stay_distinguishable() {
    let mut map = PersistentHashMap::new();
    for id in 0..64 {
        map = map.insert(CollidingKey::new(id), id);
    }
    assert_eq!(map.len(), 64);

    for id in 0..64 {
        assert_eq!(map.get(&CollidingKey::new(id)), Some(&id));
    }
}

#[rstest]
fn test_removal_from_collision_bucket_keeps_siblings() {
    let mut map = PersistentHashMap::new();
    for id in 0..8 {
        map = map.insert(CollidingKey::new(id), id);
    }

    let removed = map.remove(&CollidingKey::new(4));
    assert_eq!(removed.len(), 7);
    assert_eq!(removed.get(&CollidingKey::new(4)), None);
    for id in [0, 1, 2, 3, 5, 6, 7] {
        assert_eq!(removed.get(&CollidingKey::new(id)), Some(&id));
    }
    // The pre-removal version still holds the full bucket.
    assert_eq!(map.get(&CollidingKey::new(4)), Some(&4));
}

#[rstest]
fn test_colliding_keys_overwrite_by_equality() {
    let map = PersistentHashMap::new()
        .insert(CollidingKey::new(2), "old")
        .insert(CollidingKey::new(4), "other")
        .insert(CollidingKey::new(2), "new");

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&CollidingKey::new(2)), Some(&"new"));
    assert_eq!(map.get(&CollidingKey::new(4)), Some(&"other"));
}

// =============================================================================
// Structural Equality Tests
// =============================================================================

#[rstest]
fn test_equality_is_content_based() {
    let mut forward = PersistentHashMap::new();
    let mut backward = PersistentHashMap::new();
    for index in 0..100 {
        forward = forward.insert(index, index);
        backward = backward.insert(99 - index, 99 - index);
    }
    assert_eq!(forward, backward);
}

#[rstest]
fn test_teardown_matches_fresh_build() {
    // Build up then tear down half, and compare against a map built
    // directly with the surviving contents. Node representations may
    // differ (dense branches are not downgraded on removal), but both
    // walks visit slots in ascending fragment order, so contents and
    // iteration sequences agree.
    let mut grown = PersistentHashMap::new();
    for index in 0..200 {
        grown = grown.insert(index, index);
    }
    for index in 100..200 {
        grown = grown.remove(&index);
    }

    let mut fresh = PersistentHashMap::new();
    for index in 0..100 {
        fresh = fresh.insert(index, index);
    }

    assert_eq!(grown, fresh);

    let grown_walk: Vec<(i32, i32)> = grown.iter().map(|(k, v)| (*k, *v)).collect();
    let fresh_walk: Vec<(i32, i32)> = fresh.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(grown_walk, fresh_walk);
}

// =============================================================================
// Update Operations
// =============================================================================

#[rstest]
fn test_update_with_counters() {
    let words = ["red", "blue", "red", "green", "red", "blue"];
    let mut counts: PersistentHashMap<String, usize> = PersistentHashMap::new();
    for word in words {
        counts = counts.update_with(word, |current| Some(current.map_or(1, |count| count + 1)));
    }

    assert_eq!(counts.get("red"), Some(&3));
    assert_eq!(counts.get("blue"), Some(&2));
    assert_eq!(counts.get("green"), Some(&1));
}

#[rstest]
fn test_merge_large_maps() {
    let left: PersistentHashMap<i32, i32> = (0..500).map(|index| (index, index)).collect();
    let right: PersistentHashMap<i32, i32> = (250..750).map(|index| (index, -index)).collect();

    let merged = left.merge(&right);
    assert_eq!(merged.len(), 750);
    assert_eq!(merged.get(&100), Some(&100));
    assert_eq!(merged.get(&300), Some(&-300)); // Right side wins
    assert_eq!(merged.get(&700), Some(&-700));
}
