//! Tests for pluggable hashers and the fast-hash feature flags.
//!
//! The default hasher is selected by the `fxhash`/`ahash` features;
//! regardless of the selection, a map must behave identically for equal
//! keys and any `BuildHasher` must be usable per collection.

use std::hash::{BuildHasher, Hasher};

use rstest::rstest;
use trieste::persistent::{PersistentHashMap, PersistentHashSet};

// =============================================================================
// Default Hasher Behavior
// =============================================================================

#[rstest]
fn test_same_key_resolves_in_every_map() {
    let first = PersistentHashMap::new().insert("key".to_string(), 1);
    let second = PersistentHashMap::new().insert("key".to_string(), 2);

    // Each map hashes with its own state; lookups stay consistent within
    // a map no matter what the default hasher is.
    assert_eq!(first.get("key"), Some(&1));
    assert_eq!(second.get("key"), Some(&2));
}

#[rstest]
fn test_equal_content_maps_compare_equal_across_hasher_states() {
    let entries: Vec<(String, i32)> = vec![
        ("alpha".to_string(), 1),
        ("beta".to_string(), 2),
        ("gamma".to_string(), 3),
    ];

    let first: PersistentHashMap<String, i32> = entries.iter().cloned().collect();
    let second: PersistentHashMap<String, i32> = entries.iter().cloned().collect();

    // Equality is content-based even when the two maps' hash seeds (and
    // therefore their trie shapes) differ.
    assert_eq!(first, second);
}

#[rstest]
fn test_set_behaves_identically_under_default_hasher() {
    let set: PersistentHashSet<String> = ["a", "b", "c"]
        .into_iter()
        .map(str::to_string)
        .collect();
    assert!(set.contains("a"));
    assert!(!set.contains("d"));
}

// =============================================================================
// Custom Hashers
// =============================================================================

/// A deliberately terrible hasher mapping everything to one bucket.
/// Exercises the collision path through the public hasher seam.
#[derive(Clone, Default)]
struct ConstantHashBuilder;

struct ConstantHasher;

impl Hasher for ConstantHasher {
    fn finish(&self) -> u64 {
        0
    }

    fn write(&mut self, _bytes: &[u8]) {}
}

impl BuildHasher for ConstantHashBuilder {
    type Hasher = ConstantHasher;

    fn build_hasher(&self) -> ConstantHasher {
        ConstantHasher
    }
}

#[rstest]
fn test_map_with_degenerate_hasher_still_correct() {
    let mut map = PersistentHashMap::with_hasher(ConstantHashBuilder);
    for index in 0..100 {
        map = map.insert(index, index * 2);
    }

    assert_eq!(map.len(), 100);
    for index in 0..100 {
        assert_eq!(map.get(&index), Some(&(index * 2)));
    }

    let removed = map.remove(&50);
    assert_eq!(removed.len(), 99);
    assert_eq!(removed.get(&50), None);
    assert_eq!(removed.get(&51), Some(&102));
}

#[rstest]
fn test_transient_with_degenerate_hasher() {
    let map = PersistentHashMap::with_hasher(ConstantHashBuilder);
    let mut transient = map.transient();
    for index in 0..100 {
        transient.insert(index, index);
    }
    for index in 0..50 {
        assert_eq!(transient.remove(&index), Some(index));
    }

    let sealed = transient.persistent();
    assert_eq!(sealed.len(), 50);
    assert_eq!(sealed.get(&75), Some(&75));
}

#[rstest]
fn test_set_with_custom_hasher() {
    let set = PersistentHashSet::with_hasher(ConstantHashBuilder)
        .insert("x".to_string())
        .insert("y".to_string());

    assert_eq!(set.len(), 2);
    assert!(set.contains("x"));
    assert!(set.contains("y"));
}

// =============================================================================
// Fast Hash Features
// =============================================================================

#[cfg(feature = "fxhash")]
#[rstest]
fn test_fxhash_default_is_deterministic() {
    // FxBuildHasher is stateless, so independent maps share trie shapes
    // and independent builders hash identically.
    let first = rustc_hash::FxBuildHasher;
    let second = rustc_hash::FxBuildHasher;
    assert_eq!(first.hash_one("key"), second.hash_one("key"));

    let map: PersistentHashMap<String, i32> =
        (0..100).map(|index| (index.to_string(), index)).collect();
    assert_eq!(map.get("42"), Some(&42));
}

#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
#[rstest]
fn test_ahash_default_behaves_correctly() {
    let map: PersistentHashMap<String, i32> =
        (0..100).map(|index| (index.to_string(), index)).collect();
    assert_eq!(map.get("42"), Some(&42));
    assert_eq!(map.len(), 100);
}
