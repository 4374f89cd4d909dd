//! Persistent (immutable) hash-trie collections.
//!
//! This module provides the hash array mapped trie (HAMT) collection
//! family:
//!
//! - [`PersistentHashMap`]: persistent hash map
//! - [`PersistentHashSet`]: persistent hash set (map with unit values)
//! - [`TransientHashMap`]: single-owner mutable map builder
//! - [`TransientHashSet`]: single-owner mutable set builder
//!
//! # Structural Sharing
//!
//! Persistent operations never mutate an existing node. An update copies
//! the nodes on the path from the root to the touched slot and shares
//! every other subtree with the previous version by reference. Persistent
//! collections are therefore safe for unsynchronized concurrent reads.
//!
//! # Transients
//!
//! A transient builder seeded from a persistent collection mutates a node
//! in place only while it owns that node exclusively; the first write
//! into a subtree still shared with a frozen snapshot copies the node and
//! continues on the copy. Sealing the builder with `persistent()` is O(1)
//! and consumes it, so a sealed builder cannot be mutated again.
//!
//! # Examples
//!
//! ## `PersistentHashMap`
//!
//! ```rust
//! use trieste::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//! assert_eq!(map.get("one"), Some(&1));
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```
//!
//! ## `PersistentHashSet`
//!
//! ```rust
//! use trieste::persistent::PersistentHashSet;
//!
//! let set = PersistentHashSet::new().insert(1).insert(2).insert(3);
//! assert!(set.contains(&1));
//!
//! let other: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();
//! assert_eq!(set.union(&other).len(), 4);
//! assert_eq!(set.intersection(&other).len(), 2);
//! ```
//!
//! ## Transient batch construction
//!
//! ```rust
//! use trieste::persistent::TransientHashMap;
//!
//! let mut transient = TransientHashMap::new();
//! for index in 0..100 {
//!     transient.insert(index, index * 2);
//! }
//! let map = transient.persistent();
//! assert_eq!(map.len(), 100);
//! assert_eq!(map.get(&40), Some(&80));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

// =============================================================================
// Default Hasher Type Alias
// =============================================================================

/// Default hash builder for maps and sets.
///
/// Selected by feature flag:
///
/// - `fxhash`: [`rustc_hash::FxBuildHasher`] (fast, not DoS-resistant)
/// - `ahash`: [`ahash::RandomState`]
/// - otherwise: [`std::collections::hash_map::RandomState`]
///
/// Any other [`std::hash::BuildHasher`] can be supplied per collection via
/// the `with_hasher` constructors.
#[cfg(feature = "fxhash")]
pub type DefaultHashBuilder = rustc_hash::FxBuildHasher;

/// Default hash builder for maps and sets.
#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
pub type DefaultHashBuilder = ahash::RandomState;

/// Default hash builder for maps and sets.
#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
pub type DefaultHashBuilder = std::collections::hash_map::RandomState;

mod hashmap;
mod hashset;
mod node;

pub use hashmap::PersistentHashMap;
pub use hashmap::PersistentHashMapIntoIterator;
pub use hashmap::PersistentHashMapIterator;
pub use hashmap::TransientError;
pub use hashmap::TransientHashMap;
pub use hashset::HashSetView;
pub use hashset::PersistentHashSet;
pub use hashset::PersistentHashSetIntoIterator;
pub use hashset::PersistentHashSetIterator;
pub use hashset::TransientHashSet;

// =============================================================================
// Tests
// =============================================================================
