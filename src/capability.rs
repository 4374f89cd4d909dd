//! Capability traits for keyed persistent collections.
//!
//! Rather than a deep inheritance-style hierarchy of collection
//! interfaces, each concrete structure implements a small set of
//! capability traits selectively:
//!
//! - [`Lookup`]: query by key
//! - [`Associate`]: persistent insert (returns a new collection)
//! - [`Dissociate`]: persistent remove (returns a new collection)
//! - [`IterateEntries`]: borrowed iteration over contents
//!
//! The persistent map implements all four; the persistent set implements
//! them with unit values and element-typed lookups. Code that only needs
//! a lookup-capable structure can bound on `Lookup` alone.
//!
//! # Examples
//!
//! ```rust
//! use trieste::capability::{Associate, Lookup};
//! use trieste::persistent::PersistentHashMap;
//!
//! fn cached_or<C>(cache: &C, key: &str, fallback: u32) -> u32
//! where
//!     C: Lookup<str, Value = u32>,
//! {
//!     cache.lookup(key).copied().unwrap_or(fallback)
//! }
//!
//! let cache = PersistentHashMap::new().associate("hit".to_string(), 7);
//! assert_eq!(cached_or(&cache, "hit", 0), 7);
//! assert_eq!(cached_or(&cache, "miss", 3), 3);
//! ```

/// Query capability: find a stored value by key.
///
/// A miss is a normal outcome, never an error; `lookup` is total for any
/// well-behaved key type.
pub trait Lookup<Q: ?Sized> {
    /// The value type produced by a successful lookup.
    type Value;

    /// Returns a reference to the value stored under `key`, if any.
    fn lookup(&self, key: &Q) -> Option<&Self::Value>;

    /// Returns `true` if a value is stored under `key`.
    fn contains(&self, key: &Q) -> bool {
        self.lookup(key).is_some()
    }
}

/// Persistent insert capability.
///
/// `associate` returns a new collection with the entry added or replaced;
/// the receiver is unchanged.
pub trait Associate<K, V>: Sized {
    /// Returns a new collection containing `(key, value)`.
    #[must_use]
    fn associate(&self, key: K, value: V) -> Self;
}

/// Persistent remove capability.
///
/// `dissociate` returns a new collection without the key; removing an
/// absent key returns a collection equal to the receiver.
pub trait Dissociate<Q: ?Sized>: Sized {
    /// Returns a new collection without `key`.
    #[must_use]
    fn dissociate(&self, key: &Q) -> Self;
}

/// Borrowed iteration over the contents of a collection.
///
/// Each call derives a fresh walk from the current root; iteration order
/// is unspecified and may differ between collections holding the same
/// logical content.
pub trait IterateEntries {
    /// The borrowed item produced during iteration.
    type Entry<'a>
    where
        Self: 'a;

    /// The iterator type.
    type Entries<'a>: Iterator<Item = Self::Entry<'a>>
    where
        Self: 'a;

    /// Returns an iterator over the collection's contents.
    fn entries(&self) -> Self::Entries<'_>;
}
