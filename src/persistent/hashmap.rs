//! Persistent hash map and its transient builder.
//!
//! [`PersistentHashMap`] is an immutable hash map backed by the HAMT node
//! layer in [`super::node`]. Every update returns a new map; unmodified
//! subtrees are shared by reference with prior versions.
//!
//! [`TransientHashMap`] is the single-owner mutable counterpart for batch
//! construction: seed it from empty or from a persistent map, apply
//! in-place updates, then seal it back into a persistent map in O(1) with
//! [`TransientHashMap::persistent`].

use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::FromIterator;
use std::marker::PhantomData;

use static_assertions::assert_not_impl_any;

use super::node::{Iter, Node};
use super::{DefaultHashBuilder, ReferenceCounter};
use crate::capability::{Associate, Dissociate, IterateEntries, Lookup};

// =============================================================================
// PersistentHashMap
// =============================================================================

/// A persistent (immutable) hash map.
///
/// Backed by a hash array mapped trie: lookups, inserts and removals run
/// in O(log32 N), and updates share all unmodified structure with the
/// previous version.
///
/// The hasher is a type parameter defaulting to [`DefaultHashBuilder`];
/// any [`BuildHasher`] can be supplied through
/// [`with_hasher`](Self::with_hasher). Two maps compare equal by content
/// regardless of their hashers' seeds or of insertion order.
///
/// # Examples
///
/// ```rust
/// use trieste::persistent::PersistentHashMap;
///
/// let map = PersistentHashMap::new()
///     .insert("one".to_string(), 1)
///     .insert("two".to_string(), 2);
///
/// assert_eq!(map.get("one"), Some(&1));
///
/// let updated = map.insert("one".to_string(), 100);
/// assert_eq!(map.get("one"), Some(&1));       // Original unchanged
/// assert_eq!(updated.get("one"), Some(&100)); // New version
/// ```
#[derive(Clone)]
pub struct PersistentHashMap<K, V, S = DefaultHashBuilder> {
    root: ReferenceCounter<Node<K, V>>,
    length: usize,
    hasher: S,
}

impl<K, V> PersistentHashMap<K, V> {
    /// Creates an empty map with the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a map containing a single entry, with the default hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::singleton("key".to_string(), 1);
    /// assert_eq!(map.len(), 1);
    /// ```
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self
    where
        K: Clone + Hash + Eq,
        V: Clone,
    {
        Self::new().insert(key, value)
    }
}

impl<K, V, S> PersistentHashMap<K, V, S> {
    /// Creates an empty map that hashes keys with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            root: ReferenceCounter::new(Node::empty()),
            length: 0,
            hasher,
        }
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns a reference to the map's hasher.
    #[must_use]
    pub const fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns a borrowing iterator over key-value pairs.
    ///
    /// The walk is derived lazily from the current root; nothing is
    /// materialized up front. Iteration order follows trie shape, not
    /// insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    ///
    /// let total: i32 = map.iter().map(|(_, value)| value).sum();
    /// assert_eq!(total, 3);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        PersistentHashMapIterator {
            inner: Iter::new(&self.root, self.length),
        }
    }

    /// Returns an iterator over keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    ///
    /// let sum: i32 = map.values().sum();
    /// assert_eq!(sum, 3);
    /// ```
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Clone + Hash + Eq, V: Clone, S: BuildHasher + Clone> PersistentHashMap<K, V, S> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but `Hash`
    /// and `Eq` on the borrowed form must match those for the key type.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key-value pair corresponding to the key.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(key);
        Node::find(&self.root, hash, key, 0)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns a new map with the entry added, replacing any existing
    /// value under the same key. The receiver is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log32 N); copies only the root-to-slot path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let empty = PersistentHashMap::new();
    /// let one = empty.insert("key".to_string(), 1);
    ///
    /// assert_eq!(empty.len(), 0);
    /// assert_eq!(one.len(), 1);
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let hash = self.hasher.hash_one(&key);
        let (new_root, added) = Node::insert(&self.root, hash, key, value, 0);
        Self {
            root: ReferenceCounter::new(new_root),
            length: if added { self.length + 1 } else { self.length },
            hasher: self.hasher.clone(),
        }
    }

    /// Returns a new map without the key.
    ///
    /// Removing an absent key returns a map equal to the receiver. On the
    /// way back up, branch nodes left holding a single entry collapse
    /// into that entry, so a map's shape depends only on its contents.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("key".to_string(), 1);
    /// let removed = map.remove("key");
    ///
    /// assert_eq!(map.get("key"), Some(&1)); // Original unchanged
    /// assert_eq!(removed.get("key"), None);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(key);
        match Node::remove(&self.root, hash, key, 0) {
            Some(new_root) => Self {
                root: ReferenceCounter::new(new_root),
                length: self.length.saturating_sub(1),
                hasher: self.hasher.clone(),
            },
            None => self.clone(),
        }
    }

    /// Applies a function to the value under `key`, returning the updated
    /// map, or `None` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("count".to_string(), 1);
    /// let updated = map.update("count", |count| count + 1);
    ///
    /// assert_eq!(updated.and_then(|map| map.get("count").copied()), Some(2));
    /// assert!(map.update("missing", |count| count + 1).is_none());
    /// ```
    #[must_use]
    pub fn update<Q, F>(&self, key: &Q, function: F) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> V,
    {
        let (actual_key, value) = self.get_key_value(key)?;
        let new_value = function(value);
        Some(self.insert(actual_key.clone(), new_value))
    }

    /// Inserts, updates or removes the entry under `key` according to the
    /// updater's result: `Some` stores the value, `None` removes the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    ///
    /// // Insert when absent
    /// let map = map.update_with("hits", |current| Some(current.map_or(1, |count| count + 1)));
    /// assert_eq!(map.get("hits"), Some(&1));
    ///
    /// // Remove by returning None
    /// let map = map.update_with("hits", |_| None);
    /// assert_eq!(map.get("hits"), None);
    /// ```
    #[must_use]
    pub fn update_with<Q, F>(&self, key: &Q, updater: F) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let current = self.get_key_value(key);
        let new_value = updater(current.map(|(_, value)| value));

        match (current, new_value) {
            (Some((actual_key, _)), Some(value)) => {
                let actual_key = actual_key.clone();
                self.insert(actual_key, value)
            }
            (Some(_), None) => self.remove(key),
            (None, Some(value)) => self.insert(key.to_owned(), value),
            (None, None) => self.clone(),
        }
    }

    /// Returns the union of two maps; on duplicate keys, `other` wins.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let left = PersistentHashMap::new().insert("a", 1).insert("b", 2);
    /// let right = PersistentHashMap::new().insert("b", 20).insert("c", 30);
    ///
    /// let merged = left.merge(&right);
    /// assert_eq!(merged.get("a"), Some(&1));
    /// assert_eq!(merged.get("b"), Some(&20));
    /// assert_eq!(merged.get("c"), Some(&30));
    /// ```
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut result = self.transient();
        for (key, value) in other {
            result.insert(key.clone(), value.clone());
        }
        result.persistent()
    }

    /// Returns a transient builder seeded with this map's contents.
    ///
    /// O(1): the builder starts by sharing this map's trie and copies
    /// nodes on demand as it writes into them, so this map is never
    /// affected by the builder's mutations.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a".to_string(), 1);
    ///
    /// let mut builder = map.transient();
    /// builder.insert("b".to_string(), 2);
    /// let extended = builder.persistent();
    ///
    /// assert_eq!(map.len(), 1); // Source map unchanged
    /// assert_eq!(extended.len(), 2);
    /// ```
    #[must_use]
    pub fn transient(&self) -> TransientHashMap<K, V, S> {
        TransientHashMap {
            root: self.root.clone(),
            length: self.length,
            hasher: self.hasher.clone(),
            _not_send: PhantomData,
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// A lazy iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIterator<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An owning iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentHashMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIntoIterator<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Clone, V: Clone, S> IntoIterator for PersistentHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = PersistentHashMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        // Entries are cloned out; the trie may still be shared with other
        // versions of the map.
        let entries: Vec<(K, V)> = Iter::new(&self.root, self.length)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentHashMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a PersistentHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, S: Default> Default for PersistentHashMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> FromIterator<(K, V)> for PersistentHashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = TransientHashMap::with_hasher(S::default());
        for (key, value) in iter {
            transient.insert(key, value);
        }
        transient.persistent()
    }
}

impl<K, V, S> PartialEq for PersistentHashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone + PartialEq,
    S: BuildHasher + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }

        for (key, value) in self {
            match other.get(key) {
                Some(other_value) if other_value == value => {}
                _ => return false,
            }
        }

        true
    }
}

impl<K, V, S> Eq for PersistentHashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone + Eq,
    S: BuildHasher + Clone,
{
}

impl<K: Hash, V: Hash, S> Hash for PersistentHashMap<K, V, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Entry hashes are combined with a commutative operation and
        // computed with a fixed-seed hasher, so equal maps hash equally
        // regardless of trie shape or of the map's own hasher seed.
        let mut combined: u64 = 0;
        for (key, value) in self.iter() {
            let mut entry_hasher = DefaultHasher::new();
            key.hash(&mut entry_hasher);
            value.hash(&mut entry_hasher);
            combined = combined.wrapping_add(entry_hasher.finish());
        }
        state.write_usize(self.length);
        state.write_u64(combined);
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for PersistentHashMap<K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Capability Implementations
// =============================================================================

impl<K, V, S, Q> Lookup<Q> for PersistentHashMap<K, V, S>
where
    K: Borrow<Q> + Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Clone,
    Q: Hash + Eq + ?Sized,
{
    type Value = V;

    fn lookup(&self, key: &Q) -> Option<&V> {
        self.get(key)
    }
}

impl<K, V, S> Associate<K, V> for PersistentHashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn associate(&self, key: K, value: V) -> Self {
        self.insert(key, value)
    }
}

impl<K, V, S, Q> Dissociate<Q> for PersistentHashMap<K, V, S>
where
    K: Borrow<Q> + Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Clone,
    Q: Hash + Eq + ?Sized,
{
    fn dissociate(&self, key: &Q) -> Self {
        self.remove(key)
    }
}

impl<K, V, S> IterateEntries for PersistentHashMap<K, V, S> {
    type Entry<'a>
        = (&'a K, &'a V)
    where
        Self: 'a;

    type Entries<'a>
        = PersistentHashMapIterator<'a, K, V>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        self.iter()
    }
}

// =============================================================================
// Serde Implementations
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, S> serde::Serialize for PersistentHashMap<K, V, S>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<Sr>(&self, serializer: Sr) -> Result<Sr::Ok, Sr::Error>
    where
        Sr: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentHashMapVisitor<K, V, S> {
    marker: PhantomData<(K, V, S)>,
}

#[cfg(feature = "serde")]
impl<K, V, S> PersistentHashMapVisitor<K, V, S> {
    const fn new() -> Self {
        Self {
            marker: PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, S> serde::de::Visitor<'de> for PersistentHashMapVisitor<K, V, S>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
    S: BuildHasher + Clone + Default,
{
    type Value = PersistentHashMap<K, V, S>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut transient = TransientHashMap::with_hasher(S::default());
        while let Some((key, value)) = access.next_entry()? {
            transient.insert(key, value);
        }
        Ok(transient.persistent())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, S> serde::Deserialize<'de> for PersistentHashMap<K, V, S>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
    S: BuildHasher + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentHashMapVisitor::new())
    }
}

// =============================================================================
// TransientError
// =============================================================================

/// Entry cap for a single [`TransientHashMap::insert_bulk`] call.
pub(crate) const MAX_BULK_ENTRIES: usize = u32::MAX as usize;

/// Errors reported by transient builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// A single bulk insert exceeded the supported entry cap.
    BulkLimitExceeded {
        /// The maximum number of entries accepted by one bulk insert.
        limit: usize,
    },
}

impl fmt::Display for TransientError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BulkLimitExceeded { limit } => {
                write!(formatter, "bulk insert exceeded the limit of {limit} entries")
            }
        }
    }
}

impl std::error::Error for TransientError {}

// =============================================================================
// TransientHashMap
// =============================================================================

/// A single-owner mutable builder for [`PersistentHashMap`].
///
/// A transient mutates a trie node in place only while it owns that node
/// exclusively; the first write into a subtree still shared with a
/// persistent snapshot copies the node and continues on the copy, so
/// frozen maps are never affected.
///
/// Sealing with [`persistent`](Self::persistent) consumes the builder, so
/// a sealed builder cannot be touched again; the misuse is rejected at
/// compile time rather than at run time. Transients are deliberately
/// neither `Send` nor `Sync` regardless of the `arc` feature: a builder
/// belongs to one owner on one thread.
///
/// # Examples
///
/// ```rust
/// use trieste::persistent::TransientHashMap;
///
/// let mut transient = TransientHashMap::new();
/// for index in 0..100 {
///     transient.insert(index, index * 2);
/// }
/// let map = transient.persistent();
/// assert_eq!(map.len(), 100);
/// ```
pub struct TransientHashMap<K, V, S = DefaultHashBuilder> {
    root: ReferenceCounter<Node<K, V>>,
    length: usize,
    hasher: S,
    // Pins the builder to one thread even when nodes are Arc-shared.
    _not_send: PhantomData<std::rc::Rc<()>>,
}

assert_not_impl_any!(TransientHashMap<i32, i32>: Send, Sync);

// With Arc-shared nodes the persistent map is safe to share across
// threads; the transient above never is.
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentHashMap<i32, i32>: Send, Sync);

impl<K, V> TransientHashMap<K, V> {
    /// Creates an empty builder with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S> TransientHashMap<K, V, S> {
    /// Creates an empty builder that hashes keys with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            root: ReferenceCounter::new(Node::empty()),
            length: 0,
            hasher,
            _not_send: PhantomData,
        }
    }

    /// Returns the number of entries in the builder.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the builder contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Seals the builder into a persistent map.
    ///
    /// O(1): the built trie is adopted as-is. Consuming `self` is what
    /// makes the freeze safe; no further mutation can reach these nodes
    /// through the builder.
    #[must_use]
    pub fn persistent(self) -> PersistentHashMap<K, V, S> {
        PersistentHashMap {
            root: self.root,
            length: self.length,
            hasher: self.hasher,
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone, S: BuildHasher> TransientHashMap<K, V, S> {
    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(key);
        Node::find(&self.root, hash, key, 0).map(|(_, value)| value)
    }

    /// Returns `true` if the builder contains the key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Inserts an entry in place, returning the previous value under the
    /// key if there was one.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hasher.hash_one(&key);
        let editable = ReferenceCounter::make_mut(&mut self.root);
        let owned = std::mem::replace(editable, Node::empty());
        let (new_root, old_value) = Node::insert_in_place(owned, hash, key, value, 0);
        *editable = new_root;
        if old_value.is_none() {
            self.length += 1;
        }
        old_value
    }

    /// Removes an entry in place, returning its value if the key was
    /// present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(key);
        let editable = ReferenceCounter::make_mut(&mut self.root);
        let owned = std::mem::replace(editable, Node::empty());
        let (new_root, old_value) = Node::remove_in_place(owned, hash, key, 0);
        *editable = new_root;
        if old_value.is_some() {
            self.length -= 1;
        }
        old_value
    }

    /// Inserts every entry from an iterator, returning the builder for
    /// chaining.
    ///
    /// # Errors
    ///
    /// Returns [`TransientError::BulkLimitExceeded`] when the iterator
    /// yields more entries than a single bulk insert accepts; entries up
    /// to the cap have already been applied when the error is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::TransientHashMap;
    ///
    /// let map = TransientHashMap::new()
    ///     .insert_bulk((0..10).map(|index| (index, index * index)))
    ///     .expect("within the bulk limit")
    ///     .persistent();
    /// assert_eq!(map.get(&3), Some(&9));
    /// ```
    pub fn insert_bulk<I>(mut self, entries: I) -> Result<Self, TransientError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (count, (key, value)) in entries.into_iter().enumerate() {
            if count >= MAX_BULK_ENTRIES {
                return Err(TransientError::BulkLimitExceeded {
                    limit: MAX_BULK_ENTRIES,
                });
            }
            self.insert(key, value);
        }
        Ok(self)
    }
}

impl<K, V, S: Default> Default for TransientHashMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> Extend<(K, V)> for TransientHashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, entries: I) {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for TransientHashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = Self::with_hasher(S::default());
        transient.extend(iter);
        transient
    }
}

impl<K, V, S, Q> Lookup<Q> for TransientHashMap<K, V, S>
where
    K: Borrow<Q> + Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher,
    Q: Hash + Eq + ?Sized,
{
    type Value = V;

    fn lookup(&self, key: &Q) -> Option<&V> {
        self.get(key)
    }
}

// =============================================================================
// Tests
// =============================================================================
