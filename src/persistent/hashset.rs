//! Persistent hash set, its lazy view, and its transient builder.
//!
//! [`PersistentHashSet`] stores each element as a key of a
//! [`PersistentHashMap`] with a unit value, so it inherits the map's
//! structural sharing, its copy-on-write transients and its O(log32 N)
//! operations without re-implementing the trie.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::FromIterator;
use std::sync::Arc;

use static_assertions::assert_not_impl_any;

use super::hashmap::{
    PersistentHashMap, PersistentHashMapIntoIterator, PersistentHashMapIterator, TransientHashMap,
};
use super::DefaultHashBuilder;
use crate::capability::{Associate, Dissociate, IterateEntries, Lookup};

// =============================================================================
// PersistentHashSet
// =============================================================================

/// A persistent (immutable) hash set.
///
/// Every update returns a new set and leaves the original untouched;
/// unmodified structure is shared between versions.
///
/// # Examples
///
/// ```rust
/// use trieste::persistent::PersistentHashSet;
///
/// let set = PersistentHashSet::new().insert(1).insert(2).insert(3);
/// assert!(set.contains(&2));
///
/// let smaller = set.remove(&2);
/// assert!(set.contains(&2));      // Original unchanged
/// assert!(!smaller.contains(&2)); // New version
/// ```
#[derive(Clone)]
pub struct PersistentHashSet<T, S = DefaultHashBuilder> {
    inner: PersistentHashMap<T, (), S>,
}

impl<T> PersistentHashSet<T> {
    /// Creates an empty set with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a set containing a single element, with the default hasher.
    #[must_use]
    pub fn singleton(element: T) -> Self
    where
        T: Clone + Hash + Eq,
    {
        Self::new().insert(element)
    }
}

impl<T, S> PersistentHashSet<T, S> {
    /// Creates an empty set that hashes elements with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            inner: PersistentHashMap::with_hasher(hasher),
        }
    }

    /// Returns the number of elements in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns a borrowing iterator over the set's elements.
    ///
    /// The walk is derived lazily from the current root. Element order
    /// follows trie shape, not insertion order.
    #[must_use]
    pub fn iter(&self) -> PersistentHashSetIterator<'_, T> {
        PersistentHashSetIterator {
            inner: self.inner.iter(),
        }
    }
}

impl<T: Clone + Hash + Eq, S: BuildHasher + Clone> PersistentHashSet<T, S> {
    /// Returns `true` if the set contains the element.
    ///
    /// The element may be any borrowed form of the set's element type,
    /// but `Hash` and `Eq` on the borrowed form must match those for the
    /// element type.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(element)
    }

    /// Returns a reference to the stored element equal to `element`.
    #[must_use]
    pub fn get<Q>(&self, element: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get_key_value(element).map(|(stored, ())| stored)
    }

    /// Returns a new set with the element added. The receiver is
    /// unchanged; adding an element already present returns an equal set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashSet;
    ///
    /// let empty = PersistentHashSet::new();
    /// let one = empty.insert(42);
    ///
    /// assert_eq!(empty.len(), 0);
    /// assert!(one.contains(&42));
    /// ```
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        Self {
            inner: self.inner.insert(element, ()),
        }
    }

    /// Returns a new set without the element.
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self {
            inner: self.inner.remove(element),
        }
    }

    /// Returns the union of two sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashSet;
    ///
    /// let left: PersistentHashSet<i32> = [1, 2].into_iter().collect();
    /// let right: PersistentHashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// let union: Vec<i32> = {
    ///     let mut elements: Vec<i32> = left.union(&right).iter().copied().collect();
    ///     elements.sort_unstable();
    ///     elements
    /// };
    /// assert_eq!(union, vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.transient();
        for element in other {
            result.insert(element.clone());
        }
        result.persistent()
    }

    /// Returns the intersection of two sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        // Walk the smaller side, probe the larger.
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut result = TransientHashSet::with_hasher(self.inner.hasher().clone());
        for element in smaller {
            if larger.contains(element) {
                result.insert(element.clone());
            }
        }
        result.persistent()
    }

    /// Returns the elements of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut result = self.transient();
        for element in other {
            result.remove(element);
        }
        result.persistent()
    }

    /// Returns the elements present in exactly one of the two sets.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.difference(other).union(&other.difference(self))
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|element| other.contains(element))
    }

    /// Returns `true` if every element of `other` is in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns `true` if the two sets share no elements.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        smaller.iter().all(|element| !larger.contains(element))
    }

    /// Returns a transient builder seeded with this set's contents.
    ///
    /// O(1); the source set is never affected by the builder's mutations.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trieste::persistent::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new().insert(1);
    ///
    /// let mut builder = set.transient();
    /// builder.insert(2);
    /// builder.insert(3);
    /// let extended = builder.persistent();
    ///
    /// assert_eq!(set.len(), 1); // Source set unchanged
    /// assert_eq!(extended.len(), 3);
    /// ```
    #[must_use]
    pub fn transient(&self) -> TransientHashSet<T, S> {
        TransientHashSet {
            inner: self.inner.transient(),
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// A lazy iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIterator<'a, T> {
    inner: PersistentHashMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentHashSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An owning iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIntoIterator<T> {
    inner: PersistentHashMapIntoIterator<T, ()>,
}

impl<T> Iterator for PersistentHashSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIntoIterator<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Clone, S> IntoIterator for PersistentHashSet<T, S> {
    type Item = T;
    type IntoIter = PersistentHashSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentHashSetIntoIterator {
            inner: self.inner.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a PersistentHashSet<T, S> {
    type Item = &'a T;
    type IntoIter = PersistentHashSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, S: Default> Default for PersistentHashSet<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> FromIterator<T> for PersistentHashSet<T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = TransientHashSet::with_hasher(S::default());
        transient.extend(iter);
        transient.persistent()
    }
}

impl<T, S> PartialEq for PersistentHashSet<T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T, S> Eq for PersistentHashSet<T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher + Clone,
{
}

impl<T: Hash, S> Hash for PersistentHashSet<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<T: fmt::Debug, S> fmt::Debug for PersistentHashSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, S> fmt::Display for PersistentHashSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for element in self.iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Capability Implementations
// =============================================================================

impl<T, S, Q> Lookup<Q> for PersistentHashSet<T, S>
where
    T: Borrow<Q> + Clone + Hash + Eq,
    S: BuildHasher + Clone,
    Q: Hash + Eq + ?Sized,
{
    type Value = T;

    fn lookup(&self, element: &Q) -> Option<&T> {
        self.get(element)
    }
}

impl<T, S> Associate<T, ()> for PersistentHashSet<T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher + Clone,
{
    fn associate(&self, element: T, (): ()) -> Self {
        self.insert(element)
    }
}

impl<T, S, Q> Dissociate<Q> for PersistentHashSet<T, S>
where
    T: Borrow<Q> + Clone + Hash + Eq,
    S: BuildHasher + Clone,
    Q: Hash + Eq + ?Sized,
{
    fn dissociate(&self, element: &Q) -> Self {
        self.remove(element)
    }
}

impl<T, S> IterateEntries for PersistentHashSet<T, S> {
    type Entry<'a>
        = &'a T
    where
        Self: 'a;

    type Entries<'a>
        = PersistentHashSetIterator<'a, T>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        self.iter()
    }
}

// =============================================================================
// HashSetView Definition
// =============================================================================

/// Internal trait for type-erased view operations.
///
/// Enables dynamic dispatch for view operations, allowing map and
/// `flat_map` to change the element type while keeping a uniform
/// interface.
trait HashSetViewOperationDynamic<T> {
    /// Creates an iterator over the view's elements.
    fn create_iterator(&self) -> Box<dyn Iterator<Item = T> + '_>;
}

/// Source operation that wraps the original set.
struct SourceOperation<T> {
    source: PersistentHashSet<T>,
}

impl<T: Clone + Hash + Eq + 'static> HashSetViewOperationDynamic<T> for SourceOperation<T> {
    fn create_iterator(&self) -> Box<dyn Iterator<Item = T> + '_> {
        Box::new(self.source.iter().cloned())
    }
}

/// Filter operation that wraps a source operation and a predicate.
struct FilterOperation<T> {
    source: Arc<dyn HashSetViewOperationDynamic<T>>,
    predicate: Arc<dyn Fn(&T) -> bool + 'static>,
}

impl<T: 'static> HashSetViewOperationDynamic<T> for FilterOperation<T> {
    fn create_iterator(&self) -> Box<dyn Iterator<Item = T> + '_> {
        let predicate = Arc::clone(&self.predicate);
        Box::new(
            self.source
                .create_iterator()
                .filter(move |item| predicate(item)),
        )
    }
}

/// Map operation that transforms elements using a function.
struct MapOperation<T, U> {
    source: Arc<dyn HashSetViewOperationDynamic<T>>,
    function: Arc<dyn Fn(T) -> U + 'static>,
}

impl<T: 'static, U: 'static> HashSetViewOperationDynamic<U> for MapOperation<T, U> {
    fn create_iterator(&self) -> Box<dyn Iterator<Item = U> + '_> {
        let function = Arc::clone(&self.function);
        Box::new(
            self.source
                .create_iterator()
                .map(move |item| function(item)),
        )
    }
}

/// `FlatMap` operation that transforms each element into an iterator and
/// flattens.
struct FlatMapOperation<T, U, I>
where
    I: Iterator<Item = U>,
{
    source: Arc<dyn HashSetViewOperationDynamic<T>>,
    function: Arc<dyn Fn(T) -> I + 'static>,
}

impl<T: 'static, U: 'static, I: Iterator<Item = U> + 'static> HashSetViewOperationDynamic<U>
    for FlatMapOperation<T, U, I>
{
    fn create_iterator(&self) -> Box<dyn Iterator<Item = U> + '_> {
        let function = Arc::clone(&self.function);
        Box::new(
            self.source
                .create_iterator()
                .flat_map(move |item| function(item)),
        )
    }
}

/// A lazy evaluation view over a [`PersistentHashSet`].
///
/// Operations (filter, map, `flat_map`) are defined in O(1) time and
/// evaluated lazily during iteration or materialization via `collect()`.
///
/// # Examples
///
/// ```rust
/// use trieste::persistent::PersistentHashSet;
///
/// let set: PersistentHashSet<i32> = [1, 2, 3, 4, 5].into_iter().collect();
///
/// let result: PersistentHashSet<i32> = set
///     .view()
///     .filter(|x| *x % 2 == 0)
///     .map(|x| x * 2)
///     .collect();
///
/// assert!(result.contains(&4));
/// assert!(result.contains(&8));
/// assert_eq!(result.len(), 2);
/// ```
pub struct HashSetView<T> {
    operation: Arc<dyn HashSetViewOperationDynamic<T>>,
}

impl<T: Clone + Hash + Eq + 'static> PersistentHashSet<T> {
    /// Creates a lazy evaluation view of this set.
    ///
    /// # Complexity
    ///
    /// O(1) - only clones the set reference
    #[must_use]
    pub fn view(&self) -> HashSetView<T> {
        HashSetView {
            operation: Arc::new(SourceOperation {
                source: self.clone(),
            }),
        }
    }
}

impl<T> HashSetView<T> {
    /// Returns an iterator over the view's elements.
    ///
    /// The transformation chain is evaluated lazily during iteration.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.operation.create_iterator()
    }
}

impl<T: Clone + Hash + Eq + 'static> HashSetView<T> {
    /// Returns a new view containing only elements that satisfy the
    /// predicate. O(1) to define; evaluated during iteration.
    #[must_use]
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        Self {
            operation: Arc::new(FilterOperation {
                source: self.operation,
                predicate: Arc::new(predicate),
            }),
        }
    }

    /// Returns a new view with each element transformed by `function`.
    /// O(1) to define; evaluated during iteration.
    #[must_use]
    pub fn map<U, F>(self, function: F) -> HashSetView<U>
    where
        U: Clone + Hash + Eq + 'static,
        F: Fn(T) -> U + 'static,
    {
        HashSetView {
            operation: Arc::new(MapOperation {
                source: self.operation,
                function: Arc::new(function),
            }),
        }
    }

    /// Returns a new view with each element expanded into an iterator and
    /// the results flattened. O(1) to define; evaluated during iteration.
    #[must_use]
    pub fn flat_map<U, I, F>(self, function: F) -> HashSetView<U>
    where
        U: Clone + Hash + Eq + 'static,
        I: Iterator<Item = U> + 'static,
        F: Fn(T) -> I + 'static,
    {
        HashSetView {
            operation: Arc::new(FlatMapOperation {
                source: self.operation,
                function: Arc::new(function),
            }),
        }
    }

    /// Materializes the view into a new set, evaluating the whole
    /// transformation chain.
    #[must_use]
    pub fn collect(self) -> PersistentHashSet<T> {
        self.iter().collect()
    }

    /// Returns `true` if any element of the view satisfies the predicate.
    /// Short-circuits on the first match.
    pub fn any<P>(&self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        self.iter().any(|element| predicate(&element))
    }

    /// Returns `true` if every element of the view satisfies the
    /// predicate. Short-circuits on the first failure.
    pub fn all<P>(&self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        self.iter().all(|element| predicate(&element))
    }

    /// Counts the view's elements, evaluating the transformation chain.
    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Returns `true` if the view produces no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<T> Clone for HashSetView<T> {
    fn clone(&self) -> Self {
        Self {
            operation: Arc::clone(&self.operation),
        }
    }
}

// =============================================================================
// TransientHashSet
// =============================================================================

/// A single-owner mutable builder for [`PersistentHashSet`].
///
/// Delegates to [`TransientHashMap`] with unit values, so it shares the
/// map builder's copy-on-write behavior and its single-thread, O(1)-seal
/// contract. Sealing with [`persistent`](Self::persistent) consumes the
/// builder.
///
/// # Examples
///
/// ```rust
/// use trieste::persistent::TransientHashSet;
///
/// let mut transient = TransientHashSet::new();
/// for index in 0..100 {
///     transient.insert(index);
/// }
/// let set = transient.persistent();
/// assert_eq!(set.len(), 100);
/// ```
pub struct TransientHashSet<T, S = DefaultHashBuilder> {
    inner: TransientHashMap<T, (), S>,
}

assert_not_impl_any!(TransientHashSet<i32>: Send, Sync);

// With Arc-shared nodes the persistent set is safe to share across
// threads; the transient above never is.
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentHashSet<i32>: Send, Sync);

impl<T> TransientHashSet<T> {
    /// Creates an empty builder with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<T, S> TransientHashSet<T, S> {
    /// Creates an empty builder that hashes elements with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            inner: TransientHashMap::with_hasher(hasher),
        }
    }

    /// Returns the number of elements in the builder.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the builder contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Seals the builder into a persistent set. O(1).
    #[must_use]
    pub fn persistent(self) -> PersistentHashSet<T, S> {
        PersistentHashSet {
            inner: self.inner.persistent(),
        }
    }
}

impl<T: Clone + Hash + Eq, S: BuildHasher> TransientHashSet<T, S> {
    /// Returns `true` if the builder contains the element.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(element)
    }

    /// Adds an element in place; returns `true` if it was newly added.
    pub fn insert(&mut self, element: T) -> bool {
        self.inner.insert(element, ()).is_none()
    }

    /// Removes an element in place; returns `true` if it was present.
    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(element).is_some()
    }

    /// Adds every element from an iterator.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<T, S: Default> Default for TransientHashSet<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> FromIterator<T> for TransientHashSet<T, S>
where
    T: Clone + Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = Self::with_hasher(S::default());
        transient.extend(iter);
        transient
    }
}

// =============================================================================
// Serde Implementations
// =============================================================================

#[cfg(feature = "serde")]
impl<T, S> serde::Serialize for PersistentHashSet<T, S>
where
    T: serde::Serialize,
{
    fn serialize<Sr>(&self, serializer: Sr) -> Result<Sr::Ok, Sr::Error>
    where
        Sr: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self.iter() {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentHashSetVisitor<T, S> {
    marker: std::marker::PhantomData<(T, S)>,
}

#[cfg(feature = "serde")]
impl<T, S> PersistentHashSetVisitor<T, S> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::de::Visitor<'de> for PersistentHashSetVisitor<T, S>
where
    T: serde::Deserialize<'de> + Clone + Hash + Eq,
    S: BuildHasher + Clone + Default,
{
    type Value = PersistentHashSet<T, S>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut transient = TransientHashSet::with_hasher(S::default());
        while let Some(element) = seq.next_element()? {
            transient.insert(element);
        }
        Ok(transient.persistent())
    }
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::Deserialize<'de> for PersistentHashSet<T, S>
where
    T: serde::Deserialize<'de> + Clone + Hash + Eq,
    S: BuildHasher + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentHashSetVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
