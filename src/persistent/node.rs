//! HAMT node layer shared by the persistent and transient hash maps.
//!
//! The trie branches 32 ways per level, addressed by successive 5-bit
//! fragments of the key's hash. Branch nodes come in two shapes: a
//! compact bitmap node for sparse branches and a full 32-slot array node
//! for dense ones. Keys whose full 64-bit hashes collide end up together
//! in a collision node and are distinguished by equality alone.
//!
//! Persistent operations copy the nodes on the path from the root to the
//! touched slot and share everything else. Transient operations walk the
//! same trie through [`ReferenceCounter::make_mut`]: a node that is
//! exclusively owned is edited in place, a node still shared with a
//! frozen snapshot is copied once and the edit continues on the copy.

use std::borrow::Borrow;

use smallvec::SmallVec;

use super::ReferenceCounter;

// =============================================================================
// Constants
// =============================================================================

/// Branching factor (2^5 = 32)
pub(crate) const BRANCHING_FACTOR: usize = 32;

/// Bits per level in the trie
const BITS_PER_LEVEL: usize = 5;

/// Bit mask for extracting index within a node
const MASK: u64 = (BRANCHING_FACTOR - 1) as u64;

/// Maximum depth of the trie (64 bits / 5 bits per level)
const MAX_DEPTH: usize = 64usize.div_ceil(BITS_PER_LEVEL);

/// Population count above which a bitmap node is converted to an array
/// node. Purely a density tuning knob; lookups and updates behave the
/// same on either representation.
const ARRAY_NODE_THRESHOLD: usize = 16;

/// Extracts the branch index at a given depth from a hash.
#[inline]
pub(crate) const fn hash_index(hash: u64, depth: usize) -> usize {
    ((hash >> (depth * BITS_PER_LEVEL)) & MASK) as usize
}

// =============================================================================
// Node Definition
// =============================================================================

/// Internal node structure for the HAMT.
#[derive(Clone)]
pub(crate) enum Node<K, V> {
    /// Empty node (used as sentinel)
    Empty,
    /// Single key-value entry
    Entry { hash: u64, key: K, value: V },
    /// Bitmap-indexed branch node for sparse branches
    Bitmap {
        /// Bitmap indicating which slots are occupied
        bitmap: u32,
        /// Children (entries or subnodes), compressed in ascending
        /// slot-index order
        children: Vec<Child<K, V>>,
    },
    /// Full 32-slot branch node for dense branches
    Array {
        /// Number of occupied slots
        population: usize,
        /// One optional subnode per slot
        children: Box<[Option<ReferenceCounter<Node<K, V>>>; BRANCHING_FACTOR]>,
    },
    /// Collision node for keys with the same full hash
    Collision { hash: u64, entries: Vec<(K, V)> },
}

/// A child in a bitmap node.
#[derive(Clone)]
pub(crate) enum Child<K, V> {
    /// A key-value entry, with its hash cached for splits and collapses
    Entry { hash: u64, key: K, value: V },
    /// A sub-node
    Node(ReferenceCounter<Node<K, V>>),
}

impl<K, V> Child<K, V> {
    /// Converts the child into a standalone node, for array-node slots.
    fn into_node(self) -> ReferenceCounter<Node<K, V>> {
        match self {
            Self::Entry { hash, key, value } => {
                ReferenceCounter::new(Node::Entry { hash, key, value })
            }
            Self::Node(subnode) => subnode,
        }
    }
}

// =============================================================================
// Lookup
// =============================================================================

impl<K, V> Node<K, V> {
    /// Creates an empty node.
    pub(crate) const fn empty() -> Self {
        Self::Empty
    }

    /// Finds the entry stored under `key`, descending by hash fragments.
    pub(crate) fn find<'a, Q>(
        node: &'a Self,
        hash: u64,
        key: &Q,
        depth: usize,
    ) -> Option<(&'a K, &'a V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        match node {
            Self::Empty => None,
            Self::Entry {
                hash: entry_hash,
                key: entry_key,
                value,
            } => {
                if *entry_hash == hash && entry_key.borrow() == key {
                    Some((entry_key, value))
                } else {
                    None
                }
            }
            Self::Bitmap { bitmap, children } => {
                let bit = 1u32 << hash_index(hash, depth);
                if bitmap & bit == 0 {
                    return None;
                }
                let position = (bitmap & (bit - 1)).count_ones() as usize;
                match &children[position] {
                    Child::Entry {
                        hash: child_hash,
                        key: child_key,
                        value,
                    } => {
                        if *child_hash == hash && child_key.borrow() == key {
                            Some((child_key, value))
                        } else {
                            None
                        }
                    }
                    Child::Node(subnode) => Self::find(subnode, hash, key, depth + 1),
                }
            }
            Self::Array { children, .. } => match &children[hash_index(hash, depth)] {
                Some(subnode) => Self::find(subnode, hash, key, depth + 1),
                None => None,
            },
            Self::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash != hash {
                    return None;
                }
                entries
                    .iter()
                    .find(|(entry_key, _)| entry_key.borrow() == key)
                    .map(|(entry_key, value)| (entry_key, value))
            }
        }
    }
}

// =============================================================================
// Persistent (path-copying) operations
// =============================================================================

impl<K: Clone + Eq, V: Clone> Node<K, V> {
    /// Persistent insert.
    ///
    /// Returns `(new_node, was_added)`; `was_added` is `false` when an
    /// existing key's value was replaced. Nodes outside the root-to-slot
    /// path are shared with the input node, never copied.
    pub(crate) fn insert(node: &Self, hash: u64, key: K, value: V, depth: usize) -> (Self, bool) {
        match node {
            Self::Empty => (Self::Entry { hash, key, value }, true),
            Self::Entry {
                hash: existing_hash,
                key: existing_key,
                value: existing_value,
            } => {
                if *existing_hash == hash && *existing_key == key {
                    (Self::Entry { hash, key, value }, false)
                } else if *existing_hash == hash {
                    let entries = vec![(existing_key.clone(), existing_value.clone()), (key, value)];
                    (Self::Collision { hash, entries }, true)
                } else {
                    let existing = Self::Entry {
                        hash: *existing_hash,
                        key: existing_key.clone(),
                        value: existing_value.clone(),
                    };
                    (
                        Self::merge_leaves(existing, *existing_hash, hash, key, value, depth),
                        true,
                    )
                }
            }
            Self::Bitmap { bitmap, children } => {
                Self::insert_into_bitmap(*bitmap, children, hash, key, value, depth)
            }
            Self::Array {
                population,
                children,
            } => Self::insert_into_array(*population, children, hash, key, value, depth),
            Self::Collision {
                hash: collision_hash,
                entries,
            } => {
                if hash == *collision_hash {
                    let mut new_entries = entries.clone();
                    if let Some(entry) = new_entries
                        .iter_mut()
                        .find(|(entry_key, _)| *entry_key == key)
                    {
                        entry.1 = value;
                        (
                            Self::Collision {
                                hash,
                                entries: new_entries,
                            },
                            false,
                        )
                    } else {
                        new_entries.push((key, value));
                        (
                            Self::Collision {
                                hash,
                                entries: new_entries,
                            },
                            true,
                        )
                    }
                } else {
                    (
                        Self::merge_leaves(node.clone(), *collision_hash, hash, key, value, depth),
                        true,
                    )
                }
            }
        }
    }

    /// Builds a branch holding an existing leaf (entry or collision node)
    /// and a new entry whose hashes differ, recursing while their hash
    /// fragments coincide at the current depth.
    fn merge_leaves(
        existing: Self,
        existing_hash: u64,
        hash: u64,
        key: K,
        value: V,
        depth: usize,
    ) -> Self {
        debug_assert!(existing_hash != hash);
        debug_assert!(depth < MAX_DEPTH);
        let existing_index = hash_index(existing_hash, depth);
        let new_index = hash_index(hash, depth);

        if existing_index == new_index {
            let subnode = Self::merge_leaves(existing, existing_hash, hash, key, value, depth + 1);
            Self::Bitmap {
                bitmap: 1u32 << existing_index,
                children: vec![Child::Node(ReferenceCounter::new(subnode))],
            }
        } else {
            let existing_child = match existing {
                Self::Entry { hash, key, value } => Child::Entry { hash, key, value },
                other => Child::Node(ReferenceCounter::new(other)),
            };
            let new_child = Child::Entry { hash, key, value };
            let bitmap = (1u32 << existing_index) | (1u32 << new_index);
            let children = if existing_index < new_index {
                vec![existing_child, new_child]
            } else {
                vec![new_child, existing_child]
            };
            Self::Bitmap { bitmap, children }
        }
    }

    /// Persistent insert into a bitmap node.
    fn insert_into_bitmap(
        bitmap: u32,
        children: &[Child<K, V>],
        hash: u64,
        key: K,
        value: V,
        depth: usize,
    ) -> (Self, bool) {
        let index = hash_index(hash, depth);
        let bit = 1u32 << index;
        let position = (bitmap & (bit - 1)).count_ones() as usize;

        if bitmap & bit == 0 {
            let mut new_children = children.to_vec();
            new_children.insert(position, Child::Entry { hash, key, value });
            let node = Self::Bitmap {
                bitmap: bitmap | bit,
                children: new_children,
            };
            (Self::promote_if_dense(node), true)
        } else {
            let (new_child, added) = match &children[position] {
                Child::Entry {
                    hash: child_hash,
                    key: child_key,
                    value: child_value,
                } => {
                    if *child_hash == hash && *child_key == key {
                        (Child::Entry { hash, key, value }, false)
                    } else if *child_hash == hash {
                        let entries = vec![(child_key.clone(), child_value.clone()), (key, value)];
                        let collision = Self::Collision { hash, entries };
                        (Child::Node(ReferenceCounter::new(collision)), true)
                    } else {
                        let existing = Self::Entry {
                            hash: *child_hash,
                            key: child_key.clone(),
                            value: child_value.clone(),
                        };
                        let subnode =
                            Self::merge_leaves(existing, *child_hash, hash, key, value, depth + 1);
                        (Child::Node(ReferenceCounter::new(subnode)), true)
                    }
                }
                Child::Node(subnode) => {
                    let (new_subnode, added) = Self::insert(subnode, hash, key, value, depth + 1);
                    (Child::Node(ReferenceCounter::new(new_subnode)), added)
                }
            };

            let mut new_children = children.to_vec();
            new_children[position] = new_child;
            (
                Self::Bitmap {
                    bitmap,
                    children: new_children,
                },
                added,
            )
        }
    }

    /// Persistent insert into an array node.
    fn insert_into_array(
        population: usize,
        children: &[Option<ReferenceCounter<Self>>; BRANCHING_FACTOR],
        hash: u64,
        key: K,
        value: V,
        depth: usize,
    ) -> (Self, bool) {
        let index = hash_index(hash, depth);
        match &children[index] {
            Some(subnode) => {
                let (new_subnode, added) = Self::insert(subnode, hash, key, value, depth + 1);
                let mut new_children = Box::new(children.clone());
                new_children[index] = Some(ReferenceCounter::new(new_subnode));
                (
                    Self::Array {
                        population,
                        children: new_children,
                    },
                    added,
                )
            }
            None => {
                let mut new_children = Box::new(children.clone());
                new_children[index] =
                    Some(ReferenceCounter::new(Self::Entry { hash, key, value }));
                (
                    Self::Array {
                        population: population + 1,
                        children: new_children,
                    },
                    true,
                )
            }
        }
    }

    /// Converts a bitmap node to array form once its population crosses
    /// the density threshold; other nodes pass through unchanged.
    fn promote_if_dense(node: Self) -> Self {
        match node {
            Self::Bitmap { bitmap, children } if children.len() > ARRAY_NODE_THRESHOLD => {
                let population = children.len();
                let mut slots: Box<[Option<ReferenceCounter<Self>>; BRANCHING_FACTOR]> =
                    Box::new(std::array::from_fn(|_| None));
                let mut child_iter = children.into_iter();
                for (index, slot) in slots.iter_mut().enumerate() {
                    if bitmap & (1u32 << index) != 0 {
                        *slot = child_iter.next().map(Child::into_node);
                    }
                }
                Self::Array {
                    population,
                    children: slots,
                }
            }
            other => other,
        }
    }

    /// Persistent remove.
    ///
    /// Returns `None` when the key is absent (the caller keeps the
    /// original node), otherwise the replacement node. A branch whose
    /// last entry is removed collapses to [`Node::Empty`]; a bitmap node
    /// left holding a single inline entry collapses to that entry.
    pub(crate) fn remove<Q>(node: &Self, hash: u64, key: &Q, depth: usize) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        match node {
            Self::Empty => None,
            Self::Entry {
                hash: entry_hash,
                key: entry_key,
                ..
            } => {
                if *entry_hash == hash && entry_key.borrow() == key {
                    Some(Self::Empty)
                } else {
                    None
                }
            }
            Self::Bitmap { bitmap, children } => {
                Self::remove_from_bitmap(*bitmap, children, hash, key, depth)
            }
            Self::Array {
                population,
                children,
            } => Self::remove_from_array(*population, children, hash, key, depth),
            Self::Collision {
                hash: collision_hash,
                entries,
            } => Self::remove_from_collision(*collision_hash, entries, hash, key),
        }
    }

    /// Persistent remove from a bitmap node.
    fn remove_from_bitmap<Q>(
        bitmap: u32,
        children: &[Child<K, V>],
        hash: u64,
        key: &Q,
        depth: usize,
    ) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let index = hash_index(hash, depth);
        let bit = 1u32 << index;
        if bitmap & bit == 0 {
            return None;
        }
        let position = (bitmap & (bit - 1)).count_ones() as usize;

        match &children[position] {
            Child::Entry { key: child_key, .. } => {
                if child_key.borrow() != key {
                    return None;
                }
                let new_bitmap = bitmap & !bit;
                if new_bitmap == 0 {
                    return Some(Self::Empty);
                }
                let mut new_children = children.to_vec();
                new_children.remove(position);
                Some(Self::collapse_bitmap(new_bitmap, new_children))
            }
            Child::Node(subnode) => {
                let new_subnode = Self::remove(subnode, hash, key, depth + 1)?;
                match new_subnode {
                    Self::Empty => {
                        let new_bitmap = bitmap & !bit;
                        if new_bitmap == 0 {
                            return Some(Self::Empty);
                        }
                        let mut new_children = children.to_vec();
                        new_children.remove(position);
                        Some(Self::collapse_bitmap(new_bitmap, new_children))
                    }
                    Self::Entry {
                        hash: entry_hash,
                        key: entry_key,
                        value: entry_value,
                    } => {
                        // Inline the surviving entry back into this level.
                        let mut new_children = children.to_vec();
                        new_children[position] = Child::Entry {
                            hash: entry_hash,
                            key: entry_key,
                            value: entry_value,
                        };
                        Some(Self::collapse_bitmap(bitmap, new_children))
                    }
                    other => {
                        let mut new_children = children.to_vec();
                        new_children[position] = Child::Node(ReferenceCounter::new(other));
                        Some(Self::Bitmap {
                            bitmap,
                            children: new_children,
                        })
                    }
                }
            }
        }
    }

    /// Persistent remove through an array node.
    ///
    /// Array nodes are not demoted back to bitmap form when their
    /// population drops; that only affects memory, not behavior.
    fn remove_from_array<Q>(
        population: usize,
        children: &[Option<ReferenceCounter<Self>>; BRANCHING_FACTOR],
        hash: u64,
        key: &Q,
        depth: usize,
    ) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let index = hash_index(hash, depth);
        let subnode = children[index].as_ref()?;
        let new_subnode = Self::remove(subnode, hash, key, depth + 1)?;

        match new_subnode {
            Self::Empty => {
                if population == 1 {
                    return Some(Self::Empty);
                }
                let mut new_children = Box::new(children.clone());
                new_children[index] = None;
                Some(Self::Array {
                    population: population - 1,
                    children: new_children,
                })
            }
            other => {
                let mut new_children = Box::new(children.clone());
                new_children[index] = Some(ReferenceCounter::new(other));
                Some(Self::Array {
                    population,
                    children: new_children,
                })
            }
        }
    }

    /// Persistent remove from a collision node.
    fn remove_from_collision<Q>(
        collision_hash: u64,
        entries: &[(K, V)],
        hash: u64,
        key: &Q,
    ) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if hash != collision_hash {
            return None;
        }
        let position = entries
            .iter()
            .position(|(entry_key, _)| entry_key.borrow() == key)?;

        let mut new_entries = entries.to_vec();
        new_entries.remove(position);

        if new_entries.len() == 1 {
            if let Some((remaining_key, remaining_value)) = new_entries.pop() {
                return Some(Self::Entry {
                    hash: collision_hash,
                    key: remaining_key,
                    value: remaining_value,
                });
            }
        }
        if new_entries.is_empty() {
            return Some(Self::Empty);
        }
        Some(Self::Collision {
            hash: collision_hash,
            entries: new_entries,
        })
    }

    /// Simplifies a bitmap node to a single entry when possible.
    fn collapse_bitmap(bitmap: u32, mut children: Vec<Child<K, V>>) -> Self {
        if children.len() == 1 {
            match children.pop() {
                Some(Child::Entry { hash, key, value }) => {
                    return Self::Entry { hash, key, value };
                }
                Some(child) => children.push(child),
                None => {}
            }
        }
        Self::Bitmap { bitmap, children }
    }
}

// =============================================================================
// Transient (in-place) operations
// =============================================================================

impl<K: Clone + Eq, V: Clone> Node<K, V> {
    /// In-place insert for transients.
    ///
    /// Takes the node by value; callers hold the node behind a
    /// [`ReferenceCounter`] and move it out with `make_mut`, which is
    /// where the copy-on-write boundary lives: a uniquely owned node is
    /// edited directly, a node shared with a persistent snapshot is
    /// copied first. Returns the replaced value for an existing key.
    pub(crate) fn insert_in_place(
        node: Self,
        hash: u64,
        key: K,
        value: V,
        depth: usize,
    ) -> (Self, Option<V>) {
        match node {
            Self::Empty => (Self::Entry { hash, key, value }, None),
            Self::Entry {
                hash: existing_hash,
                key: existing_key,
                value: existing_value,
            } => {
                if existing_hash == hash && existing_key == key {
                    (Self::Entry { hash, key, value }, Some(existing_value))
                } else if existing_hash == hash {
                    let entries = vec![(existing_key, existing_value), (key, value)];
                    (Self::Collision { hash, entries }, None)
                } else {
                    let existing = Self::Entry {
                        hash: existing_hash,
                        key: existing_key,
                        value: existing_value,
                    };
                    (
                        Self::merge_leaves(existing, existing_hash, hash, key, value, depth),
                        None,
                    )
                }
            }
            Self::Bitmap {
                bitmap,
                mut children,
            } => {
                let index = hash_index(hash, depth);
                let bit = 1u32 << index;
                let position = (bitmap & (bit - 1)).count_ones() as usize;

                if bitmap & bit == 0 {
                    children.insert(position, Child::Entry { hash, key, value });
                    let node = Self::Bitmap {
                        bitmap: bitmap | bit,
                        children,
                    };
                    (Self::promote_if_dense(node), None)
                } else {
                    let (new_child, old_value) = match children.remove(position) {
                        Child::Entry {
                            hash: child_hash,
                            key: child_key,
                            value: child_value,
                        } => {
                            if child_hash == hash && child_key == key {
                                (Child::Entry { hash, key, value }, Some(child_value))
                            } else if child_hash == hash {
                                let entries = vec![(child_key, child_value), (key, value)];
                                let collision = Self::Collision { hash, entries };
                                (Child::Node(ReferenceCounter::new(collision)), None)
                            } else {
                                let existing = Self::Entry {
                                    hash: child_hash,
                                    key: child_key,
                                    value: child_value,
                                };
                                let subnode = Self::merge_leaves(
                                    existing, child_hash, hash, key, value, depth + 1,
                                );
                                (Child::Node(ReferenceCounter::new(subnode)), None)
                            }
                        }
                        Child::Node(mut subnode) => {
                            let editable = ReferenceCounter::make_mut(&mut subnode);
                            let owned = std::mem::replace(editable, Self::Empty);
                            let (new_subnode, old_value) =
                                Self::insert_in_place(owned, hash, key, value, depth + 1);
                            *editable = new_subnode;
                            (Child::Node(subnode), old_value)
                        }
                    };
                    children.insert(position, new_child);
                    (Self::Bitmap { bitmap, children }, old_value)
                }
            }
            Self::Array {
                mut population,
                mut children,
            } => {
                let index = hash_index(hash, depth);
                let old_value = if let Some(subnode) = &mut children[index] {
                    let editable = ReferenceCounter::make_mut(subnode);
                    let owned = std::mem::replace(editable, Self::Empty);
                    let (new_subnode, old_value) =
                        Self::insert_in_place(owned, hash, key, value, depth + 1);
                    *editable = new_subnode;
                    old_value
                } else {
                    children[index] =
                        Some(ReferenceCounter::new(Self::Entry { hash, key, value }));
                    population += 1;
                    None
                };
                (
                    Self::Array {
                        population,
                        children,
                    },
                    old_value,
                )
            }
            Self::Collision {
                hash: collision_hash,
                mut entries,
            } => {
                if hash == collision_hash {
                    if let Some(entry) = entries.iter_mut().find(|(entry_key, _)| *entry_key == key)
                    {
                        let old_value = std::mem::replace(&mut entry.1, value);
                        (
                            Self::Collision {
                                hash: collision_hash,
                                entries,
                            },
                            Some(old_value),
                        )
                    } else {
                        entries.push((key, value));
                        (
                            Self::Collision {
                                hash: collision_hash,
                                entries,
                            },
                            None,
                        )
                    }
                } else {
                    let existing = Self::Collision {
                        hash: collision_hash,
                        entries,
                    };
                    (
                        Self::merge_leaves(existing, collision_hash, hash, key, value, depth),
                        None,
                    )
                }
            }
        }
    }

    /// In-place remove for transients. Mirror of [`Self::insert_in_place`];
    /// returns the removed value when the key was present.
    pub(crate) fn remove_in_place<Q>(
        node: Self,
        hash: u64,
        key: &Q,
        depth: usize,
    ) -> (Self, Option<V>)
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        match node {
            Self::Empty => (Self::Empty, None),
            Self::Entry {
                hash: entry_hash,
                key: entry_key,
                value,
            } => {
                if entry_hash == hash && entry_key.borrow() == key {
                    (Self::Empty, Some(value))
                } else {
                    (
                        Self::Entry {
                            hash: entry_hash,
                            key: entry_key,
                            value,
                        },
                        None,
                    )
                }
            }
            Self::Bitmap {
                bitmap,
                mut children,
            } => {
                let index = hash_index(hash, depth);
                let bit = 1u32 << index;
                if bitmap & bit == 0 {
                    return (Self::Bitmap { bitmap, children }, None);
                }
                let position = (bitmap & (bit - 1)).count_ones() as usize;

                match children.remove(position) {
                    Child::Entry {
                        hash: child_hash,
                        key: child_key,
                        value: child_value,
                    } => {
                        if child_hash == hash && child_key.borrow() == key {
                            if children.is_empty() {
                                (Self::Empty, Some(child_value))
                            } else {
                                (
                                    Self::collapse_bitmap(bitmap & !bit, children),
                                    Some(child_value),
                                )
                            }
                        } else {
                            children.insert(
                                position,
                                Child::Entry {
                                    hash: child_hash,
                                    key: child_key,
                                    value: child_value,
                                },
                            );
                            (Self::Bitmap { bitmap, children }, None)
                        }
                    }
                    Child::Node(mut subnode) => {
                        let editable = ReferenceCounter::make_mut(&mut subnode);
                        let owned = std::mem::replace(editable, Self::Empty);
                        let (new_subnode, old_value) =
                            Self::remove_in_place(owned, hash, key, depth + 1);
                        match new_subnode {
                            Self::Empty => {
                                if children.is_empty() {
                                    (Self::Empty, old_value)
                                } else {
                                    (Self::collapse_bitmap(bitmap & !bit, children), old_value)
                                }
                            }
                            Self::Entry {
                                hash: entry_hash,
                                key: entry_key,
                                value: entry_value,
                            } => {
                                children.insert(
                                    position,
                                    Child::Entry {
                                        hash: entry_hash,
                                        key: entry_key,
                                        value: entry_value,
                                    },
                                );
                                (Self::collapse_bitmap(bitmap, children), old_value)
                            }
                            other => {
                                *ReferenceCounter::make_mut(&mut subnode) = other;
                                children.insert(position, Child::Node(subnode));
                                (Self::Bitmap { bitmap, children }, old_value)
                            }
                        }
                    }
                }
            }
            Self::Array {
                mut population,
                mut children,
            } => {
                let index = hash_index(hash, depth);
                if children[index].is_none() {
                    return (
                        Self::Array {
                            population,
                            children,
                        },
                        None,
                    );
                }
                let mut subnode_emptied = false;
                let mut old_value = None;
                if let Some(subnode) = &mut children[index] {
                    let editable = ReferenceCounter::make_mut(subnode);
                    let owned = std::mem::replace(editable, Self::Empty);
                    let (new_subnode, removed) = Self::remove_in_place(owned, hash, key, depth + 1);
                    old_value = removed;
                    if matches!(new_subnode, Self::Empty) {
                        subnode_emptied = true;
                    } else {
                        *editable = new_subnode;
                    }
                }
                if subnode_emptied {
                    children[index] = None;
                    population -= 1;
                    if population == 0 {
                        return (Self::Empty, old_value);
                    }
                }
                (
                    Self::Array {
                        population,
                        children,
                    },
                    old_value,
                )
            }
            Self::Collision {
                hash: collision_hash,
                mut entries,
            } => {
                if hash != collision_hash {
                    return (
                        Self::Collision {
                            hash: collision_hash,
                            entries,
                        },
                        None,
                    );
                }
                let Some(position) = entries
                    .iter()
                    .position(|(entry_key, _)| entry_key.borrow() == key)
                else {
                    return (
                        Self::Collision {
                            hash: collision_hash,
                            entries,
                        },
                        None,
                    );
                };

                let (_, old_value) = entries.remove(position);
                if entries.len() == 1 {
                    if let Some((remaining_key, remaining_value)) = entries.pop() {
                        return (
                            Self::Entry {
                                hash: collision_hash,
                                key: remaining_key,
                                value: remaining_value,
                            },
                            Some(old_value),
                        );
                    }
                }
                if entries.is_empty() {
                    return (Self::Empty, Some(old_value));
                }
                (
                    Self::Collision {
                        hash: collision_hash,
                        entries,
                    },
                    Some(old_value),
                )
            }
        }
    }
}

// =============================================================================
// Lazy depth-first iteration
// =============================================================================

/// A traversal position inside one node.
enum Cursor<'a, K, V> {
    /// A single-entry leaf, consumed on first visit
    Single(Option<(&'a K, &'a V)>),
    /// A bitmap node's children, visited in ascending slot order
    Bitmap {
        children: &'a [Child<K, V>],
        position: usize,
    },
    /// An array node's slots, visited in ascending slot order
    Array {
        children: &'a [Option<ReferenceCounter<Node<K, V>>>],
        position: usize,
    },
    /// A collision node's entries, visited in list order
    Collision {
        entries: &'a [(K, V)],
        position: usize,
    },
}

/// What the traversal decided to do with the current cursor.
enum Step<'a, K, V> {
    Yield((&'a K, &'a V)),
    Descend(&'a Node<K, V>),
    Pop,
}

/// Lazy depth-first walk over a trie.
///
/// Holds a stack of (node, slot-index) cursors and produces entries one
/// at a time without materializing the contents. Each walk is derived
/// fresh from the root and is stateless with respect to prior walks.
/// Entry order follows trie shape, not insertion order, and may differ
/// between maps holding the same logical content.
pub(crate) struct Iter<'a, K, V> {
    stack: SmallVec<[Cursor<'a, K, V>; MAX_DEPTH + 1]>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    /// Starts a walk from `root`; `length` is the entry count beneath it.
    pub(crate) fn new(root: &'a Node<K, V>, length: usize) -> Self {
        let mut iter = Self {
            stack: SmallVec::new(),
            remaining: length,
        };
        iter.push_node(root);
        iter
    }

    fn push_node(&mut self, node: &'a Node<K, V>) {
        match node {
            Node::Empty => {}
            Node::Entry { key, value, .. } => self.stack.push(Cursor::Single(Some((key, value)))),
            Node::Bitmap { children, .. } => self.stack.push(Cursor::Bitmap {
                children,
                position: 0,
            }),
            Node::Array { children, .. } => self.stack.push(Cursor::Array {
                children: &children[..],
                position: 0,
            }),
            Node::Collision { entries, .. } => self.stack.push(Cursor::Collision {
                entries,
                position: 0,
            }),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = match self.stack.last_mut()? {
                Cursor::Single(entry) => match entry.take() {
                    Some(entry) => Step::Yield(entry),
                    None => Step::Pop,
                },
                Cursor::Bitmap { children, position } => {
                    // Reborrow the slice at its own lifetime; the cursor
                    // borrow must not cap the yielded references.
                    let children: &'a [Child<K, V>] = *children;
                    if *position < children.len() {
                        let child = &children[*position];
                        *position += 1;
                        match child {
                            Child::Entry { key, value, .. } => Step::Yield((key, value)),
                            Child::Node(subnode) => Step::Descend(subnode.as_ref()),
                        }
                    } else {
                        Step::Pop
                    }
                }
                Cursor::Array { children, position } => {
                    let children: &'a [Option<ReferenceCounter<Node<K, V>>>] = *children;
                    if *position < children.len() {
                        let slot = &children[*position];
                        *position += 1;
                        match slot {
                            Some(subnode) => Step::Descend(subnode.as_ref()),
                            None => continue,
                        }
                    } else {
                        Step::Pop
                    }
                }
                Cursor::Collision { entries, position } => {
                    let entries: &'a [(K, V)] = *entries;
                    if *position < entries.len() {
                        let (key, value) = &entries[*position];
                        *position += 1;
                        Step::Yield((key, value))
                    } else {
                        Step::Pop
                    }
                }
            };

            match step {
                Step::Yield(entry) => {
                    self.remaining = self.remaining.saturating_sub(1);
                    return Some(entry);
                }
                Step::Descend(node) => self.push_node(node),
                Step::Pop => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

// =============================================================================
// Tests
// =============================================================================
