//! # trieste
//!
//! Persistent (immutable) hash maps and hash sets backed by a hash array
//! mapped trie (HAMT), together with transient builders for efficient
//! batch construction.
//!
//! ## Overview
//!
//! Every "mutating" operation on a persistent collection returns a new
//! collection and leaves the original untouched. Unmodified subtrees are
//! shared between versions by reference, so an update copies only the
//! path from the root to the touched slot:
//!
//! - [`PersistentHashMap`](persistent::PersistentHashMap): immutable hash map
//! - [`PersistentHashSet`](persistent::PersistentHashSet): immutable hash set
//! - [`TransientHashMap`](persistent::TransientHashMap): single-owner mutable builder
//! - [`TransientHashSet`](persistent::TransientHashSet): single-owner mutable builder
//!
//! Transients support the batch-build pattern: seed a builder from a
//! persistent collection (or from empty), apply many in-place updates,
//! then seal it back into a persistent collection in O(1) with
//! `persistent()`.
//!
//! ## Feature Flags
//!
//! - `arc`: share trie nodes with `Arc` instead of `Rc` (persistent
//!   collections become `Send`/`Sync`; transients never are)
//! - `serde`: `Serialize`/`Deserialize` for the persistent collections
//! - `fxhash`: use `rustc-hash` as the default hasher
//! - `ahash`: use `ahash` as the default hasher
//!
//! ## Example
//!
//! ```rust
//! use trieste::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//!
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports the collection types and the capability traits.
///
/// # Usage
///
/// ```rust
/// use trieste::prelude::*;
/// ```
pub mod prelude {
    pub use crate::capability::*;
    pub use crate::persistent::*;
}

pub mod capability;
pub mod persistent;
