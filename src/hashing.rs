//! This module provides the fast `HashMap` and `HashSet` variants used throughout the crate. They
//! are keyed by small integer identities (frame and code ids), for which the `FxHash` algorithm is
//! much cheaper than the randomly seeded default hasher of the standard library.
//!
//! The standard library `HashMap` has a `new` method, but `HashMap<K, V, S>` does not have a `new`
//! method by default. Use `HashMap::default()` instead to create a new hashmap with the default
//! hasher.

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
