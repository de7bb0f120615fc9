//! lrukit: a thread-safe, fixed-capacity LRU cache.
//!
//! The cache pairs a recency list stored in a slot arena with an `FxHashMap`
//! key index, so `put`, `get` and eviction are all O(1). [`LruCore`] is the
//! single-threaded core; [`LruCache`] wraps it in a re-entrant lock and is
//! safe to share between threads.
//!
//! ```
//! use lrukit::LruCache;
//!
//! let cache = LruCache::new(3);
//! cache.put(1, 1);
//! cache.put(2, 2);
//! cache.put(3, 3);
//!
//! cache.reserve(1);
//! assert_eq!(cache.entries(), vec![(3, 3)]);
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use policy::lru::{LruCache, LruCore};
