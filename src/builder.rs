//! Builder for LRU caches.
//!
//! Collects construction options in one place; today that is the capacity
//! and whether storage for the full capacity is reserved up front.
//!
//! ## Example
//!
//! ```rust
//! use lrukit::builder::LruCacheBuilder;
//!
//! let cache = LruCacheBuilder::new(100)
//!     .preallocate(true)
//!     .build::<u64, String>();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::AllocError;
use crate::policy::lru::{LruCache, LruCore};

/// Builder for [`LruCache`] and [`LruCore`] instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LruCacheBuilder {
    capacity: usize,
    preallocate: bool,
}

impl LruCacheBuilder {
    /// Create a new builder for a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            preallocate: false,
        }
    }

    /// Reserve index and slot storage for `capacity` entries at build time.
    ///
    /// Off by default: storage then grows with the number of entries.
    pub fn preallocate(mut self, preallocate: bool) -> Self {
        self.preallocate = preallocate;
        self
    }

    /// Build a single-threaded core.
    pub fn build_core<K, V>(self) -> LruCore<K, V>
    where
        K: Eq + Hash + Clone,
    {
        if self.preallocate {
            LruCore::with_preallocated(self.capacity)
        } else {
            LruCore::new(self.capacity)
        }
    }

    /// Build a thread-safe cache.
    ///
    /// # Type Parameters
    ///
    /// - `K`: Key type, must be `Eq + Hash + Clone`
    /// - `V`: Value type; `get`/`front` additionally need `V: Clone`
    pub fn build<K, V>(self) -> LruCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        LruCache::from_core(self.build_core())
    }

    /// Build a thread-safe cache, reporting a failed preallocation instead of
    /// aborting.
    pub fn try_build<K, V>(self) -> Result<LruCache<K, V>, AllocError>
    where
        K: Eq + Hash + Clone,
    {
        let core = if self.preallocate {
            LruCore::try_with_preallocated(self.capacity)?
        } else {
            LruCore::new(self.capacity)
        };
        Ok(LruCache::from_core(core))
    }
}
