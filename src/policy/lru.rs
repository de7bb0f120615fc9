//! # Least Recently Used (LRU) Cache Implementation
//!
//! A fixed-capacity LRU cache with O(1) `put`, `get` and eviction, split into
//! a single-threaded core and a thread-safe wrapper.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<K, V>                              │
//!   │   id: u64 (lock ordering)                                            │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │          ReentrantMutex<RefCell<LruCore<K, V>>>              │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                                  │                                   │
//!   │                                  ▼                                   │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │                      LruCore<K, V>                           │   │
//!   │   │                                                              │   │
//!   │   │   FxHashMap<K, SlotId>            IntrusiveList<Entry<K,V>>  │   │
//!   │   │   ┌────────┬────────┐                                        │   │
//!   │   │   │ key_a  │ id_3 ──┼──┐   head ─► [id_3] ◄──► [id_0] ◄──►   │   │
//!   │   │   │ key_b  │ id_0 ──┼──┼─────────────────────┘     [id_1]    │   │
//!   │   │   │ key_c  │ id_1 ──┼──┼──────────────────────────────┘ ▲    │   │
//!   │   │   └────────┴────────┘  │                        tail ───┘    │   │
//!   │   │                        └─ (MRU)                    (LRU)     │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations Flow
//!
//! ```text
//!   PUT new key (cache full, capacity = 3)
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   Before:   head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!
//!   put(D):
//!     1. Overwrite the tail slot in place: C ─► D (key and value)
//!     2. index: remove C, map D to the same SlotId
//!     3. Move the slot to head
//!
//!   After:    head ──► [D] ◄──► [A] ◄──► [B] ◄── tail
//!
//!   No slot is allocated or freed on this path.
//!
//!   GET existing key
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   get(B):   index lookup O(1), move slot to head O(1), clone value out
//!
//!   After:    head ──► [B] ◄──► [D] ◄──► [A] ◄── tail
//! ```
//!
//! ## Key Components
//!
//! | Component         | Description                                           |
//! |-------------------|-------------------------------------------------------|
//! | `LruCore<K, V>`   | Single-threaded core: recency list + key index        |
//! | `LruCache<K, V>`  | Thread-safe wrapper, one re-entrant lock per instance |
//! | `Entry<K, V>`     | Key and value stored in one arena slot                |
//!
//! ## Thread Safety
//!
//! - `LruCore`: **not** internally synchronized; needs `&mut self` to mutate.
//! - `LruCache`: every operation holds the instance lock for its whole
//!   duration. Values leave the cache as clones, never as references.
//! - Operations spanning two caches (`assign_from`, `take_from`, `swap`)
//!   lock both instances in ascending instance-id order.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::error::{AllocError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, LruMetricsReadRecorder, MetricsReset, MetricsSnapshotProvider,
};

/// Default capacity used by `LruCache::default()`.
pub const DEFAULT_CAPACITY: usize = 16;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Single-threaded LRU cache core.
///
/// Entries live in an [`IntrusiveList`] ordered MRU to LRU; the key index maps
/// each key to the entry's `SlotId`. Slot ids survive reordering, so the
/// index never has to be touched when an entry merely moves.
///
/// A capacity of 0 creates a cache that accepts no entries.
///
/// # Example
///
/// ```
/// use lrukit::LruCore;
///
/// let mut core = LruCore::new(2);
/// core.put(1, "a");
/// core.put(2, "b");
/// assert_eq!(core.get(&1), Some(&"a"));
///
/// core.put(3, "c"); // evicts 2, the least recently used
/// assert!(!core.cached(&2));
/// assert_eq!(core.front(), Some((&3, &"c")));
/// ```
pub struct LruCore<K, V> {
    list: IntrusiveList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCore<K, V> {
    /// Creates an empty core. Storage grows on demand up to `capacity`.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::new(),
            index: FxHashMap::default(),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        }
    }

    /// Number of cached entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the most recently used entry without touching recency.
    pub fn front(&self) -> Option<(&K, &V)> {
        self.list.front().map(|entry| (&entry.key, &entry.value))
    }

    /// Returns the least recently used entry, the next eviction victim.
    pub fn back(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Removes every entry; capacity is unchanged.
    pub fn clear(&mut self) {
        let dropped = self.len();
        self.list.clear();
        self.index.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        if dropped > 0 {
            debug!("lru cleared {dropped} entries");
        }
    }

    /// Moves all entries out, leaving this core empty with its capacity intact.
    pub fn take(&mut self) -> Self {
        self.replace_contents(Self::new(self.capacity))
    }

    /// Installs the entries and capacity of `incoming` and returns the
    /// previous ones. Metrics stay with `self`.
    fn replace_contents(&mut self, mut incoming: Self) -> Self {
        self.swap_contents(&mut incoming);
        incoming
    }

    fn swap_contents(&mut self, other: &mut Self) {
        mem::swap(&mut self.list, &mut other.list);
        mem::swap(&mut self.index, &mut other.index);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }

    #[cfg(feature = "metrics")]
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core with index and slot storage for `capacity` entries
    /// already allocated.
    pub fn with_preallocated(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        }
    }

    /// Like [`with_preallocated`](Self::with_preallocated), but reports
    /// allocation failure instead of aborting.
    pub fn try_with_preallocated(capacity: usize) -> Result<Self, AllocError> {
        let mut core = Self::new(capacity);
        core.index.try_reserve(capacity)?;
        core.list.try_reserve(capacity)?;
        Ok(core)
    }

    /// Inserts or refreshes `key`.
    ///
    /// - capacity 0: no-op
    /// - key present: value overwritten, entry moved to head
    /// - key new, room left: new entry at head
    /// - key new, full: the tail slot is recycled for the new entry
    pub fn put(&mut self, key: K, value: V) {
        self.put_displacing(key, value);
    }

    /// Like [`put`](Self::put), but reserves room for a new entry first.
    ///
    /// On `Err` nothing has been modified.
    pub fn try_put(&mut self, key: K, value: V) -> Result<(), AllocError> {
        self.try_put_displacing(key, value).map(drop)
    }

    /// `put` that hands back whatever the cache did not keep: the rejected
    /// pair at capacity 0, the duplicate key and overwritten value on a hit,
    /// or the evicted pair when the tail slot is recycled.
    fn put_displacing(&mut self, key: K, value: V) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.capacity == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return Some((key, value));
        }

        if let Some(&id) = self.index.get(&key) {
            let old_value = self
                .list
                .get_mut(id)
                .map(|entry| mem::replace(&mut entry.value, value));
            self.list.move_to_front(id);
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            return old_value.map(|old| (key, old));
        }

        if self.len() < self.capacity {
            self.push_entry(key, value);
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_new();
            None
        } else {
            self.recycle_tail(key, value)
        }
    }

    fn try_put_displacing(&mut self, key: K, value: V) -> Result<Option<(K, V)>, AllocError> {
        if self.capacity > 0 && !self.cached(&key) {
            // Recycling the tail removes and re-inserts an index key, which
            // may still need index growth.
            self.index.try_reserve(1)?;
            if self.len() < self.capacity {
                self.list.try_reserve(1)?;
            }
        }
        Ok(self.put_displacing(key, value))
    }

    /// Looks up `key` and marks it most recently used.
    ///
    /// A miss leaves the recency order untouched.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let Some(&id) = self.index.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.list.move_to_front(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Looks up `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_call();
        let id = *self.index.get(key)?;
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_hit();
        self.list.get(id).map(|entry| &entry.value)
    }

    /// O(1) membership test; does not touch recency.
    #[inline]
    pub fn cached(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        #[cfg(feature = "metrics")]
        self.metrics.record_remove();
        self.list.remove(id).map(|entry| entry.value)
    }

    /// Sets the capacity, evicting least recently used entries until the
    /// cache fits. The resulting size is `min(len, new_capacity)`.
    pub fn reserve(&mut self, new_capacity: usize) {
        self.capacity = new_capacity;
        let excess = self.len().saturating_sub(new_capacity);
        for _ in 0..excess {
            if self.pop_lru().is_none() {
                break;
            }
            #[cfg(feature = "metrics")]
            self.metrics.record_shrink_eviction();
        }
        if excess > 0 {
            debug!("lru capacity set to {new_capacity}, evicted {excess} entries");
        }
    }

    /// Checks that the index and the recency list describe the same entries.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_links()?;

        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} entries",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if entry.key == *key => {},
                Some(_) => {
                    return Err(InvariantError::new(format!(
                        "slot {} holds a different key than the index expects",
                        id.index()
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "index points at vacant slot {}",
                        id.index()
                    )));
                },
            }
        }
        Ok(())
    }

    fn push_entry(&mut self, key: K, value: V) {
        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
    }

    /// Reuses the LRU slot for a new entry: evict and insert in one step.
    /// Returns the evicted pair.
    fn recycle_tail(&mut self, key: K, value: V) -> Option<(K, V)> {
        let id = self.list.back_id()?;
        let entry = self.list.get_mut(id)?;
        let old_key = mem::replace(&mut entry.key, key.clone());
        let old_value = mem::replace(&mut entry.value, value);

        self.index.remove(&old_key);
        self.index.insert(key, id);
        self.list.move_to_front(id);

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_insert_new();
            self.metrics.record_evicted_entry();
        }
        trace!("lru recycled slot {} for a new key", id.index());
        Some((old_key, old_value))
    }

    fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_back()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }
}

impl<K, V> Clone for LruCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Builds an independent copy with the same capacity and recency order
    /// by replaying entries from LRU to MRU. Metrics start from zero.
    fn clone(&self) -> Self {
        let mut copy = Self::new(self.capacity);
        copy.index.reserve(self.len());
        for entry in self.list.iter_rev() {
            copy.push_entry(entry.key.clone(), entry.value.clone());
        }
        copy
    }
}

impl<K, V> fmt::Debug for LruCore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCore<K, V> {
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity)
    }
}

// ---------------------------------------------------------------------------
// LruCache
// ---------------------------------------------------------------------------

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(0);

type CoreGuard<'a, K, V> = ReentrantMutexGuard<'a, RefCell<LruCore<K, V>>>;

/// Thread-safe LRU cache.
///
/// One re-entrant lock guards the recency list and the key index together,
/// so every method is atomic with respect to every other method on the same
/// instance. Lookups return clones made while the lock is held.
///
/// The lock tolerates re-acquisition by the thread that holds it. A nested
/// call that needs mutable access while an outer call on the same thread is
/// still using the core (for example a value's `Clone` impl calling `put` on
/// the cache it is being read from) panics instead of deadlocking.
///
/// # Example
///
/// ```
/// use lrukit::LruCache;
///
/// let cache = LruCache::new(2);
/// cache.put(1, "a".to_string());
/// cache.put(2, "b".to_string());
///
/// assert_eq!(cache.get(&1), Some("a".to_string()));
/// cache.put(3, "c".to_string());
///
/// assert!(!cache.cached(&2));
/// assert_eq!(cache.front(), Some((3, "c".to_string())));
/// assert_eq!(cache.len(), 2);
/// ```
pub struct LruCache<K, V> {
    id: u64,
    inner: ReentrantMutex<RefCell<LruCore<K, V>>>,
}

impl<K, V> LruCache<K, V> {
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self::from_core(LruCore::new(capacity))
    }

    /// Wraps an existing core.
    pub fn from_core(core: LruCore<K, V>) -> Self {
        Self {
            id: NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed),
            inner: ReentrantMutex::new(RefCell::new(core)),
        }
    }

    /// Unwraps the cache into its single-threaded core.
    pub fn into_core(self) -> LruCore<K, V> {
        self.inner.into_inner().into_inner()
    }

    fn read<R>(&self, f: impl FnOnce(&LruCore<K, V>) -> R) -> R {
        let guard = self.inner.lock();
        let core = guard.borrow();
        f(&core)
    }

    fn write<R>(&self, f: impl FnOnce(&mut LruCore<K, V>) -> R) -> R {
        let guard = self.inner.lock();
        let mut core = guard.borrow_mut();
        f(&mut core)
    }

    /// Locks `self` and `other` in ascending id order. Callers rule out
    /// `self` and `other` being the same instance.
    fn lock_pair<'a>(&'a self, other: &'a Self) -> (CoreGuard<'a, K, V>, CoreGuard<'a, K, V>) {
        if self.id < other.id {
            let mine = self.inner.lock();
            let theirs = other.inner.lock();
            (mine, theirs)
        } else {
            let theirs = other.inner.lock();
            let mine = self.inner.lock();
            (mine, theirs)
        }
    }

    #[inline]
    fn same_instance(&self, other: &Self) -> bool {
        self.id == other.id
    }

    pub fn len(&self) -> usize {
        self.read(LruCore::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(LruCore::is_empty)
    }

    pub fn capacity(&self) -> usize {
        self.read(LruCore::capacity)
    }

    /// Removes every entry; capacity is unchanged.
    pub fn clear(&self) {
        self.write(LruCore::clear);
    }

    /// Moves all entries into a new cache in O(1).
    ///
    /// `self` is left empty but usable, and keeps its capacity.
    pub fn take(&self) -> Self {
        let core = self.write(LruCore::take);
        debug!("lru cache {} moved out {} entries", self.id, core.len());
        Self::from_core(core)
    }

    /// Move assignment: replaces this cache's entries and capacity with
    /// `source`'s and leaves `source` empty (capacity kept).
    ///
    /// Taking from itself is a no-op.
    pub fn take_from(&self, source: &Self) {
        if self.same_instance(source) {
            return;
        }
        let displaced = {
            let (mine, theirs) = self.lock_pair(source);
            let moved = theirs.borrow_mut().take();
            let mut target = mine.borrow_mut();
            target.replace_contents(moved)
        };
        debug!(
            "lru cache {} took contents of cache {}, dropping {} entries",
            self.id,
            source.id,
            displaced.len()
        );
    }

    /// Exchanges entries and capacities with `other`.
    pub fn swap(&self, other: &Self) {
        if self.same_instance(other) {
            return;
        }
        let (mine, theirs) = self.lock_pair(other);
        mine.borrow_mut().swap_contents(&mut theirs.borrow_mut());
        debug!("lru caches {} and {} swapped contents", self.id, other.id);
    }
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with storage for `capacity` entries allocated up front.
    pub fn with_preallocated(capacity: usize) -> Self {
        Self::from_core(LruCore::with_preallocated(capacity))
    }

    /// Inserts or refreshes `key`, evicting the LRU entry when full.
    ///
    /// Overwritten and evicted entries are dropped after the lock is
    /// released, so their `Drop` impls may use this cache.
    pub fn put(&self, key: K, value: V) {
        let displaced = self.write(|core| core.put_displacing(key, value));
        drop(displaced);
    }

    /// Like [`put`](Self::put), but reports allocation failure. On `Err` the
    /// cache is unchanged.
    pub fn try_put(&self, key: K, value: V) -> Result<(), AllocError> {
        let displaced = self.write(|core| core.try_put_displacing(key, value))?;
        drop(displaced);
        Ok(())
    }

    pub fn cached(&self, key: &K) -> bool {
        self.read(|core| core.cached(key))
    }

    /// Removes `key` and returns its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.write(|core| core.remove(key))
    }

    /// Sets the capacity, evicting least recently used entries as needed.
    pub fn reserve(&self, new_capacity: usize) {
        self.write(|core| core.reserve(new_capacity));
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.read(LruCore::check_invariants)
    }
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Returns a copy of the value for `key` and marks it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        self.write(|core| core.get(key).cloned())
    }

    /// Returns a copy of the value for `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.read(|core| core.peek(key).cloned())
    }

    /// Copy of the most recently used entry.
    pub fn front(&self) -> Option<(K, V)> {
        self.read(|core| core.front().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Copy of the least recently used entry.
    pub fn back(&self) -> Option<(K, V)> {
        self.read(|core| core.back().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Copies all entries, most recently used first.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.read(|core| {
            core.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
    }

    /// Copy assignment: makes this cache an independent copy of `source`
    /// (capacity, entries and recency order).
    ///
    /// The copy is built before this cache is touched, so a panicking
    /// `Clone` leaves it unchanged. Assigning from itself is a no-op.
    pub fn assign_from(&self, source: &Self) {
        if self.same_instance(source) {
            return;
        }
        let displaced = {
            let (mine, theirs) = self.lock_pair(source);
            let copy = theirs.borrow().clone();
            let mut target = mine.borrow_mut();
            target.replace_contents(copy)
        };
        debug!(
            "lru cache {} copied from cache {}, dropping {} entries",
            self.id,
            source.id,
            displaced.len()
        );
    }
}

impl<K, V> Clone for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self::from_core(self.read(LruCore::clone))
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_from(source);
    }
}

impl<K, V> Default for LruCache<K, V> {
    /// Creates a cache with a capacity of [`DEFAULT_CAPACITY`].
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (len, capacity) = self.read(|core| (core.len(), core.capacity()));
        f.debug_struct("LruCache")
            .field("id", &self.id)
            .field("len", &len)
            .field("capacity", &capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCache<K, V> {
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.read(|core| core.snapshot())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsReset for LruCache<K, V> {
    fn reset_metrics(&self) {
        self.write(LruCore::reset_metrics);
    }
}
