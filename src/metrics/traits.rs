//! # Metrics Traits
//!
//! Recording and reading are split: the cache core writes counters through
//! the recorder traits, callers read them through
//! [`MetricsSnapshotProvider`] and clear them with [`MetricsReset`].
//!
//! ```text
//!   ┌─────────────────────────────┐      ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │      │   LruMetricsReadRecorder    │
//!   │  get/insert/evict/remove    │      │   peek (&self)              │
//!   └──────────────┬──────────────┘      └──────────────┬──────────────┘
//!                  └──────────────┬─────────────────────┘
//!                                 ▼
//!                          LruMetrics (core)
//!                                 │
//!                                 ▼
//!               MetricsSnapshotProvider<LruMetricsSnapshot>
//! ```

/// Counters written by mutating cache operations.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_insert_rejected(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_shrink_eviction(&mut self);
    fn record_remove(&mut self);
    fn record_clear(&mut self);
}

/// Counters written by read-only operations through `&self`.
pub trait LruMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_hit(&self);
}

/// Snapshot provider for tests and monitoring.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or measurement windows.
pub trait MetricsReset {
    fn reset_metrics(&self);
}
