//! Optional hit/miss/eviction counters (feature `metrics`).

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use snapshot::LruMetricsSnapshot;
pub use traits::{MetricsReset, MetricsSnapshotProvider};
