pub use crate::builder::LruCacheBuilder;
pub use crate::ds::{IntrusiveList, SlotArena, SlotId};
pub use crate::error::{AllocError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::{LruMetricsSnapshot, MetricsReset, MetricsSnapshotProvider};
pub use crate::policy::lru::{LruCache, LruCore};
