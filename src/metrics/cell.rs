use std::cell::Cell;

/// A counter that can be bumped through `&self`.
///
/// Used by `peek` on the core, which takes `&self`. Not `Sync`: every access
/// happens under the cache lock.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }
}
