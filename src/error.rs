//! Error types for the lrukit library.
//!
//! Cache misses are not errors: lookups return `Option`. The types here cover
//! the two places where something can actually go wrong.
//!
//! - [`AllocError`]: Returned by fallible insertion and preallocation
//!   ([`LruCache::try_put`](crate::LruCache::try_put),
//!   [`LruCacheBuilder::try_build`](crate::builder::LruCacheBuilder::try_build))
//!   when the allocator refuses to grow the index or the slot arena. The
//!   cache is left exactly as it was before the call.
//! - [`InvariantError`]: Returned by `check_invariants` when the key index
//!   and the recency list disagree.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::LruCache;
//!
//! let cache = LruCache::new(2);
//! cache.try_put(1, "one").expect("room for one entry");
//! assert!(cache.check_invariants().is_ok());
//! ```

use std::collections::TryReserveError;
use std::error::Error;
use std::fmt;

// ---------------------------------------------------------------------------
// AllocError
// ---------------------------------------------------------------------------

/// Error returned when reserving storage for a new entry fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocError {
    source: TryReserveError,
}

impl AllocError {
    /// Returns the underlying reservation failure.
    #[inline]
    pub fn reserve_error(&self) -> &TryReserveError {
        &self.source
    }
}

impl From<TryReserveError> for AllocError {
    fn from(source: TryReserveError) -> Self {
        Self { source }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to reserve cache storage: {}", self.source)
    }
}

impl Error for AllocError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reserve_failure() -> TryReserveError {
        Vec::<u64>::new().try_reserve(usize::MAX).unwrap_err()
    }

    // -- AllocError -------------------------------------------------------

    #[test]
    fn alloc_display_mentions_storage() {
        let err = AllocError::from(reserve_failure());
        assert!(err.to_string().starts_with("failed to reserve cache storage"));
    }

    #[test]
    fn alloc_exposes_source() {
        let err = AllocError::from(reserve_failure());
        assert!(err.source().is_some());
        assert_eq!(err.reserve_error(), &reserve_failure());
    }

    #[test]
    fn alloc_implements_std_error() {
        fn assert_error<T: Error + Send + Sync + 'static>() {}
        assert_error::<AllocError>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("index length mismatch");
        assert_eq!(err.to_string(), "index length mismatch");
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_clone_and_eq() {
        let a = InvariantError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: Error + Send + Sync + 'static>() {}
        assert_error::<InvariantError>();
    }
}
