//! Error types for the inertia-cache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache construction parameters are invalid
//!   (the only invalid input is a zero capacity).
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//! use inertia_cache::error::ConfigError;
//! use inertia_cache::metrics::NoopTarget;
//! use inertia_cache::InertiaCache;
//!
//! // Fallible constructor for user-configurable parameters
//! let cache: Result<InertiaCache<String, u64, String, _>, ConfigError> =
//!     InertiaCache::try_new(128, Duration::from_secs(60), Duration::from_secs(5), NoopTarget);
//! assert!(cache.is_ok());
//!
//! // Zero capacity is caught without panicking
//! let bad: Result<InertiaCache<String, u64, String, _>, ConfigError> =
//!     InertiaCache::try_new(0, Duration::from_secs(60), Duration::from_secs(5), NoopTarget);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache construction parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`InertiaCache::try_new`](crate::InertiaCache::try_new) and
/// [`InertiaCacheBuilder::try_build`](crate::builder::InertiaCacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use inertia_cache::metrics::NoopTarget;
/// use inertia_cache::InertiaCache;
///
/// let err = InertiaCache::<u64, u64, String, _>::try_new(
///     0,
///     Duration::from_secs(60),
///     Duration::from_secs(5),
///     NoopTarget,
/// )
/// .unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
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

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by the debug-only
/// [`LruCore::check_invariants`](crate::policy::lru::LruCore::check_invariants).
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

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
