//! Error types for the cachecraft library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. a zero statistics window or a zero filter cardinality).
//! - [`InvariantError`]: Returned when internal consistency checks fail
//!   (`check_invariants` methods, intended for tests and debugging).
//!
//! Admission refusals are *not* errors: `insert` simply returns `false` when
//! a policy declines a candidate, and `remove` returns `false` for an absent
//! key.
//!
//! ## Example Usage
//!
//! ```
//! use cachecraft::builder::CacheBuilder;
//! use cachecraft::policy::{AlwaysInsertion, LruEviction, MemoryConstraint};
//!
//! // Fallible construction catches a zero window without panicking.
//! let result = CacheBuilder::new().statistics_window(0).try_build::<u64, u64, _, _, _>(
//!     AlwaysInsertion,
//!     LruEviction::new(),
//!     MemoryConstraint::new(1024),
//! );
//! assert!(result.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
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
/// Produced by [`Cache::check_invariants`](crate::cache::Cache::check_invariants),
/// which cross-checks the data map, the eviction policy's bookkeeping, and the
/// constraint policy's accounting. A failure here always indicates a bug in a
/// policy implementation, never a recoverable runtime condition.
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
