//! Cache builder: measures and statistics configuration.
//!
//! The builder carries everything that is *not* a policy — the size
//! measures and the statistics window — and assembles a [`Cache`] around
//! the three policies handed to `build`/`try_build`.
//!
//! ## Example
//!
//! ```
//! use cachecraft::builder::CacheBuilder;
//! use cachecraft::measure::ByteLen;
//! use cachecraft::policy::{AlwaysInsertion, LruEviction, MemoryConstraint};
//!
//! let cache = CacheBuilder::new()
//!     .statistics_window(500)
//!     .measure_key(ByteLen)
//!     .measure_value(ByteLen)
//!     .build::<String, String, _, _, _>(
//!         AlwaysInsertion,
//!         LruEviction::new(),
//!         MemoryConstraint::new(4096),
//!     );
//!
//! assert!(cache.insert("k".to_string(), "value".to_string()));
//! assert_eq!(cache.statistics_window_size(), 500);
//! ```

use std::hash::Hash;

use crate::cache::{Cache, DEFAULT_STATS_WINDOW};
use crate::error::ConfigError;
use crate::measure::{Measure, SizeOf};
use crate::traits::{ConstraintPolicy, EvictionPolicy, InsertionPolicy};

/// Configures measures and statistics for a [`Cache`].
///
/// Builders produce thread-safe caches (the default
/// [`LockMode`](crate::sync::LockMode)); use [`Cache::with_config`] directly
/// for an [`Unsynchronized`](crate::sync::Unsynchronized) instance.
#[derive(Debug, Clone)]
pub struct CacheBuilder<MK = SizeOf, MV = SizeOf> {
    window: usize,
    measure_key: MK,
    measure_value: MV,
}

impl CacheBuilder<SizeOf, SizeOf> {
    /// Starts a builder with `SizeOf` measures and the default window.
    pub fn new() -> Self {
        Self {
            window: DEFAULT_STATS_WINDOW,
            measure_key: SizeOf,
            measure_value: SizeOf,
        }
    }
}

impl Default for CacheBuilder<SizeOf, SizeOf> {
    fn default() -> Self {
        Self::new()
    }
}

impl<MK, MV> CacheBuilder<MK, MV> {
    /// Sets the rolling-statistics window, in lookups.
    pub fn statistics_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Replaces the key measure.
    pub fn measure_key<MK2>(self, measure: MK2) -> CacheBuilder<MK2, MV> {
        CacheBuilder {
            window: self.window,
            measure_key: measure,
            measure_value: self.measure_value,
        }
    }

    /// Replaces the value measure.
    pub fn measure_value<MV2>(self, measure: MV2) -> CacheBuilder<MK, MV2> {
        CacheBuilder {
            window: self.window,
            measure_key: self.measure_key,
            measure_value: measure,
        }
    }

    /// Builds the cache, validating the configuration first.
    pub fn try_build<K, V, I, E, C>(
        self,
        insertion: I,
        eviction: E,
        constraint: C,
    ) -> Result<Cache<K, V, I, E, C, MK, MV>, ConfigError>
    where
        K: Eq + Hash + Clone,
        I: InsertionPolicy<K, V>,
        E: EvictionPolicy<K, V>,
        C: ConstraintPolicy<K, V>,
        MK: Measure<K>,
        MV: Measure<V>,
    {
        if self.window == 0 {
            return Err(ConfigError::new(
                "statistics window must be greater than zero",
            ));
        }
        Ok(Cache::with_config(
            insertion,
            eviction,
            constraint,
            self.measure_key,
            self.measure_value,
            self.window,
        ))
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics on an invalid configuration; see
    /// [`try_build`](Self::try_build) for the fallible variant.
    pub fn build<K, V, I, E, C>(self, insertion: I, eviction: E, constraint: C) -> Cache<K, V, I, E, C, MK, MV>
    where
        K: Eq + Hash + Clone,
        I: InsertionPolicy<K, V>,
        E: EvictionPolicy<K, V>,
        C: ConstraintPolicy<K, V>,
        MK: Measure<K>,
        MV: Measure<V>,
    {
        match self.try_build(insertion, eviction, constraint) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AlwaysInsertion, CountConstraint, LruEviction};

    #[test]
    fn builds_with_custom_window() {
        let cache = CacheBuilder::new()
            .statistics_window(25)
            .build::<u64, u64, _, _, _>(
                AlwaysInsertion,
                LruEviction::new(),
                CountConstraint::new(4),
            );
        assert_eq!(cache.statistics_window_size(), 25);
    }

    #[test]
    fn zero_window_is_a_config_error() {
        let result = CacheBuilder::new().statistics_window(0).try_build::<u64, u64, _, _, _>(
            AlwaysInsertion,
            LruEviction::new(),
            CountConstraint::new(4),
        );
        let err = result.unwrap_err();
        assert!(err.message().contains("window"));
    }

    #[test]
    fn custom_measures_flow_into_accounting() {
        use crate::measure::ByteLen;
        use crate::policy::MemoryConstraint;

        let cache = CacheBuilder::new()
            .measure_key(ByteLen)
            .measure_value(ByteLen)
            .build::<String, String, _, _, _>(
                AlwaysInsertion,
                LruEviction::new(),
                MemoryConstraint::new(100),
            );
        cache.insert("abcd".to_string(), "123456".to_string());
        assert_eq!(cache.with_constraint(|c| c.memory()), 10);
    }
}
