//! Cache statistics: rolling-window rates and cumulative counters.
//!
//! Two views of cache activity are maintained:
//!
//! - **Rolling rates**: [`RollingMean`] accumulators over the last `W`
//!   lookups. The hit accumulator records `0`/`1` per `find`; the byte-hit
//!   accumulator records `0`/`value_size`. Both reset on `clear` and when the
//!   window size changes.
//! - **Cumulative counters**: a [`MetricsSnapshot`] of hits, misses, inserts,
//!   updates, removals, and evictions since creation (or the last `clear`).

use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// RollingMean
// ---------------------------------------------------------------------------

/// Mean over the last `capacity` recorded samples.
///
/// Samples older than the window fall out of the mean. An empty accumulator
/// reports a mean of `0.0`.
///
/// ```
/// use cachecraft::stats::RollingMean;
///
/// let mut acc = RollingMean::new(3);
/// acc.record(1);
/// acc.record(1);
/// acc.record(0);
/// assert!((acc.mean() - 2.0 / 3.0).abs() < 1e-9);
///
/// // A fourth sample pushes the oldest out of the window.
/// acc.record(0);
/// assert!((acc.mean() - 1.0 / 3.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct RollingMean {
    samples: VecDeque<u64>,
    capacity: usize,
    sum: u64,
}

impl RollingMean {
    /// Creates an accumulator over a window of `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "rolling window must hold at least one sample");
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0,
        }
    }

    /// Records a sample, dropping the oldest one if the window is full.
    pub fn record(&mut self, sample: u64) {
        if self.samples.len() == self.capacity {
            if let Some(expired) = self.samples.pop_front() {
                self.sum -= expired;
            }
        }
        self.samples.push_back(sample);
        self.sum += sample;
    }

    /// Mean of the samples currently in the window; `0.0` when empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum as f64 / self.samples.len() as f64
        }
    }

    /// Window capacity, in samples.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples have been recorded since the last clear.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drops all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.sum = 0;
    }
}

// ---------------------------------------------------------------------------
// MetricsSnapshot
// ---------------------------------------------------------------------------

/// Point-in-time view of cumulative cache activity counters.
///
/// All fields count events since cache creation or the last `clear`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Lookups that found their key.
    pub hits: u64,
    /// Lookups that did not.
    pub misses: u64,
    /// Admitted fresh insertions.
    pub inserts: u64,
    /// Admitted value replacements for resident keys.
    pub updates: u64,
    /// Entries dropped by `remove` or `retain`.
    pub removals: u64,
    /// Entries dropped to satisfy the constraint.
    pub evictions: u64,
}

// ---------------------------------------------------------------------------
// CacheStats
// ---------------------------------------------------------------------------

/// Combined rolling-rate and counter state owned by the cache core.
#[derive(Debug)]
pub(crate) struct CacheStats {
    hit_rate: RollingMean,
    byte_hit_rate: RollingMean,
    counters: MetricsSnapshot,
}

impl CacheStats {
    pub(crate) fn new(window: usize) -> Self {
        Self {
            hit_rate: RollingMean::new(window),
            byte_hit_rate: RollingMean::new(window),
            counters: MetricsSnapshot::default(),
        }
    }

    pub(crate) fn record_hit(&mut self, value_size: u64) {
        self.hit_rate.record(1);
        self.byte_hit_rate.record(value_size);
        self.counters.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.hit_rate.record(0);
        self.byte_hit_rate.record(0);
        self.counters.misses += 1;
    }

    pub(crate) fn note_insert(&mut self) {
        self.counters.inserts += 1;
    }

    pub(crate) fn note_update(&mut self) {
        self.counters.updates += 1;
    }

    pub(crate) fn note_removal(&mut self) {
        self.counters.removals += 1;
    }

    pub(crate) fn note_eviction(&mut self) {
        self.counters.evictions += 1;
    }

    pub(crate) fn hit_rate(&self) -> f64 {
        self.hit_rate.mean()
    }

    pub(crate) fn byte_hit_rate(&self) -> f64 {
        self.byte_hit_rate.mean()
    }

    pub(crate) fn window_size(&self) -> usize {
        self.hit_rate.capacity()
    }

    /// Rebuilds the rolling accumulators over a new window, dropping their
    /// samples. Cumulative counters are unaffected.
    pub(crate) fn set_window_size(&mut self, window: usize) {
        self.hit_rate = RollingMean::new(window);
        self.byte_hit_rate = RollingMean::new(window);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        self.counters
    }

    /// Full reset: rolling samples and cumulative counters.
    pub(crate) fn reset(&mut self) {
        self.hit_rate.clear();
        self.byte_hit_rate.clear();
        self.counters = MetricsSnapshot::default();
    }
}
