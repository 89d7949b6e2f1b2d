//! Counting bloom filter with conservative update and decay.
//!
//! Approximates per-key observation counts in fixed space. `estimate`
//! returns the minimum over the probed counters, which is an upper bound on
//! the true count since the last `decay`/`clear` (no under-counting, ever).
//!
//! The **conservative update** on `add` increments only the probed slots
//! that currently hold the minimum value, which tightens the over-count
//! compared to incrementing all `k` slots. `decay` halves every counter,
//! letting TinyLFU age out stale popularity.
//!
//! ## Example Usage
//!
//! ```
//! use cachecraft::ds::CountingBloomFilter;
//! use rustc_hash::FxBuildHasher;
//!
//! let mut sketch: CountingBloomFilter<FxBuildHasher> = CountingBloomFilter::new(100);
//! for _ in 0..6 {
//!     sketch.add(&42u64);
//! }
//! assert!(sketch.estimate(&42u64) >= 6); // never under-counts
//!
//! sketch.decay();
//! assert!(sketch.estimate(&42u64) >= 3);
//! ```

use std::hash::{BuildHasher, Hash};

use super::bloom_math::{optimal_filter_size, optimal_num_hashes};
use super::hash_mixer::HashMixer;

/// Fixed-size array of `u32` counters probed through the hash mixer.
#[derive(Debug, Clone)]
pub struct CountingBloomFilter<S> {
    slots: Vec<u32>,
    nonzero_count: usize,
    num_hashes: u32,
    cardinality: u32,
    hasher: S,
}

impl<S: BuildHasher + Default> CountingBloomFilter<S> {
    /// Creates a sketch sized for `cardinality` distinct keys.
    pub fn new(cardinality: u32) -> Self {
        Self::with_hasher(cardinality, S::default())
    }
}

impl<S: BuildHasher> CountingBloomFilter<S> {
    /// Creates a sketch sized for `cardinality` distinct keys, probing with
    /// the supplied hasher.
    pub fn with_hasher(cardinality: u32, hasher: S) -> Self {
        let slot_count = optimal_filter_size(cardinality);
        let num_hashes = optimal_num_hashes(cardinality, slot_count);
        Self {
            slots: vec![0; slot_count],
            nonzero_count: 0,
            num_hashes,
            cardinality,
            hasher,
        }
    }

    /// Records one observation of `item`.
    ///
    /// Conservative update: only the probed slots holding the current
    /// minimum are incremented.
    pub fn add<Q: Hash + ?Sized>(&mut self, item: &Q) {
        let mixer = HashMixer::new(&self.hasher, item, self.slots.len());

        let mut indices = Vec::with_capacity(self.num_hashes as usize);
        let mut minimum = u32::MAX;
        for idx in mixer.take(self.num_hashes as usize) {
            minimum = minimum.min(self.slots[idx]);
            indices.push(idx);
        }

        let was_zero = minimum == 0;
        for idx in indices {
            if self.slots[idx] == minimum {
                self.slots[idx] += 1;
                if was_zero {
                    self.nonzero_count += 1;
                }
            }
        }
    }

    /// Upper bound on the number of times `item` was added since the last
    /// `decay` or `clear`.
    pub fn estimate<Q: Hash + ?Sized>(&self, item: &Q) -> u32 {
        let mixer = HashMixer::new(&self.hasher, item, self.slots.len());
        mixer
            .take(self.num_hashes as usize)
            .map(|idx| self.slots[idx])
            .min()
            .unwrap_or(0)
    }

    /// Halves every counter, aging out old observations.
    pub fn decay(&mut self) {
        for slot in &mut self.slots {
            if *slot == 1 {
                self.nonzero_count -= 1;
            }
            *slot /= 2;
        }
    }

    /// Zeroes every counter.
    pub fn clear(&mut self) {
        self.slots.fill(0);
        self.nonzero_count = 0;
    }

    /// Fraction of slots holding a non-zero count.
    pub fn saturation(&self) -> f64 {
        self.nonzero_count as f64 / self.slots.len() as f64
    }

    /// The cardinality this sketch was sized for.
    #[inline]
    pub fn cardinality(&self) -> u32 {
        self.cardinality
    }

    /// Approximate heap footprint of the sketch, in bytes.
    pub fn memory_used(&self) -> usize {
        self.slots.len() * std::mem::size_of::<u32>() + std::mem::size_of::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxBuildHasher;

    fn sketch(cardinality: u32) -> CountingBloomFilter<FxBuildHasher> {
        CountingBloomFilter::new(cardinality)
    }

    #[test]
    fn unseen_keys_estimate_zero() {
        let s = sketch(100);
        assert_eq!(s.estimate(&99u64), 0);
        assert_eq!(s.saturation(), 0.0);
    }

    #[test]
    fn estimate_never_under_counts() {
        let mut s = sketch(50);
        for round in 1..=20u32 {
            s.add("hot");
            assert!(s.estimate("hot") >= round);
        }
        // Other keys sharing slots may be over-counted but never reduce it.
        for i in 0..50u64 {
            s.add(&i);
        }
        assert!(s.estimate("hot") >= 20);
    }

    #[test]
    fn conservative_update_tracks_exact_count_in_isolation() {
        let mut s = sketch(1000);
        for _ in 0..7 {
            s.add(&1u64);
        }
        // With no colliding keys, the conservative update is exact.
        assert_eq!(s.estimate(&1u64), 7);
    }

    #[test]
    fn decay_halves_estimates() {
        let mut s = sketch(100);
        for _ in 0..8 {
            s.add(&7u64);
        }
        s.decay();
        assert_eq!(s.estimate(&7u64), 4);
        s.decay();
        assert_eq!(s.estimate(&7u64), 2);
    }

    #[test]
    fn decay_drops_ones_to_zero_and_updates_saturation() {
        let mut s = sketch(64);
        s.add(&1u64);
        assert!(s.saturation() > 0.0);
        s.decay();
        assert_eq!(s.estimate(&1u64), 0);
        assert_eq!(s.saturation(), 0.0);
    }

    #[test]
    fn clear_zeroes_all_counters() {
        let mut s = sketch(64);
        for i in 0..64u64 {
            s.add(&i);
        }
        s.clear();
        for i in 0..64u64 {
            assert_eq!(s.estimate(&i), 0);
        }
        assert_eq!(s.saturation(), 0.0);
    }

    #[test]
    fn saturation_grows_with_distinct_keys() {
        let mut s = sketch(200);
        let mut last = 0.0;
        for i in 0..200u64 {
            s.add(&i);
            let now = s.saturation();
            assert!(now >= last);
            last = now;
        }
        assert!(last > 0.0 && last <= 1.0);
    }
}
