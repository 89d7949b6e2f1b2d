//! Bit-array bloom filter.
//!
//! Set-membership with false positives and no false negatives. Sized at
//! construction for an expected cardinality (see
//! [`bloom_math`](crate::ds::bloom_math)); the false-positive rate follows
//! the classical bound at that load and degrades gracefully beyond it. The
//! filter cannot be resized after construction.
//!
//! ## Example Usage
//!
//! ```
//! use cachecraft::ds::BloomFilter;
//! use rustc_hash::FxBuildHasher;
//!
//! let mut filter: BloomFilter<FxBuildHasher> = BloomFilter::new(100);
//! filter.add("seen");
//!
//! assert!(filter.maybe_contains("seen"));   // never a false negative
//! assert_eq!(filter.cardinality(), 100);
//! assert!(filter.saturation() > 0.0);
//! ```

use std::hash::{BuildHasher, Hash};

use super::bloom_math::{optimal_filter_size, optimal_num_hashes};
use super::hash_mixer::HashMixer;

const BITS_PER_BLOCK: usize = u64::BITS as usize;

/// Fixed-size bloom filter over `k` mixer-derived probe positions.
#[derive(Debug, Clone)]
pub struct BloomFilter<S> {
    blocks: Vec<u64>,
    bit_count: usize,
    set_bits: usize,
    num_hashes: u32,
    cardinality: u32,
    hasher: S,
}

impl<S: BuildHasher + Default> BloomFilter<S> {
    /// Creates a filter sized for `cardinality` distinct keys.
    pub fn new(cardinality: u32) -> Self {
        Self::with_hasher(cardinality, S::default())
    }
}

impl<S: BuildHasher> BloomFilter<S> {
    /// Creates a filter sized for `cardinality` distinct keys, probing with
    /// the supplied hasher.
    pub fn with_hasher(cardinality: u32, hasher: S) -> Self {
        let bit_count = optimal_filter_size(cardinality);
        let num_hashes = optimal_num_hashes(cardinality, bit_count);
        Self {
            blocks: vec![0; bit_count.div_ceil(BITS_PER_BLOCK)],
            bit_count,
            set_bits: 0,
            num_hashes,
            cardinality,
            hasher,
        }
    }

    /// Records `item` in the filter.
    pub fn add<Q: Hash + ?Sized>(&mut self, item: &Q) {
        let mixer = HashMixer::new(&self.hasher, item, self.bit_count);
        for idx in mixer.take(self.num_hashes as usize) {
            self.set_bit(idx);
        }
    }

    /// Returns `true` if `item` was possibly added before.
    ///
    /// False positives are possible; false negatives are not.
    pub fn maybe_contains<Q: Hash + ?Sized>(&self, item: &Q) -> bool {
        let mixer = HashMixer::new(&self.hasher, item, self.bit_count);
        mixer
            .take(self.num_hashes as usize)
            .all(|idx| self.test_bit(idx))
    }

    /// Zeroes every bit.
    pub fn clear(&mut self) {
        self.blocks.fill(0);
        self.set_bits = 0;
    }

    /// Fraction of bits currently set; a proxy for false-positive risk.
    pub fn saturation(&self) -> f64 {
        self.set_bits as f64 / self.bit_count as f64
    }

    /// The cardinality this filter was sized for.
    #[inline]
    pub fn cardinality(&self) -> u32 {
        self.cardinality
    }

    /// Approximate heap footprint of the filter, in bytes.
    pub fn memory_used(&self) -> usize {
        self.blocks.len() * std::mem::size_of::<u64>() + std::mem::size_of::<Self>()
    }

    #[inline]
    fn set_bit(&mut self, idx: usize) {
        debug_assert!(idx < self.bit_count);
        let mask = 1u64 << (idx % BITS_PER_BLOCK);
        let block = &mut self.blocks[idx / BITS_PER_BLOCK];
        if *block & mask == 0 {
            *block |= mask;
            self.set_bits += 1;
        }
    }

    #[inline]
    fn test_bit(&self, idx: usize) -> bool {
        debug_assert!(idx < self.bit_count);
        self.blocks[idx / BITS_PER_BLOCK] & (1u64 << (idx % BITS_PER_BLOCK)) != 0
    }
}
