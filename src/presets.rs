//! Frequently-used policy combinations.
//!
//! Each preset is a type alias plus a constructor wiring a sensible policy
//! triple. They are sugar only — every combination remains reachable
//! through [`Cache::new`](crate::cache::Cache::new) and the
//! [`CacheBuilder`](crate::builder::CacheBuilder).

use std::hash::Hash;

use crate::cache::Cache;
use crate::item::Item;
use crate::measure::SizeOf;
use crate::policy::{
    AlwaysInsertion, CountConstraint, GdsfEviction, LruEviction, MemoryConstraint, SlruEviction,
    TinyLfuInsertion,
};

/// Least-recently-used cache under a byte budget.
pub type LruCache<K, V, MK = SizeOf, MV = SizeOf> =
    Cache<K, V, AlwaysInsertion, LruEviction<K>, MemoryConstraint, MK, MV>;

/// Least-recently-used cache under an item-count budget.
pub type CountLruCache<K, V, MK = SizeOf, MV = SizeOf> =
    Cache<K, V, AlwaysInsertion, LruEviction<K>, CountConstraint, MK, MV>;

/// TinyLFU admission over segmented LRU, under a byte budget.
pub type TinyLfuCache<K, V, MK = SizeOf, MV = SizeOf> =
    Cache<K, V, TinyLfuInsertion, SlruEviction<K>, MemoryConstraint, MK, MV>;

/// GDSF eviction with a caller-supplied cost functor, under a byte budget.
pub type CustomCostCache<K, V, F, MK = SizeOf, MV = SizeOf> =
    Cache<K, V, AlwaysInsertion, GdsfEviction<K, F>, MemoryConstraint, MK, MV>;

/// An LRU cache holding at most `max_bytes` of measured data.
///
/// ```
/// use cachecraft::presets::lru_cache;
///
/// let cache = lru_cache::<u64, u64>(64); // four 16-byte entries
/// for k in 0..5 {
///     cache.insert(k, k);
/// }
/// assert_eq!(cache.number_of_items(), 4);
/// assert!(!cache.contains(&0)); // the coldest entry gave way
/// ```
pub fn lru_cache<K, V>(max_bytes: u64) -> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    Cache::new(
        AlwaysInsertion,
        LruEviction::new(),
        MemoryConstraint::new(max_bytes),
    )
}

/// An LRU cache holding at most `max_items` entries.
pub fn count_lru_cache<K, V>(max_items: u64) -> CountLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    Cache::new(
        AlwaysInsertion,
        LruEviction::new(),
        CountConstraint::new(max_items),
    )
}

/// A TinyLFU + segmented-LRU cache under `max_bytes`.
///
/// `cardinality` sizes the admission filters (roughly the expected number
/// of distinct keys); `protected_capacity` caps the SLRU protected segment.
pub fn tiny_lfu_cache<K, V>(
    max_bytes: u64,
    cardinality: u32,
    protected_capacity: usize,
) -> TinyLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    Cache::new(
        TinyLfuInsertion::new(cardinality),
        SlruEviction::new(protected_capacity),
        MemoryConstraint::new(max_bytes),
    )
}

/// A GDSF cache under `max_bytes`, ranking items by `cost`.
///
/// Favored when a cache miss costs wildly different amounts from one item
/// to the next — the cost functor tells the policy what a reload is worth.
pub fn custom_cost_cache<K, V, F>(
    max_bytes: u64,
    cardinality: u32,
    cost: F,
) -> CustomCostCache<K, V, F>
where
    K: Eq + Hash + Ord + Clone,
    F: Fn(&K, &Item<V>) -> f64,
{
    Cache::new(
        AlwaysInsertion,
        GdsfEviction::new(cardinality, cost),
        MemoryConstraint::new(max_bytes),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lru_preset_round_trips() {
        let cache = lru_cache::<u64, u64>(160);
        assert!(cache.insert(1, 10));
        assert_eq!(cache.find(&1), Some(10));
    }

    #[test]
    fn count_lru_preset_caps_population() {
        let cache = count_lru_cache::<u64, u64>(2);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(3, 3);
        assert_eq!(cache.number_of_items(), 2);
    }

    #[test]
    fn tiny_lfu_preset_requires_a_second_sighting() {
        let cache = tiny_lfu_cache::<u64, u64>(1024, 100, 8);
        assert!(!cache.insert(1, 1), "first sighting should be refused");
        assert_eq!(cache.find(&1), None); // records the sighting
        assert!(cache.insert(1, 1), "second sighting should land");
    }

    #[test]
    fn custom_cost_preset_accepts_a_closure() {
        let cache = custom_cost_cache::<u64, u64, _>(160, 100, |_key, _item| 1.0);
        assert!(cache.insert(1, 10));
        assert_eq!(cache.find(&1), Some(10));
    }
}
