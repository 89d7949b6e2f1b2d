//! Greedy-Dual-Size-Frequency (GDSF) eviction policy.
//!
//! Ranks every resident key by a priority coefficient and evicts the lowest
//! first:
//!
//! ```text
//!   h(key, item) = clock + frequency(key) · cost(key, item) / item.total_size
//! ```
//!
//! - `frequency` comes from an internal counting-bloom sketch, bumped on
//!   every insert, hit, and update;
//! - `cost` is a caller-supplied functor estimating what a reload of the
//!   item would cost (I/O, CPU, dollars — any consistent unit);
//! - dividing by `total_size` biases toward keeping many cheap-to-hold,
//!   expensive-to-reload items over one large one;
//! - `clock` rises to each evicted coefficient (`max`, so it never moves
//!   backwards), which ages long-resident items: a newcomer enters above
//!   every key evicted so far and must out-score survivors on merit.
//!
//! The priority set is a `BTreeSet` ordered by `f64::total_cmp`, then by key
//! (hence `K: Ord`) so equal coefficients still order deterministically. A
//! side map `K → h` keeps set entries findable for O(log n) removal.
//!
//! ## References
//!
//! - Cherkasova, "Improving WWW Proxies Performance with Greedy-Dual-Size-
//!   Frequency Caching Policy", 1998

use rustc_hash::{FxBuildHasher, FxHashMap};
use std::collections::btree_set::{self, BTreeSet};
use std::hash::{BuildHasher, Hash};

use crate::ds::CountingBloomFilter;
use crate::item::Item;
use crate::traits::EvictionPolicy;

/// One resident key and its priority coefficient.
#[derive(Debug, Clone)]
struct PriorityEntry<K> {
    coefficient: f64,
    key: K,
}

impl<K: Ord> PartialEq for PriorityEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl<K: Ord> Eq for PriorityEntry<K> {}

impl<K: Ord> PartialOrd for PriorityEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for PriorityEntry<K> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.coefficient
            .total_cmp(&other.coefficient)
            .then_with(|| self.key.cmp(&other.key))
    }
}

/// Cost-aware eviction policy with frequency aging.
///
/// `F` is the cost functor, `Fn(&K, &Item<V>) -> f64`, supplied at
/// construction and assumed pure.
#[derive(Debug)]
pub struct GdsfEviction<K, F, S = FxBuildHasher> {
    priorities: BTreeSet<PriorityEntry<K>>,
    coefficients: FxHashMap<K, f64>,
    sketch: CountingBloomFilter<S>,
    clock: f64,
    cost: F,
}

impl<K, F> GdsfEviction<K, F, FxBuildHasher> {
    /// Creates a policy whose frequency sketch is sized for `cardinality`
    /// distinct keys, ranking items with `cost`.
    pub fn new(cardinality: u32, cost: F) -> Self {
        Self::with_hasher(cardinality, cost, FxBuildHasher)
    }
}

impl<K, F, S: BuildHasher> GdsfEviction<K, F, S> {
    /// As [`new`](GdsfEviction::new), probing the sketch with the supplied
    /// hasher.
    pub fn with_hasher(cardinality: u32, cost: F, hasher: S) -> Self {
        Self {
            priorities: BTreeSet::new(),
            coefficients: FxHashMap::default(),
            sketch: CountingBloomFilter::with_hasher(cardinality, hasher),
            clock: 0.0,
            cost,
        }
    }

    /// Current aging clock: the highest coefficient evicted so far.
    #[inline]
    pub fn clock(&self) -> f64 {
        self.clock
    }
}

impl<K, F, S> GdsfEviction<K, F, S>
where
    K: Eq + Hash + Ord + Clone,
    S: BuildHasher,
{
    fn coefficient<V>(&self, key: &K, item: &Item<V>) -> f64
    where
        F: Fn(&K, &Item<V>) -> f64,
    {
        self.clock
            + f64::from(self.sketch.estimate(key)) * ((self.cost)(key, item) / item.total_size() as f64)
    }

    fn insert_entry<V>(&mut self, key: &K, item: &Item<V>)
    where
        F: Fn(&K, &Item<V>) -> f64,
    {
        self.sketch.add(key);
        let coefficient = self.coefficient(key, item);
        self.priorities.insert(PriorityEntry {
            coefficient,
            key: key.clone(),
        });
        self.coefficients.insert(key.clone(), coefficient);
    }

    fn remove_entry(&mut self, key: &K) -> Option<f64> {
        let coefficient = self.coefficients.remove(key)?;
        let removed = self.priorities.remove(&PriorityEntry {
            coefficient,
            key: key.clone(),
        });
        debug_assert!(removed, "priority set out of step with the coefficient map");
        Some(coefficient)
    }
}

impl<K, V, F, S> EvictionPolicy<K, V> for GdsfEviction<K, F, S>
where
    K: Eq + Hash + Ord + Clone,
    F: Fn(&K, &Item<V>) -> f64,
    S: BuildHasher,
{
    type VictimIter<'a>
        = GdsfVictims<'a, K>
    where
        Self: 'a,
        K: 'a;

    fn victim_iter(&self) -> GdsfVictims<'_, K> {
        GdsfVictims {
            entries: self.priorities.iter(),
        }
    }

    fn on_insert(&mut self, key: &K, item: &Item<V>) {
        debug_assert!(
            !self.coefficients.contains_key(key),
            "insert event for a key the policy already tracks"
        );
        self.insert_entry(key, item);
    }

    fn on_cache_hit(&mut self, key: &K, item: &Item<V>) {
        // Re-rank: the sketch estimate rises, so the fresh coefficient does
        // too.
        if self.remove_entry(key).is_none() {
            debug_assert!(false, "hit event for a key the policy does not track");
        }
        self.insert_entry(key, item);
    }

    fn on_update(&mut self, key: &K, _old: &Item<V>, new: &Item<V>) {
        EvictionPolicy::<K, V>::on_cache_hit(self, key, new);
    }

    fn on_evict(&mut self, key: &K, _item: &Item<V>) {
        match self.remove_entry(key) {
            Some(coefficient) => {
                // max keeps the clock monotone under arbitrary eviction
                // orders (remove/retain may take a high-priority key).
                self.clock = self.clock.max(coefficient);
            }
            None => debug_assert!(false, "evict event for a key the policy does not track"),
        }
    }

    fn contains(&self, key: &K) -> bool {
        self.coefficients.contains_key(key)
    }

    fn len(&self) -> usize {
        self.coefficients.len()
    }

    fn clear(&mut self) {
        // The clock survives a clear: aging never rewinds.
        self.priorities.clear();
        self.coefficients.clear();
        self.sketch.clear();
    }
}

/// Victim iterator: ascending coefficient order.
#[derive(Debug)]
pub struct GdsfVictims<'a, K> {
    entries: btree_set::Iter<'a, PriorityEntry<K>>,
}

impl<'a, K> Iterator for GdsfVictims<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.entries.next().map(|entry| &entry.key)
    }
}
