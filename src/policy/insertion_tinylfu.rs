//! TinyLFU admission policy.
//!
//! Filters out one-hit wonders before they cost a cache slot. Two
//! probabilistic structures cooperate:
//!
//! ```text
//!   touch(key)                       should_add(key)
//!   ──────────                       ───────────────
//!   gatekeeper has key?              gatekeeper.maybe_contains(key)
//!     │                                (true only for keys seen ≥ 2×)
//!     ├─ no ──► gatekeeper.add(key)
//!     │         (first sighting:     should_replace(victim, candidate)
//!     │          sketch untouched)   ───────────────────────────────
//!     └─ yes ─► sketch.add(key)      estimate(candidate) > estimate(victim)
//!               estimate > n?        where estimate = sketch count
//!                 └─ yes ─► reset:         + 1 if gatekeeper has the key
//!                    clear gatekeeper
//!                    halve sketch
//! ```
//!
//! The **gatekeeper** is a plain bloom filter recording "seen at least
//! once"; the **sketch** is a counting bloom filter recording "how often
//! beyond that". When any estimate climbs past the configured cardinality
//! the policy resets — the gatekeeper is cleared and the sketch decays —
//! so stale popularity fades instead of pinning the cache forever.
//!
//! Keys are touched on both cache hits and cache misses; admission asks
//! only whether the key has been seen before, so a key's *second* appearance
//! is its first chance to enter the cache.
//!
//! ## References
//!
//! - Einziger et al., "TinyLFU: A Highly Efficient Cache Admission Policy",
//!   2017 (doorkeeper + aging variant)

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

use crate::ds::{BloomFilter, CountingBloomFilter};
use crate::item::Item;
use crate::traits::InsertionPolicy;

/// Doorkeeper-plus-decaying-sketch admission policy.
///
/// ```
/// use cachecraft::policy::TinyLfuInsertion;
/// use cachecraft::traits::InsertionPolicy;
///
/// let mut policy = TinyLfuInsertion::new(100);
///
/// // Never-seen keys are refused...
/// assert!(!InsertionPolicy::<u64, ()>::should_add(&mut policy, &42));
///
/// // ...a miss records the sighting...
/// InsertionPolicy::<u64, ()>::on_cache_miss(&mut policy, &42);
///
/// // ...and the second appearance is admissible.
/// assert!(InsertionPolicy::<u64, ()>::should_add(&mut policy, &42));
/// ```
#[derive(Debug, Clone)]
pub struct TinyLfuInsertion<S = FxBuildHasher> {
    gatekeeper: BloomFilter<S>,
    sketch: CountingBloomFilter<S>,
}

impl TinyLfuInsertion<FxBuildHasher> {
    /// Creates a policy with both filters sized for `cardinality` distinct
    /// keys.
    pub fn new(cardinality: u32) -> Self {
        Self {
            gatekeeper: BloomFilter::new(cardinality),
            sketch: CountingBloomFilter::new(cardinality),
        }
    }
}

impl<S: BuildHasher + Clone> TinyLfuInsertion<S> {
    /// As [`new`](TinyLfuInsertion::new), probing both filters with the
    /// supplied hasher.
    pub fn with_hasher(cardinality: u32, hasher: S) -> Self {
        Self {
            gatekeeper: BloomFilter::with_hasher(cardinality, hasher.clone()),
            sketch: CountingBloomFilter::with_hasher(cardinality, hasher),
        }
    }
}

impl<S: BuildHasher> TinyLfuInsertion<S> {
    /// Frequency estimate for `key`: the sketch count plus one if the
    /// gatekeeper has seen the key.
    pub fn frequency_estimate<Q: Hash + ?Sized>(&self, key: &Q) -> u32 {
        let mut estimate = self.sketch.estimate(key);
        if self.gatekeeper.maybe_contains(key) {
            estimate += 1;
        }
        estimate
    }

    /// The cardinality both filters were sized for.
    pub fn cardinality(&self) -> u32 {
        self.sketch.cardinality()
    }

    /// Records one sighting of `key`, resetting the structures if the
    /// sketch has saturated past the configured cardinality.
    fn touch<Q: Hash + ?Sized>(&mut self, key: &Q) {
        if self.gatekeeper.maybe_contains(key) {
            self.sketch.add(key);
            if self.sketch.estimate(key) > self.sketch.cardinality() {
                self.reset();
            }
        } else {
            self.gatekeeper.add(key);
        }
    }

    /// Ages the policy: the gatekeeper forgets everything, the sketch keeps
    /// half of each count.
    fn reset(&mut self) {
        self.gatekeeper.clear();
        self.sketch.decay();
    }
}

impl<K, V, S> InsertionPolicy<K, V> for TinyLfuInsertion<S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn should_add(&mut self, key: &K) -> bool {
        self.gatekeeper.maybe_contains(key)
    }

    fn should_replace(&mut self, victim: &K, candidate: &K) -> bool {
        self.frequency_estimate(candidate) > self.frequency_estimate(victim)
    }

    fn on_cache_hit(&mut self, key: &K, _item: &Item<V>) {
        self.touch(key);
    }

    fn on_cache_miss<Q>(&mut self, key: &Q)
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.touch(key);
    }

    fn clear(&mut self) {
        self.gatekeeper.clear();
        self.sketch.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Policy = TinyLfuInsertion<FxBuildHasher>;

    fn touch(policy: &mut Policy, key: u64) {
        InsertionPolicy::<u64, ()>::on_cache_miss(policy, &key);
    }

    fn should_add(policy: &mut Policy, key: u64) -> bool {
        InsertionPolicy::<u64, ()>::should_add(policy, &key)
    }

    fn should_replace(policy: &mut Policy, victim: u64, candidate: u64) -> bool {
        InsertionPolicy::<u64, ()>::should_replace(policy, &victim, &candidate)
    }

    #[test]
    fn first_sighting_is_refused_second_admitted() {
        let mut policy = Policy::new(100);
        assert!(!should_add(&mut policy, 7));

        touch(&mut policy, 7);
        assert!(should_add(&mut policy, 7));
    }

    #[test]
    fn hits_count_as_sightings() {
        let mut policy = Policy::new(100);
        let item = Item::new((), 4, 4);
        InsertionPolicy::<u64, ()>::on_cache_hit(&mut policy, &9, &item);
        assert!(should_add(&mut policy, 9));
    }

    #[test]
    fn more_frequent_candidate_wins_replacement() {
        let mut policy = Policy::new(100);
        for _ in 0..5 {
            touch(&mut policy, 1);
        }
        touch(&mut policy, 2);

        assert!(should_replace(&mut policy, 2, 1));
        assert!(!should_replace(&mut policy, 1, 2));
        // Equal estimates never justify an eviction.
        assert!(!should_replace(&mut policy, 1, 1));
    }

    #[test]
    fn estimate_counts_gatekeeper_and_sketch() {
        let mut policy = Policy::new(100);
        touch(&mut policy, 3); // gatekeeper only
        assert_eq!(policy.frequency_estimate(&3u64), 1);

        touch(&mut policy, 3); // sketch = 1
        assert_eq!(policy.frequency_estimate(&3u64), 2);
    }

    #[test]
    fn saturating_a_key_triggers_reset() {
        // Cardinality 5: the seventh touch pushes the sketch estimate to 6,
        // which exceeds 5 and fires the reset.
        let mut policy = Policy::new(5);
        for _ in 0..6 {
            touch(&mut policy, 42);
        }
        assert!(should_add(&mut policy, 42));

        touch(&mut policy, 42);

        // The gatekeeper was cleared: key 42 is a stranger again.
        assert!(!should_add(&mut policy, 42));
        // The sketch kept half of the old count (6 / 2 = 3).
        assert_eq!(policy.frequency_estimate(&42u64), 3);
    }

    #[test]
    fn reset_ages_but_does_not_erase_popularity() {
        let mut policy = Policy::new(5);
        for _ in 0..7 {
            touch(&mut policy, 42);
        }
        // Post-reset the aged key still outranks a stranger, and a stranger
        // still cannot displace it.
        assert!(should_replace(&mut policy, 3, 42));
        assert!(!should_replace(&mut policy, 42, 3));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut policy = Policy::new(100);
        for _ in 0..4 {
            touch(&mut policy, 11);
        }
        InsertionPolicy::<u64, ()>::clear(&mut policy);
        assert!(!should_add(&mut policy, 11));
        assert_eq!(policy.frequency_estimate(&11u64), 0);
    }

    #[test]
    fn borrowed_views_touch_the_same_state() {
        let mut policy: TinyLfuInsertion = TinyLfuInsertion::new(100);
        // Miss recorded through a &str view...
        InsertionPolicy::<String, ()>::on_cache_miss(&mut policy, "route");
        // ...is visible when asking about the owned key.
        let owned = String::from("route");
        assert!(InsertionPolicy::<String, ()>::should_add(&mut policy, &owned));
    }
}
