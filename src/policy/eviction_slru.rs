//! Segmented LRU (SLRU) eviction policy.
//!
//! Two recency lists instead of one, giving scan resistance: a one-time
//! access parks a key in *probation*, and only a second access earns it a
//! seat in *protected*. Sequential scans therefore churn probation without
//! displacing the working set.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, (Segment, slot)>
//!
//!   PROBATION (LRU)                        PROTECTED (LRU, capped)
//!   ┌──────────────────────────┐           ┌──────────────────────────┐
//!   │ front            back    │  hit on   │ front            back    │
//!   │  ▼                 ▼     │ probation │  ▼                 ▼     │
//!   │ [new] ◄──► … ◄──► [cold] │ ────────► │ [hot] ◄──► … ◄──► [cool] │
//!   │  insert            │     │  promote  │                    │     │
//!   └────────────────────┼─────┘           └────────────────────┼─────┘
//!                        │      ◄──────────────────────────────demote
//!                        │        when |protected| > capacity
//!        victim_iter ────┴── probation back→front, then protected back→front
//! ```
//!
//! ## Events
//!
//! | Event          | Effect                                               |
//! |----------------|------------------------------------------------------|
//! | `on_insert`    | push to probation front                              |
//! | `on_cache_hit` | protected: splice to front; probation: promote, then |
//! |                | demote protected back to probation front while over  |
//! |                | capacity                                             |
//! | `on_evict`     | remove from whichever segment holds the key          |
//!
//! ## References
//!
//! - Karedla et al., "Caching Strategies to Improve Disk System
//!   Performance", 1994

use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::iter::Chain;

use crate::ds::key_list::{KeyList, KeysRev};
use crate::item::Item;
use crate::traits::EvictionPolicy;

/// Which segment a tracked key resides in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Probation,
    Protected,
}

/// Scan-resistant two-segment LRU.
///
/// `protected_capacity` bounds only the protected segment; the overall
/// cache population is the constraint policy's business.
#[derive(Debug)]
pub struct SlruEviction<K> {
    index: FxHashMap<K, (Segment, u32)>,
    probation: KeyList<K>,
    protected: KeyList<K>,
    protected_capacity: usize,
}

impl<K: Eq + Hash + Clone> SlruEviction<K> {
    /// Creates a policy whose protected segment holds at most
    /// `protected_capacity` keys.
    pub fn new(protected_capacity: usize) -> Self {
        Self {
            index: FxHashMap::default(),
            probation: KeyList::new(),
            protected: KeyList::new(),
            protected_capacity,
        }
    }

    /// Maximum number of keys the protected segment may hold.
    #[inline]
    pub fn protected_capacity(&self) -> usize {
        self.protected_capacity
    }

    /// Current protected-segment population.
    #[inline]
    pub fn protected_len(&self) -> usize {
        self.protected.len()
    }

    /// Current probation-segment population.
    #[inline]
    pub fn probation_len(&self) -> usize {
        self.probation.len()
    }

    /// Moves a probation resident to the protected front.
    fn promote(&mut self, key: &K, slot: u32) {
        let owned = self.probation.remove(slot);
        let new_slot = self.protected.push_front(owned);
        self.index.insert(key.clone(), (Segment::Protected, new_slot));
    }

    /// Moves the protected back to the probation front.
    fn demote_coldest_protected(&mut self) {
        let demoted = self
            .protected
            .pop_back()
            .expect("demotion requested on an empty protected segment");
        let slot = self.probation.push_front(demoted.clone());
        self.index.insert(demoted, (Segment::Probation, slot));
    }
}

impl<K: Eq + Hash + Clone, V> EvictionPolicy<K, V> for SlruEviction<K> {
    type VictimIter<'a>
        = Chain<KeysRev<'a, K>, KeysRev<'a, K>>
    where
        Self: 'a,
        K: 'a;

    fn victim_iter(&self) -> Self::VictimIter<'_> {
        // Probation drains completely before protected is touched.
        self.probation.iter_rev().chain(self.protected.iter_rev())
    }

    fn on_insert(&mut self, key: &K, _item: &Item<V>) {
        debug_assert!(
            !self.index.contains_key(key),
            "insert event for a key the policy already tracks"
        );
        let slot = self.probation.push_front(key.clone());
        self.index.insert(key.clone(), (Segment::Probation, slot));
    }

    fn on_cache_hit(&mut self, key: &K, _item: &Item<V>) {
        match self.index.get(key) {
            Some(&(Segment::Protected, slot)) => self.protected.move_to_front(slot),
            Some(&(Segment::Probation, slot)) => {
                self.promote(key, slot);
                while self.protected.len() > self.protected_capacity {
                    self.demote_coldest_protected();
                }
            }
            None => debug_assert!(false, "hit event for a key the policy does not track"),
        }
        debug_assert!(self.protected.len() <= self.protected_capacity);
    }

    fn on_update(&mut self, key: &K, _old: &Item<V>, new: &Item<V>) {
        EvictionPolicy::<K, V>::on_cache_hit(self, key, new);
    }

    fn on_evict(&mut self, key: &K, _item: &Item<V>) {
        match self.index.remove(key) {
            Some((Segment::Probation, slot)) => {
                self.probation.remove(slot);
            }
            Some((Segment::Protected, slot)) => {
                self.protected.remove(slot);
            }
            None => debug_assert!(false, "evict event for a key the policy does not track"),
        }
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn clear(&mut self) {
        self.index.clear();
        self.probation.clear();
        self.protected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item<()> {
        Item::new((), 4, 4)
    }

    fn victims(policy: &SlruEviction<i32>) -> Vec<i32> {
        EvictionPolicy::<i32, ()>::victim_iter(policy).copied().collect()
    }

    #[test]
    fn fresh_inserts_park_in_probation() {
        let mut policy = SlruEviction::new(4);
        for k in 0..5 {
            policy.on_insert(&k, &item());
        }
        assert_eq!(policy.probation_len(), 5);
        assert_eq!(policy.protected_len(), 0);
        // Coldest probation key is the first victim.
        assert_eq!(victims(&policy), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn promotion_then_full_rotation() {
        // Mirrors the insert-five / touch-all dance: protected capacity 4,
        // keys 0..5 inserted, 0 touched first, then 4, 3, 2, 1.
        let mut policy = SlruEviction::new(4);
        for k in 0..5 {
            policy.on_insert(&k, &item());
        }

        policy.on_cache_hit(&0, &item());
        // 0 now sits in protected; 1 is the coldest probation resident.
        assert_eq!(victims(&policy)[0], 1);

        for k in [4, 3, 2, 1] {
            policy.on_cache_hit(&k, &item());
        }

        // Five promotions through a four-seat protected segment demoted 0
        // back to probation; protected keeps {4, 3, 2, 1}.
        assert_eq!(policy.protected_len(), 4);
        assert_eq!(policy.probation_len(), 1);
        let order = victims(&policy);
        assert_eq!(order[0], 0);
        // Protected victims follow, least recently promoted first.
        assert_eq!(order[1], 4);
        assert_eq!(order, vec![0, 4, 3, 2, 1]);
    }

    #[test]
    fn protected_hits_just_reorder() {
        let mut policy = SlruEviction::new(4);
        for k in 0..3 {
            policy.on_insert(&k, &item());
            policy.on_cache_hit(&k, &item()); // promote all three
        }
        assert_eq!(policy.protected_len(), 3);

        policy.on_cache_hit(&0, &item());
        // 0 refreshed; 1 is now the coldest protected key.
        assert_eq!(victims(&policy), vec![1, 2, 0]);
        assert_eq!(policy.protected_len(), 3);
    }

    #[test]
    fn eviction_reaches_both_segments() {
        let mut policy = SlruEviction::new(4);
        for k in 0..4 {
            policy.on_insert(&k, &item());
        }
        policy.on_cache_hit(&2, &item()); // 2 → protected

        policy.on_evict(&2, &item()); // from protected
        policy.on_evict(&0, &item()); // from probation
        assert!(!EvictionPolicy::<i32, ()>::contains(&policy, &2));
        assert!(!EvictionPolicy::<i32, ()>::contains(&policy, &0));
        assert_eq!(victims(&policy), vec![1, 3]);
    }

    #[test]
    fn segments_stay_disjoint_and_complete() {
        let mut policy = SlruEviction::new(2);
        for k in 0..6 {
            policy.on_insert(&k, &item());
        }
        for k in [5, 1, 3] {
            policy.on_cache_hit(&k, &item());
        }

        assert_eq!(
            policy.probation_len() + policy.protected_len(),
            EvictionPolicy::<i32, ()>::len(&policy)
        );
        assert!(policy.protected_len() <= 2);
        // Every tracked key appears exactly once in the victim sequence.
        let mut order = victims(&policy);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn update_event_promotes_like_a_hit() {
        let mut policy = SlruEviction::new(4);
        policy.on_insert(&1, &item());
        EvictionPolicy::<i32, ()>::on_update(&mut policy, &1, &item(), &item());
        assert_eq!(policy.protected_len(), 1);
        assert_eq!(policy.probation_len(), 0);
    }

    #[test]
    fn clear_resets_both_segments() {
        let mut policy = SlruEviction::new(4);
        for k in 0..3 {
            policy.on_insert(&k, &item());
        }
        policy.on_cache_hit(&1, &item());
        EvictionPolicy::<i32, ()>::clear(&mut policy);

        assert_eq!(EvictionPolicy::<i32, ()>::len(&policy), 0);
        assert!(victims(&policy).is_empty());
    }
}
