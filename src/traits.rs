//! # Policy Trait Hierarchy
//!
//! The cache coordinator is generic over three cooperating policies. Each
//! policy owns one decision and the bookkeeping behind it; the coordinator
//! owns the data map and sequences everything.
//!
//! ```text
//!                       ┌───────────────────────────────────┐
//!                       │           Cache<K, V, …>          │
//!                       │                                   │
//!                       │   data map: K → Item<V>           │
//!                       │   routes events, runs evictions   │
//!                       └───────┬─────────┬─────────┬───────┘
//!                               │         │         │
//!                  ┌────────────┘         │         └────────────┐
//!                  ▼                      ▼                      ▼
//!     ┌──────────────────────┐ ┌──────────────────────┐ ┌──────────────────────┐
//!     │ InsertionPolicy<K,V> │ │ EvictionPolicy<K,V>  │ │ ConstraintPolicy<K,V>│
//!     │                      │ │                      │ │                      │
//!     │ should_add           │ │ victim_iter          │ │ can_add              │
//!     │ should_replace       │ │   (coldest first)    │ │ can_replace          │
//!     │                      │ │ contains / len       │ │ is_satisfied         │
//!     │ "is this key worth   │ │                      │ │ update               │
//!     │  caching?"           │ │ "who goes first?"    │ │ "does it fit?"       │
//!     └──────────────────────┘ └──────────────────────┘ └──────────────────────┘
//! ```
//!
//! ## Event surface
//!
//! Every policy receives the same lifecycle events, fired under the cache
//! lock in a fixed order (insertion → eviction → constraint):
//!
//! | Event           | Fired on                                       |
//! |-----------------|------------------------------------------------|
//! | `on_cache_hit`  | `find` that located the key                    |
//! | `on_cache_miss` | `find` that did not                            |
//! | `on_insert`     | admitted fresh insertion                       |
//! | `on_update`     | admitted value replacement for a resident key  |
//! | `on_evict`      | any entry leaving the map (eviction, `remove`, |
//! |                 | `retain`) — fired *before* the entry is erased |
//!
//! Handlers default to no-ops, so a policy implements only the events it
//! cares about; monomorphization erases the rest. Handlers must not call
//! back into the cache.
//!
//! ## Constraint cloning
//!
//! [`ConstraintPolicy`] requires `Clone` because the coordinator runs its
//! eviction planning against a throwaway replica: victims are applied to the
//! clone until the candidate fits, and nothing real mutates unless the whole
//! plan succeeds. Constraint state must therefore stay O(1)-cheap to copy.

use std::borrow::Borrow;
use std::hash::Hash;

use crate::item::Item;

/// Admission control: decides whether a key deserves a cache slot.
pub trait InsertionPolicy<K, V> {
    /// Whether `key` should be admitted when the constraint has room.
    fn should_add(&mut self, key: &K) -> bool;

    /// Whether evicting `victim` to make room for `candidate` is a good
    /// trade.
    fn should_replace(&mut self, victim: &K, candidate: &K) -> bool;

    /// A lookup located `key`.
    fn on_cache_hit(&mut self, _key: &K, _item: &Item<V>) {}

    /// A lookup failed to locate `key`. Generic so that borrowed key views
    /// observe the same policy state as owned keys.
    fn on_cache_miss<Q>(&mut self, _key: &Q)
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
    }

    /// `key` was admitted as a fresh entry.
    fn on_insert(&mut self, _key: &K, _item: &Item<V>) {}

    /// `key`'s value was replaced.
    fn on_update(&mut self, _key: &K, _old: &Item<V>, _new: &Item<V>) {}

    /// `key` is leaving the cache. Fired before the entry is erased.
    fn on_evict(&mut self, _key: &K, _item: &Item<V>) {}

    /// Drops all policy state.
    fn clear(&mut self);
}

/// Victim selection: maintains an ordering and nominates eviction victims.
pub trait EvictionPolicy<K, V> {
    /// Iterator over victim keys, coldest first.
    type VictimIter<'a>: Iterator<Item = &'a K>
    where
        Self: 'a,
        K: 'a;

    /// Yields victim candidates, coldest first. Iteration is read-only:
    /// policy state changes only through `on_evict`.
    fn victim_iter(&self) -> Self::VictimIter<'_>;

    /// A lookup located `key`.
    fn on_cache_hit(&mut self, _key: &K, _item: &Item<V>) {}

    /// A lookup failed to locate `key`.
    fn on_cache_miss<Q>(&mut self, _key: &Q)
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
    }

    /// `key` was admitted as a fresh entry.
    fn on_insert(&mut self, _key: &K, _item: &Item<V>) {}

    /// `key`'s value was replaced.
    fn on_update(&mut self, _key: &K, _old: &Item<V>, _new: &Item<V>) {}

    /// `key` is leaving the cache. The key may sit anywhere in the ordering,
    /// not just at the coldest end — `remove` and `retain` evict arbitrary
    /// keys.
    fn on_evict(&mut self, _key: &K, _item: &Item<V>) {}

    /// Whether the policy currently tracks `key`. Tracked keys must mirror
    /// the data map exactly.
    fn contains(&self, key: &K) -> bool;

    /// Number of keys tracked.
    fn len(&self) -> usize;

    /// Whether no keys are tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all policy state.
    fn clear(&mut self);
}

/// Resource budget: tracks usage and rules on whether candidates fit.
///
/// `Clone` powers the coordinator's speculative eviction planning, so state
/// must stay cheap to copy.
pub trait ConstraintPolicy<K, V>: Clone {
    /// Argument type accepted by [`update`](Self::update)
    /// (e.g. a new byte budget).
    type Params;

    /// Whether a fresh `item` fits within the budget.
    fn can_add(&mut self, key: &K, item: &Item<V>) -> bool;

    /// Whether replacing `old` with `new` for a resident key fits.
    fn can_replace(&mut self, key: &K, old: &Item<V>, new: &Item<V>) -> bool;

    /// Whether current usage respects the budget.
    fn is_satisfied(&self) -> bool;

    /// Reconfigures the budget. The coordinator evicts afterwards until
    /// [`is_satisfied`](Self::is_satisfied) holds again.
    fn update(&mut self, params: Self::Params);

    /// `key` was admitted as a fresh entry. Must add its usage.
    fn on_insert(&mut self, key: &K, item: &Item<V>);

    /// `key`'s value was replaced. Must adjust usage by the size delta.
    fn on_update(&mut self, key: &K, old: &Item<V>, new: &Item<V>);

    /// `key` is leaving the cache. Must subtract its usage.
    fn on_evict(&mut self, key: &K, item: &Item<V>);

    /// A lookup located `key`.
    fn on_cache_hit(&mut self, _key: &K, _item: &Item<V>) {}

    /// A lookup failed to locate `key`.
    fn on_cache_miss<Q>(&mut self, _key: &Q)
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
    }

    /// Zeroes tracked usage. The configured budget is kept.
    fn clear(&mut self);
}
