//! # Cache Coordinator
//!
//! The [`Cache`] owns the data map and sequences every interaction between
//! the three policies. Policies never talk to each other; all coordination
//! flows through here.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │                    Cache<K, V, I, E, C, MK, MV, M>                │
//!   │                                                                   │
//!   │   ┌───────────────────────────────────────────────────────────┐   │
//!   │   │              M::Cell<CacheCore>  (lock mode)              │   │
//!   │   │                                                           │   │
//!   │   │   data: FxHashMap<K, Item<V>>      owns keys and items    │   │
//!   │   │   insertion: I                     admission control      │   │
//!   │   │   eviction: E                      victim ordering        │   │
//!   │   │   constraint: C                    resource budget        │   │
//!   │   │   measure_key / measure_value      size functors          │   │
//!   │   │   stats: CacheStats                rolling + cumulative   │   │
//!   │   └───────────────────────────────────────────────────────────┘   │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Insert Flow
//!
//! ```text
//!   insert(key, value)
//!     │ measure sizes, build candidate Item
//!     ▼
//!   key resident? ── yes ──► constraint.can_replace? ── yes ──► commit update
//!     │                           │ no
//!     │ no                        ▼
//!     │                  speculative eviction loop (replace mode;
//!     │                  switches to add mode if the key itself
//!     │                  is chosen as a victim) ── ok ──► commit
//!     ▼
//!   constraint.can_add? ── yes ──► insertion.should_add?
//!     │ no                          ├─ yes ─► commit insert
//!     │                             └─ no ──► refuse (return false)
//!     ▼
//!   speculative eviction loop (add mode) ── ok ──► commit insert
//!                                        └─ refused ─► return false
//! ```
//!
//! ## Speculative Eviction Loop
//!
//! When the constraint refuses a candidate, the coordinator plans a viable
//! eviction set without touching any real state:
//!
//! ```text
//!   probe    ← constraint.clone()          O(1) state by contract
//!   victims  ← []
//!   iter     ← eviction.victim_iter()      read-only, coldest first
//!   while probe refuses the candidate:
//!       v ← iter.next()            or refuse (nothing left to evict)
//!       insertion.should_replace(v, candidate)?   or refuse
//!       probe.on_evict(v, data[v])           only the clone changes
//!       victims.push(v)
//!   commit: evict victims for real, then insert/update
//! ```
//!
//! A refusal anywhere leaves the cache byte-for-byte untouched; only a
//! complete plan mutates anything. Event broadcast on every mutation runs
//! insertion → eviction → constraint, and `on_evict` always fires before
//! the entry leaves the map.
//!
//! ## Concurrency
//!
//! Every public operation is one critical section under the
//! [`LockMode`](crate::sync::LockMode) cell — operations are linearizable
//! in [`ThreadSafe`](crate::sync::ThreadSafe) mode. Caller-supplied
//! functors (measures, cost, predicates, visitors) run under the lock and
//! must not call back into the cache. `swap` between two caches acquires
//! both locks in address order, so racing cross-swaps cannot deadlock.
//!
//! ## Example Usage
//!
//! ```
//! use cachecraft::presets::lru_cache;
//!
//! // 1 KiB budget, SizeOf measures: each (u64, u64) entry is 16 bytes.
//! let cache = lru_cache::<u64, u64>(1024);
//!
//! assert!(cache.insert(1, 100));
//! assert_eq!(cache.find(&1), Some(100));
//! assert_eq!(cache.find(&2), None);
//! assert_eq!(cache.number_of_items(), 1);
//! assert!((cache.hit_rate() - 0.5).abs() < 1e-9);
//! ```

use std::borrow::Borrow;
use std::hash::Hash;
use std::mem;

use rustc_hash::FxHashMap;

use crate::error::InvariantError;
use crate::item::Item;
use crate::measure::{Measure, SizeOf};
use crate::stats::{CacheStats, MetricsSnapshot};
use crate::sync::{LockMode, ThreadSafe};
use crate::traits::{ConstraintPolicy, EvictionPolicy, InsertionPolicy};

/// Default rolling-statistics window, in lookups.
pub const DEFAULT_STATS_WINDOW: usize = 1000;

/// Which admission check the speculative loop is driving toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdmitMode {
    Add,
    Replace,
}

/// Outcome of a successful speculative planning pass.
struct EvictionPlan<K> {
    victims: Vec<K>,
    /// In replace mode: the updated key itself was chosen as a victim, so
    /// the commit is an insert, not an update.
    evicts_candidate: bool,
}

// ---------------------------------------------------------------------------
// CacheCore — single-threaded coordinator state
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CacheCore<K, V, I, E, C, MK, MV> {
    data: FxHashMap<K, Item<V>>,
    insertion: I,
    eviction: E,
    constraint: C,
    measure_key: MK,
    measure_value: MV,
    stats: CacheStats,
}

impl<K, V, I, E, C, MK, MV> CacheCore<K, V, I, E, C, MK, MV>
where
    K: Eq + Hash + Clone,
    I: InsertionPolicy<K, V>,
    E: EvictionPolicy<K, V>,
    C: ConstraintPolicy<K, V>,
    MK: Measure<K>,
    MV: Measure<V>,
{
    fn find<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        match self.data.get_key_value(key) {
            Some((resident_key, item)) => {
                self.stats.record_hit(item.value_size());
                self.insertion.on_cache_hit(resident_key, item);
                self.eviction.on_cache_hit(resident_key, item);
                self.constraint.on_cache_hit(resident_key, item);
                Some(item.value().clone())
            }
            None => {
                self.stats.record_miss();
                self.insertion.on_cache_miss(key);
                self.eviction.on_cache_miss(key);
                self.constraint.on_cache_miss(key);
                None
            }
        }
    }

    fn insert(&mut self, key: K, value: V) -> bool {
        let key_size = self.measure_key.measure(&key);
        let value_size = self.measure_value.measure(&value);
        let new_item = Item::new(value, key_size, value_size);

        if self.data.contains_key(&key) {
            self.admit_update(key, new_item)
        } else {
            self.admit_insert(key, new_item)
        }
    }

    /// Fresh-insert admission: a constraint with room defers to the
    /// insertion policy; a constraint without room opens the speculative
    /// eviction loop.
    fn admit_insert(&mut self, key: K, new_item: Item<V>) -> bool {
        if self.constraint.can_add(&key, &new_item) {
            if self.insertion.should_add(&key) {
                self.commit_insert(key, new_item);
                true
            } else {
                false
            }
        } else {
            match self.plan_eviction(&key, &new_item, AdmitMode::Add) {
                Some(plan) => {
                    self.apply_evictions(&plan.victims);
                    self.commit_insert(key, new_item);
                    true
                }
                None => false,
            }
        }
    }

    /// Update admission: a fitting replacement is always taken; otherwise
    /// the speculative loop runs in replace mode.
    fn admit_update(&mut self, key: K, new_item: Item<V>) -> bool {
        let fits = {
            let old = self
                .data
                .get(&key)
                .expect("update admission for an absent key");
            self.constraint.can_replace(&key, old, &new_item)
        };
        if fits {
            self.commit_update(key, new_item);
            return true;
        }

        match self.plan_eviction(&key, &new_item, AdmitMode::Replace) {
            Some(plan) => {
                let evicts_candidate = plan.evicts_candidate;
                self.apply_evictions(&plan.victims);
                if evicts_candidate {
                    // The old entry is gone; the insertion policy sees the
                    // key leave and re-enter rather than mutate in place.
                    self.commit_insert(key, new_item);
                } else {
                    self.commit_update(key, new_item);
                }
                true
            }
            None => false,
        }
    }

    /// The speculative eviction loop. Applies victims to a clone of the
    /// constraint until the candidate fits; nothing observable changes. A
    /// `None` means the insert is refused and the cache is untouched.
    fn plan_eviction(
        &mut self,
        candidate: &K,
        new_item: &Item<V>,
        mode: AdmitMode,
    ) -> Option<EvictionPlan<K>> {
        let mut probe = self.constraint.clone();
        let mut mode = mode;
        let mut victims = Vec::new();
        let mut evicts_candidate = false;

        let data = &self.data;
        let insertion = &mut self.insertion;
        let mut iter = self.eviction.victim_iter();

        loop {
            let fits = match mode {
                AdmitMode::Add => probe.can_add(candidate, new_item),
                AdmitMode::Replace => {
                    let old = data
                        .get(candidate)
                        .expect("replace admission for an absent key");
                    probe.can_replace(candidate, old, new_item)
                }
            };
            if fits {
                break;
            }

            let victim = iter.next()?;
            if !insertion.should_replace(victim, candidate) {
                return None;
            }
            let victim_item = data
                .get(victim)
                .expect("eviction policy yielded a key absent from the data map");
            probe.on_evict(victim, victim_item);
            victims.push(victim.clone());

            if mode == AdmitMode::Replace && victim == candidate {
                // The updated key is itself on the chopping block; what
                // remains to justify is a fresh insert.
                evicts_candidate = true;
                mode = AdmitMode::Add;
            }
        }

        Some(EvictionPlan {
            victims,
            evicts_candidate,
        })
    }

    fn apply_evictions(&mut self, victims: &[K]) {
        for victim in victims {
            self.evict_entry(victim);
            self.stats.note_eviction();
        }
    }

    /// Broadcasts `on_evict` and erases the entry. Events fire while the
    /// item is still resident.
    fn evict_entry(&mut self, key: &K) {
        let (resident_key, item) = self
            .data
            .get_key_value(key)
            .expect("evicted key missing from the data map");
        self.insertion.on_evict(resident_key, item);
        self.eviction.on_evict(resident_key, item);
        self.constraint.on_evict(resident_key, item);
        self.data.remove(key);
    }

    fn commit_insert(&mut self, key: K, item: Item<V>) {
        debug_assert!(!self.data.contains_key(&key));
        self.insertion.on_insert(&key, &item);
        self.eviction.on_insert(&key, &item);
        self.constraint.on_insert(&key, &item);
        self.stats.note_insert();
        self.data.insert(key, item);
    }

    fn commit_update(&mut self, key: K, new_item: Item<V>) {
        let old_item = mem::replace(
            self.data
                .get_mut(&key)
                .expect("committing an update for an absent key"),
            new_item,
        );
        let (resident_key, new_ref) = self
            .data
            .get_key_value(&key)
            .expect("updated key vanished from the data map");
        self.insertion.on_update(resident_key, &old_item, new_ref);
        self.eviction.on_update(resident_key, &old_item, new_ref);
        self.constraint.on_update(resident_key, &old_item, new_ref);
        self.stats.note_update();
    }

    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.data.get_key_value(key) {
            Some((resident_key, item)) => {
                self.insertion.on_evict(resident_key, item);
                self.eviction.on_evict(resident_key, item);
                self.constraint.on_evict(resident_key, item);
                self.stats.note_removal();
                self.data.remove(key);
                true
            }
            None => false,
        }
    }

    fn retain(&mut self, mut predicate: impl FnMut(&K, &V) -> bool) {
        let doomed: Vec<K> = self
            .data
            .iter()
            .filter(|&(key, item)| !predicate(key, item.value()))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            self.evict_entry(key);
            self.stats.note_removal();
        }
    }

    fn clear(&mut self) {
        self.data.clear();
        self.insertion.clear();
        self.eviction.clear();
        self.constraint.clear();
        self.stats.reset();
    }

    fn update_constraint(&mut self, params: C::Params) {
        self.constraint.update(params);
        self.shrink_to_constraint();
    }

    /// Evicts coldest-first until the constraint is satisfied again.
    fn shrink_to_constraint(&mut self) {
        while !self.constraint.is_satisfied() {
            let victim = self
                .eviction
                .victim_iter()
                .next()
                .cloned()
                .expect("constraint unsatisfiable with an empty cache");
            self.evict_entry(&victim);
            self.stats.note_eviction();
        }
    }

    fn import_one(&mut self, key: K, value: V) -> bool {
        let key_size = self.measure_key.measure(&key);
        let value_size = self.measure_value.measure(&value);
        let item = Item::new(value, key_size, value_size);

        if self.data.contains_key(&key) {
            let fits = {
                let old = self.data.get(&key).expect("resident key vanished");
                self.constraint.can_replace(&key, old, &item)
            };
            if !fits {
                return false;
            }
            self.commit_update(key, item);
        } else {
            if !self.constraint.can_add(&key, &item) {
                return false;
            }
            self.commit_insert(key, item);
        }
        true
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.eviction.len() != self.data.len() {
            return Err(InvariantError::new(format!(
                "eviction policy tracks {} keys, data map holds {}",
                self.eviction.len(),
                self.data.len()
            )));
        }
        for key in self.data.keys() {
            if !self.eviction.contains(key) {
                return Err(InvariantError::new(
                    "data map key missing from the eviction policy",
                ));
            }
        }
        if !self.constraint.is_satisfied() {
            return Err(InvariantError::new(
                "constraint unsatisfied at an operation boundary",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cache — the locked public surface
// ---------------------------------------------------------------------------

/// Composable-policy cache.
///
/// Generic over the key/value pair, the three policies, the two size
/// measures, and the [`LockMode`]. Most callers reach for a preset in
/// [`presets`](crate::presets) or the [`CacheBuilder`](crate::builder::CacheBuilder)
/// instead of naming all parameters.
///
/// All methods take `&self`; interior mutability lives in the lock cell.
/// In [`ThreadSafe`] mode the cache is `Send + Sync` and every operation is
/// linearizable.
#[derive(Debug)]
pub struct Cache<K, V, I, E, C, MK = SizeOf, MV = SizeOf, M = ThreadSafe>
where
    M: LockMode,
{
    core: M::Cell<CacheCore<K, V, I, E, C, MK, MV>>,
}

impl<K, V, I, E, C, MK, MV, M> Cache<K, V, I, E, C, MK, MV, M>
where
    K: Eq + Hash + Clone,
    I: InsertionPolicy<K, V>,
    E: EvictionPolicy<K, V>,
    C: ConstraintPolicy<K, V>,
    MK: Measure<K>,
    MV: Measure<V>,
    M: LockMode,
{
    /// Creates a cache from the three policies, with default measures and
    /// the default statistics window.
    pub fn new(insertion: I, eviction: E, constraint: C) -> Self
    where
        MK: Default,
        MV: Default,
    {
        Self::with_config(
            insertion,
            eviction,
            constraint,
            MK::default(),
            MV::default(),
            DEFAULT_STATS_WINDOW,
        )
    }

    /// Creates a cache with explicit measures and statistics window.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero. Use
    /// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build)
    /// for fallible validation.
    pub fn with_config(
        insertion: I,
        eviction: E,
        constraint: C,
        measure_key: MK,
        measure_value: MV,
        window: usize,
    ) -> Self {
        Self {
            core: M::new_cell(CacheCore {
                data: FxHashMap::default(),
                insertion,
                eviction,
                constraint,
                measure_key,
                measure_value,
                stats: CacheStats::new(window),
            }),
        }
    }

    /// Creates a cache pre-loaded from `pairs`, importing in order and
    /// stopping at the first pair the constraint refuses.
    ///
    /// Imports bypass the insertion policy: the caller has already decided
    /// these entries belong in the cache.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (K, V)>,
        insertion: I,
        eviction: E,
        constraint: C,
    ) -> Self
    where
        MK: Default,
        MV: Default,
    {
        let cache = Self::new(insertion, eviction, constraint);
        cache.with_core(|core| {
            for (key, value) in pairs {
                if !core.import_one(key, value) {
                    break;
                }
            }
        });
        cache
    }

    #[inline]
    fn with_core<R>(&self, f: impl FnOnce(&mut CacheCore<K, V, I, E, C, MK, MV>) -> R) -> R {
        M::with(&self.core, f)
    }

    /// Looks up `key`, returning a clone of the value on a hit.
    ///
    /// Fires `on_cache_hit`/`on_cache_miss` on every policy and records the
    /// outcome in the rolling statistics. Accepts any borrowed view `Q` of
    /// the key type (e.g. `&str` for `String` keys).
    pub fn find<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.with_core(|core| core.find(key))
    }

    /// Membership test. Fires no events and records no statistics.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with_core(|core| core.data.contains_key(key))
    }

    /// Inserts or updates `key`, returning whether it was admitted.
    ///
    /// A `false` is a refusal, not an error: the constraint could not make
    /// room the insertion policy would endorse, and the cache is exactly as
    /// it was.
    pub fn insert(&self, key: K, value: V) -> bool {
        self.with_core(|core| core.insert(key, value))
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with_core(|core| core.remove(key))
    }

    /// Keeps only the entries for which `predicate` returns `true`.
    ///
    /// The predicate runs under the cache lock and must not call back into
    /// the cache.
    pub fn retain(&self, predicate: impl FnMut(&K, &V) -> bool) {
        self.with_core(|core| core.retain(predicate));
    }

    /// Visits every entry under the lock.
    ///
    /// The visitor must not call back into the cache.
    pub fn for_each(&self, mut visitor: impl FnMut(&K, &V)) {
        self.with_core(|core| {
            for (key, item) in &core.data {
                visitor(key, item.value());
            }
        });
    }

    /// Copies every `(key, value)` pair into `container`.
    pub fn collect_into<T>(&self, container: &mut T)
    where
        T: Extend<(K, V)>,
        V: Clone,
    {
        self.with_core(|core| {
            container.extend(
                core.data
                    .iter()
                    .map(|(key, item)| (key.clone(), item.value().clone())),
            );
        });
    }

    /// Drops every entry, resets every policy, and zeroes the statistics.
    pub fn clear(&self) {
        self.with_core(|core| core.clear());
    }

    /// Exchanges the entire contents (entries, policies, measures, and
    /// statistics) with `other`. Swapping a cache with itself is a no-op.
    pub fn swap(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }
        M::with_pair(&self.core, &other.core, mem::swap);
    }

    /// Reconfigures the constraint, then evicts coldest-first until it is
    /// satisfied again.
    pub fn update_constraint(&self, params: C::Params) {
        self.with_core(|core| core.update_constraint(params));
    }

    /// Rolling hit rate over the statistics window, in `[0, 1]`.
    pub fn hit_rate(&self) -> f64 {
        self.with_core(|core| core.stats.hit_rate())
    }

    /// Rolling mean of bytes served per lookup over the statistics window.
    pub fn byte_hit_rate(&self) -> f64 {
        self.with_core(|core| core.stats.byte_hit_rate())
    }

    /// Number of resident entries.
    pub fn number_of_items(&self) -> usize {
        self.with_core(|core| core.data.len())
    }

    /// Alias for [`number_of_items`](Self::number_of_items).
    pub fn len(&self) -> usize {
        self.number_of_items()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.number_of_items() == 0
    }

    /// The rolling-statistics window, in lookups.
    pub fn statistics_window_size(&self) -> usize {
        self.with_core(|core| core.stats.window_size())
    }

    /// Resizes the rolling-statistics window, dropping accumulated samples.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    pub fn set_statistics_window_size(&self, window: usize) {
        self.with_core(|core| core.stats.set_window_size(window));
    }

    /// Snapshot of the cumulative activity counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.with_core(|core| core.stats.snapshot())
    }

    /// Runs `f` against the insertion policy, under the lock.
    pub fn with_insertion_policy<R>(&self, f: impl FnOnce(&mut I) -> R) -> R {
        self.with_core(|core| f(&mut core.insertion))
    }

    /// Runs `f` against the eviction policy, under the lock.
    pub fn with_eviction_policy<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        self.with_core(|core| f(&mut core.eviction))
    }

    /// Runs `f` against the constraint policy, under the lock.
    pub fn with_constraint<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        self.with_core(|core| f(&mut core.constraint))
    }

    /// Cross-checks the data map, the eviction policy, and the constraint.
    ///
    /// Intended for tests and debugging; a failure indicates a policy
    /// implementation bug.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.with_core(|core| core.check_invariants())
    }
}
