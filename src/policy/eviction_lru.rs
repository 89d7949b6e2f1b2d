//! Least-Recently-Used eviction policy.
//!
//! Keeps a recency list (front = hottest) plus a key → slot side index into
//! the backing [`KeyList`] arena. Every operation is O(1); victim iteration
//! walks the list back-to-front, so the coldest key surfaces first.
//!
//! ```text
//!   index: FxHashMap<K, slot>          list: KeyList<K>
//!   ┌─────────┬───────┐
//!   │  "hot"  │ slot₂ │────────► front ──► [hot] ◄──► [warm] ◄──► [cold] ◄── back
//!   │  "warm" │ slot₀ │                     MRU                     LRU
//!   │  "cold" │ slot₁ │                                              │
//!   └─────────┴───────┘            victim_iter ──────────────────────┘
//! ```

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::key_list::{KeyList, KeysRev};
use crate::item::Item;
use crate::traits::EvictionPolicy;

/// Recency-ordered eviction policy.
///
/// ```
/// use cachecraft::policy::LruEviction;
/// use cachecraft::item::Item;
/// use cachecraft::traits::EvictionPolicy;
///
/// fn coldest(policy: &LruEviction<&'static str>) -> Option<&'static str> {
///     EvictionPolicy::<&str, ()>::victim_iter(policy).next().copied()
/// }
///
/// let mut policy: LruEviction<&str> = LruEviction::new();
/// let item = Item::new((), 1, 1);
/// policy.on_insert(&"a", &item);
/// policy.on_insert(&"b", &item);
///
/// // "a" is the coldest key until it gets touched.
/// assert_eq!(coldest(&policy), Some("a"));
/// policy.on_cache_hit(&"a", &item);
/// assert_eq!(coldest(&policy), Some("b"));
/// ```
#[derive(Debug, Default)]
pub struct LruEviction<K> {
    index: FxHashMap<K, u32>,
    list: KeyList<K>,
}

impl<K: Eq + Hash + Clone> LruEviction<K> {
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            list: KeyList::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> EvictionPolicy<K, V> for LruEviction<K> {
    type VictimIter<'a>
        = KeysRev<'a, K>
    where
        Self: 'a,
        K: 'a;

    fn victim_iter(&self) -> KeysRev<'_, K> {
        self.list.iter_rev()
    }

    fn on_insert(&mut self, key: &K, _item: &Item<V>) {
        debug_assert!(
            !self.index.contains_key(key),
            "insert event for a key the policy already tracks"
        );
        let slot = self.list.push_front(key.clone());
        self.index.insert(key.clone(), slot);
    }

    fn on_cache_hit(&mut self, key: &K, _item: &Item<V>) {
        match self.index.get(key) {
            Some(&slot) => self.list.move_to_front(slot),
            None => debug_assert!(false, "hit event for a key the policy does not track"),
        }
    }

    fn on_update(&mut self, key: &K, _old: &Item<V>, new: &Item<V>) {
        EvictionPolicy::<K, V>::on_cache_hit(self, key, new);
    }

    fn on_evict(&mut self, key: &K, _item: &Item<V>) {
        match self.index.remove(key) {
            Some(slot) => {
                self.list.remove(slot);
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
        self.list.clear();
    }
}
