// ==============================================
// RANDOMIZED INVARIANT TESTS (integration)
// ==============================================
//
// Drives random operation sequences against several policy stacks and
// revalidates the cross-structure invariants after every step:
//
//   - membership coherence: eviction policy tracks exactly the data map
//   - size accounting: constraint usage equals the sum of resident sizes
//   - SLRU segmentation: probation/protected partition the key set
//
// Seeds are fixed so failures reproduce.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cachecraft::builder::CacheBuilder;
use cachecraft::cache::Cache;
use cachecraft::policy::{
    AlwaysInsertion, CountConstraint, GdsfEviction, LruEviction, MemoryConstraint, SlruEviction,
    TinyLfuInsertion,
};
use cachecraft::Item;

const KEY_SPACE: u64 = 40;
const STEPS: usize = 4_000;

/// One random step: weighted mix of inserts, finds, removes, and the
/// occasional retain or window poke.
fn drive<C: CacheOps>(cache: &C, rng: &mut StdRng, step: usize) {
    let key = rng.random_range(0..KEY_SPACE);
    match rng.random_range(0..10u32) {
        0..=4 => {
            cache.insert(key, rng.random_range(0..50));
        }
        5..=7 => {
            cache.find(key);
        }
        8 => {
            cache.remove(key);
        }
        _ => {
            if step % 97 == 0 {
                cache.retain_even();
            } else {
                cache.find(key);
            }
        }
    }
}

/// The operations the harness needs, independent of the policy stack.
trait CacheOps {
    fn insert(&self, key: u64, value: u64);
    fn find(&self, key: u64);
    fn remove(&self, key: u64);
    fn retain_even(&self);
    fn validate(&self);
}

// ---- memory-constrained LRU ------------------------------------------------

struct MemoryLru {
    cache: Cache<
        u64,
        u64,
        AlwaysInsertion,
        LruEviction<u64>,
        MemoryConstraint,
        fn(&u64) -> u64,
        fn(&u64) -> u64,
    >,
}

fn key_size(_: &u64) -> u64 {
    4
}

fn value_size(value: &u64) -> u64 {
    8 + value % 5
}

impl MemoryLru {
    fn new() -> Self {
        Self {
            cache: CacheBuilder::new()
                .measure_key(key_size as fn(&u64) -> u64)
                .measure_value(value_size as fn(&u64) -> u64)
                .build(
                    AlwaysInsertion,
                    LruEviction::new(),
                    MemoryConstraint::new(200),
                ),
        }
    }
}

impl CacheOps for MemoryLru {
    fn insert(&self, key: u64, value: u64) {
        self.cache.insert(key, value);
    }

    fn find(&self, key: u64) {
        self.cache.find(&key);
    }

    fn remove(&self, key: u64) {
        self.cache.remove(&key);
    }

    fn retain_even(&self) {
        self.cache.retain(|key, _| key % 2 == 0);
    }

    fn validate(&self) {
        self.cache.check_invariants().unwrap();

        // Recompute the byte accounting from scratch.
        let mut expected = 0u64;
        self.cache.for_each(|key, value| {
            expected += key_size(key) + value_size(value);
        });
        let tracked = self.cache.with_constraint(|c| c.memory());
        assert_eq!(tracked, expected, "memory accounting drifted");
        assert!(tracked <= self.cache.with_constraint(|c| c.max_memory()));
    }
}

// ---- count-constrained TinyLFU + SLRU -------------------------------------

struct TinyLfuSlru {
    cache: Cache<u64, u64, TinyLfuInsertion, SlruEviction<u64>, CountConstraint>,
}

impl TinyLfuSlru {
    fn new() -> Self {
        Self {
            cache: Cache::new(
                TinyLfuInsertion::new(64),
                SlruEviction::new(6),
                CountConstraint::new(10),
            ),
        }
    }
}

impl CacheOps for TinyLfuSlru {
    fn insert(&self, key: u64, value: u64) {
        self.cache.insert(key, value);
    }

    fn find(&self, key: u64) {
        self.cache.find(&key);
    }

    fn remove(&self, key: u64) {
        self.cache.remove(&key);
    }

    fn retain_even(&self) {
        self.cache.retain(|key, _| key % 2 == 0);
    }

    fn validate(&self) {
        self.cache.check_invariants().unwrap();

        let items = self.cache.number_of_items() as u64;
        let counted = self.cache.with_constraint(|c| c.count());
        assert_eq!(items, counted, "count accounting drifted");
        assert!(counted <= self.cache.with_constraint(|c| c.max_count()));

        self.cache.with_eviction_policy(|policy| {
            assert!(policy.protected_len() <= policy.protected_capacity());
            assert_eq!(
                (policy.protected_len() + policy.probation_len()) as u64,
                items,
                "segments must partition the residents"
            );
        });
    }
}

// ---- count-constrained GDSF ------------------------------------------------

struct GdsfCount {
    cache: Cache<
        u64,
        u64,
        AlwaysInsertion,
        GdsfEviction<u64, fn(&u64, &Item<u64>) -> f64>,
        CountConstraint,
    >,
}

fn reload_cost(key: &u64, _item: &Item<u64>) -> f64 {
    10.0 + (key % 7) as f64
}

impl GdsfCount {
    fn new() -> Self {
        Self {
            cache: Cache::new(
                AlwaysInsertion,
                GdsfEviction::new(64, reload_cost as fn(&u64, &Item<u64>) -> f64),
                CountConstraint::new(12),
            ),
        }
    }
}

impl CacheOps for GdsfCount {
    fn insert(&self, key: u64, value: u64) {
        self.cache.insert(key, value);
    }

    fn find(&self, key: u64) {
        self.cache.find(&key);
    }

    fn remove(&self, key: u64) {
        self.cache.remove(&key);
    }

    fn retain_even(&self) {
        self.cache.retain(|key, _| key % 2 == 0);
    }

    fn validate(&self) {
        self.cache.check_invariants().unwrap();
        assert!(self.cache.number_of_items() <= 12);
    }
}

// ---- the harness -----------------------------------------------------------

fn run<C: CacheOps>(cache: C, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for step in 0..STEPS {
        drive(&cache, &mut rng, step);
        cache.validate();
    }
}

#[test]
fn memory_lru_invariants_hold_under_random_ops() {
    run(MemoryLru::new(), 0xCAC4E);
}

#[test]
fn tinylfu_slru_invariants_hold_under_random_ops() {
    run(TinyLfuSlru::new(), 0xBEEF);
}

#[test]
fn gdsf_invariants_hold_under_random_ops() {
    run(GdsfCount::new(), 0xF00D);
}

#[test]
fn gdsf_clock_never_rewinds() {
    let cache = GdsfCount::new();
    let mut rng = StdRng::seed_from_u64(7);
    let mut last_clock = 0.0f64;
    for step in 0..STEPS {
        drive(&cache, &mut rng, step);
        let clock = cache.cache.with_eviction_policy(|policy| policy.clock());
        assert!(clock >= last_clock, "clock rewound: {last_clock} -> {clock}");
        last_clock = clock;
    }
}
