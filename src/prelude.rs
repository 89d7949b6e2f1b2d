pub use crate::builder::CacheBuilder;
pub use crate::cache::{Cache, DEFAULT_STATS_WINDOW};
pub use crate::item::Item;
pub use crate::measure::{ByteLen, Measure, SizeOf};
pub use crate::policy::{
    AlwaysInsertion, CountConstraint, GdsfEviction, LruEviction, MemoryConstraint, SlruEviction,
    TinyLfuInsertion,
};
pub use crate::presets::{
    count_lru_cache, custom_cost_cache, lru_cache, tiny_lfu_cache, CountLruCache, CustomCostCache,
    LruCache, TinyLfuCache,
};
pub use crate::stats::MetricsSnapshot;
pub use crate::sync::{LockMode, ThreadSafe, Unsynchronized};
pub use crate::traits::{ConstraintPolicy, EvictionPolicy, InsertionPolicy};
