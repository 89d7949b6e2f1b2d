//! cachecraft: composable-policy in-process caching.
//!
//! One cache coordinator, three pluggable policies:
//!
//! - an **insertion policy** decides whether a key is worth caching
//!   ([`AlwaysInsertion`](policy::AlwaysInsertion),
//!   [`TinyLfuInsertion`](policy::TinyLfuInsertion));
//! - an **eviction policy** decides who goes first when room is needed
//!   ([`LruEviction`](policy::LruEviction), [`SlruEviction`](policy::SlruEviction),
//!   [`GdsfEviction`](policy::GdsfEviction));
//! - a **constraint policy** defines the resource budget
//!   ([`MemoryConstraint`](policy::MemoryConstraint),
//!   [`CountConstraint`](policy::CountConstraint)).
//!
//! Any combination works without re-implementing coordination logic; the
//! [`Cache`](cache::Cache) handles lookup, admission, speculative eviction,
//! event sequencing, and statistics. See [`presets`] for ready-made
//! combinations and [`traits`] for the policy interfaces.
//!
//! ```
//! use cachecraft::presets::tiny_lfu_cache;
//!
//! let cache = tiny_lfu_cache::<String, Vec<u8>>(1 << 20, 10_000, 8_000);
//!
//! // TinyLFU admits keys on their second sighting.
//! cache.insert("page".to_string(), vec![0; 512]);
//! assert_eq!(cache.find("page"), None);
//! cache.insert("page".to_string(), vec![0; 512]);
//! assert!(cache.contains("page"));
//! ```

pub mod builder;
pub mod cache;
pub mod ds;
pub mod error;
pub mod item;
pub mod measure;
pub mod policy;
pub mod prelude;
pub mod presets;
pub mod stats;
pub mod sync;
pub mod traits;

pub use cache::{Cache, DEFAULT_STATS_WINDOW};
pub use item::Item;
