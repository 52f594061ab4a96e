//! Tiered statistics cache.
//!
//! - [`entry`]: CacheEntry, data classes and TTL policy
//! - [`local`]: in-process fallback tier
//! - [`store`]: optional persistent store (primary tier)
//! - [`tiered`]: the cache that consults both tiers in order

pub mod entry;
mod local;
pub mod store;
pub mod tiered;

pub use entry::{CacheEntry, CachePayload, DataClass, TtlPolicy};
pub use store::{HttpKvStore, PersistentStore, StoreRow};
pub use tiered::{CacheStats, CacheTier, TieredCache};
