mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

/// A minimal Redis-shaped key/value abstraction: string values, per-key TTL,
/// and a cursor-based scan over a prefix. Every routing component that needs
/// shared state goes through this trait rather than touching a concrete
/// backend directly, so tests can swap in a bare in-memory implementation.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl_ms: Option<i64>);

    async fn get(&self, key: &str) -> Option<String>;

    async fn del(&self, key: &str);

    /// Batched get; preserves input order, `None` for missing/expired keys.
    async fn mget(&self, keys: &[String]) -> Vec<Option<String>>;

    /// Applies every write in `entries` as a unit of book-keeping (not a
    /// transaction - the in-memory backend has no torn-write issue to guard
    /// against, but callers treat this as the atomic multi-set primitive).
    async fn mset(&self, entries: Vec<(String, String, Option<i64>)>);

    /// Returns every live key beginning with `prefix`. The in-memory backend
    /// answers this directly rather than emulating Redis's cursor protocol -
    /// there is no scan-in-progress state to resume across calls.
    async fn scan_prefix(&self, prefix: &str) -> Vec<String>;

    /// `SETNX`-style guard: writes only if `key` is currently absent (expired
    /// counts as absent). Returns `true` if the write happened.
    async fn set_nx(&self, key: &str, value: &str, ttl_ms: Option<i64>) -> bool;
}
