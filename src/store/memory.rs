use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::clock::Clock;

struct Entry {
    value: String,
    expires_at_ms: Option<i64>,
}

/// In-memory `KeyValueStore`. Mirrors the teacher's `Arc<RwLock<Inner>>`
/// state-sharing pattern rather than a new locking scheme of its own.
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        MemoryStore {
            inner: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    fn is_live(entry: &Entry, now_ms: i64) -> bool {
        entry.expires_at_ms.is_none_or(|exp| now_ms < exp)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl_ms: Option<i64>) {
        let expires_at_ms = ttl_ms.map(|ttl| self.clock.now_ms() + ttl);
        self.inner.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at_ms,
            },
        );
    }

    async fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now_ms();
        let guard = self.inner.read().await;
        guard
            .get(key)
            .filter(|e| Self::is_live(e, now))
            .map(|e| e.value.clone())
    }

    async fn del(&self, key: &str) {
        self.inner.write().await.remove(key);
    }

    async fn mget(&self, keys: &[String]) -> Vec<Option<String>> {
        let now = self.clock.now_ms();
        let guard = self.inner.read().await;
        keys.iter()
            .map(|k| {
                guard
                    .get(k)
                    .filter(|e| Self::is_live(e, now))
                    .map(|e| e.value.clone())
            })
            .collect()
    }

    async fn mset(&self, entries: Vec<(String, String, Option<i64>)>) {
        let now = self.clock.now_ms();
        let mut guard = self.inner.write().await;
        for (key, value, ttl_ms) in entries {
            let expires_at_ms = ttl_ms.map(|ttl| now + ttl);
            guard.insert(key, Entry { value, expires_at_ms });
        }
    }

    async fn scan_prefix(&self, prefix: &str) -> Vec<String> {
        let now = self.clock.now_ms();
        let guard = self.inner.read().await;
        guard
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && Self::is_live(e, now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    async fn set_nx(&self, key: &str, value: &str, ttl_ms: Option<i64>) -> bool {
        let now = self.clock.now_ms();
        let mut guard = self.inner.write().await;
        if guard.get(key).is_some_and(|e| Self::is_live(e, now)) {
            return false;
        }
        let expires_at_ms = ttl_ms.map(|ttl| now + ttl);
        guard.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at_ms,
            },
        );
        true
    }
}
