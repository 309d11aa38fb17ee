use super::{Cache, CacheHit, CacheKey};
use crate::sdp::Item;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry {
    hit: CacheHit,
    expires_at: Instant,
}

impl Entry {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// In-process cache with per-entry expiry
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<CacheKey, Entry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn insert(&self, key: CacheKey, hit: CacheHit, ttl: Duration) {
        let entry = Entry {
            hit,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn lookup(&self, key: &CacheKey) -> Option<CacheHit> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if !entry.is_valid() {
            return None;
        }
        tracing::debug!(
            "cache hit: {} {} {} @ {}",
            key.method,
            key.item_type,
            key.query,
            key.scope
        );
        Some(entry.hit.clone())
    }

    async fn store_items(&self, key: CacheKey, items: Vec<Item>, ttl: Duration) {
        self.insert(key, CacheHit::Items(items), ttl).await;
    }

    async fn store_not_found(&self, key: CacheKey, ttl: Duration) {
        self.insert(key, CacheHit::NotFound, ttl).await;
    }

    async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_valid());
        before - entries.len()
    }
}
