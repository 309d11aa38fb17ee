//! Query result cache
//!
//! Adapters consult the cache before calling ARM and store every outcome:
//! the items of a successful query, or the fact that nothing was found.
//! Other errors are never cached.

mod memory;

pub use memory::MemoryCache;

use crate::sdp::{Item, ItemType, QueryMethod};
use async_trait::async_trait;
use std::time::Duration;

/// Default time an entry stays valid
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Identity of a cached query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub item_type: ItemType,
    pub method: QueryMethod,
    pub scope: String,
    pub query: String,
}

impl CacheKey {
    pub fn new(item_type: ItemType, method: QueryMethod, scope: &str, query: &str) -> Self {
        Self {
            item_type,
            method,
            scope: scope.to_string(),
            query: query.to_string(),
        }
    }
}

/// A cached outcome
#[derive(Debug, Clone, PartialEq)]
pub enum CacheHit {
    Items(Vec<Item>),
    NotFound,
}

#[async_trait]
pub trait Cache: Send + Sync {
    async fn lookup(&self, key: &CacheKey) -> Option<CacheHit>;

    async fn store_items(&self, key: CacheKey, items: Vec<Item>, ttl: Duration);

    async fn store_not_found(&self, key: CacheKey, ttl: Duration);

    /// Drop expired entries, returning how many were removed
    async fn purge_expired(&self) -> usize;
}

/// Cache that never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl Cache for NoopCache {
    async fn lookup(&self, _key: &CacheKey) -> Option<CacheHit> {
        None
    }

    async fn store_items(&self, _key: CacheKey, _items: Vec<Item>, _ttl: Duration) {}

    async fn store_not_found(&self, _key: CacheKey, _ttl: Duration) {}

    async fn purge_expired(&self) -> usize {
        0
    }
}
