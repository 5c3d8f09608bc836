use crate::error::Result;
use async_trait::async_trait;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Cache key: normalized query text scoped to a directory.
///
/// Deliberately not per-identity, so a hit is shared across every session
/// asking the same normalized question within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub scope_id: String,
    pub normalized_query: String,
}

impl CacheKey {
    pub fn new(scope_id: impl Into<String>, normalized_query: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            normalized_query: normalized_query.into(),
        }
    }
}

/// A stored search result list. Entries are immutable once written; a fresh
/// search for the same key replaces the whole entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub scope_id: String,
    pub raw_query: String,
    pub normalized_query: String,
    /// Serialized `Vec<RankedResult>`.
    pub results_json: String,
    pub result_count: usize,
    /// Unix seconds at write time; freshness is evaluated at read time.
    pub written_at: u64,
}

impl CacheEntry {
    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.scope_id.clone(), self.normalized_query.clone())
    }
}

/// Injected cache storage seam.
///
/// Reads are time-windowed at the store level so a backing implementation
/// with server-side expiry (e.g. a shared external cache) can push the
/// predicate down instead of shipping stale rows back.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Entry for `key` written at or after `not_before`, if any.
    async fn get_since(&self, key: &CacheKey, not_before: u64) -> Result<Option<CacheEntry>>;

    /// Insert or replace the entry for its key.
    async fn upsert(&self, entry: CacheEntry) -> Result<()>;
}

/// Bounded in-memory store used by tests and single-process deployments.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get_since(&self, key: &CacheKey, not_before: u64) -> Result<Option<CacheEntry>> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(entries
            .get(key)
            .filter(|entry| entry.written_at >= not_before)
            .cloned())
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.put(entry.key(), entry);
        Ok(())
    }
}
