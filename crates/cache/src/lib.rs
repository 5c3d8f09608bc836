//! Time-bounded memoization of search results.
//!
//! The cache sits in front of the hybrid resolver and memoizes whole ranked
//! result lists, keyed by (normalized query, directory scope). Storage is an
//! injected [`CacheStore`] so a single-process deployment can run on the
//! bounded in-memory store while a horizontally scaled one plugs in a shared
//! external cache.

mod error;
mod store;

pub use error::{CacheError, Result};
pub use store::{CacheEntry, CacheKey, CacheStore, MemoryCacheStore};

use directory_protocol::RankedResult;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default freshness window for cached search results.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// TTL-windowed front over a [`CacheStore`].
///
/// `get` never fails: store errors and undecodable entries degrade to a
/// miss. `put` is a best-effort side effect; callers fire it without
/// awaiting correctness and failures are only logged.
#[derive(Clone)]
pub struct QueryCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Fresh non-empty result list for (query, scope), or a miss.
    pub async fn get(&self, normalized_query: &str, scope_id: &str) -> Option<Vec<RankedResult>> {
        let key = CacheKey::new(scope_id, normalized_query);
        let not_before = epoch_secs().saturating_sub(self.ttl.as_secs());

        let entry = match self.store.get_since(&key, not_before).await {
            Ok(entry) => entry?,
            Err(err) => {
                log::debug!("Cache read failed for '{}': {}", normalized_query, err);
                return None;
            }
        };

        match serde_json::from_str::<Vec<RankedResult>>(&entry.results_json) {
            Ok(results) if !results.is_empty() => {
                log::debug!(
                    "Cache hit: '{}' in scope {} ({} results)",
                    normalized_query,
                    scope_id,
                    results.len()
                );
                Some(results)
            }
            Ok(_) => None,
            Err(err) => {
                log::warn!("Discarding undecodable cache entry for '{}': {}", normalized_query, err);
                None
            }
        }
    }

    /// Write a whole-entry replacement for (query, scope). Best-effort.
    pub async fn put(
        &self,
        scope_id: &str,
        raw_query: &str,
        normalized_query: &str,
        results: &[RankedResult],
    ) {
        let results_json = match serde_json::to_string(results) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Skipping cache write for '{}': {}", normalized_query, err);
                return;
            }
        };

        let entry = CacheEntry {
            scope_id: scope_id.to_string(),
            raw_query: raw_query.to_string(),
            normalized_query: normalized_query.to_string(),
            results_json,
            result_count: results.len(),
            written_at: epoch_secs(),
        };

        if let Err(err) = self.store.upsert(entry).await {
            log::warn!("Cache write failed for '{}': {}", normalized_query, err);
        }
    }
}
