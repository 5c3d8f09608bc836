use crate::backend::{BackendResult, DirectoryCatalog, VectorHit, VectorSearchBackend};
use crate::error::{Result, SearchError};
use directory_protocol::DirectoryRecord;
use crate::formatter::ResultFormatter;
use crate::hit::RawHit;
use crate::normalize::{normalize_query, normalize_similarity, query_terms};
use directory_cache::QueryCache;
use directory_protocol::RankedResult;
use serde::Deserialize;
use std::sync::Arc;

/// What to do when a search turn arrives without an embedding.
///
/// Exactly one policy is active; the resolver consults it once, before the
/// semantic pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEmbeddingPolicy {
    /// Fail the turn with a "search requires embedding" error.
    Reject,
    /// Skip the semantic pass and go straight to the text fallback.
    #[default]
    TextFallback,
}

/// Resolver tuning. Defaults match production behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Vector backend similarity floor; higher is stricter. Sensible range
    /// is 0.4-0.65.
    pub similarity_threshold: f32,
    /// Normalized-similarity floor above which a hit survives re-filtering
    /// without a term match.
    pub high_confidence: u8,
    /// Result cap when the request does not specify one.
    pub default_limit: usize,
    pub missing_embedding: MissingEmbeddingPolicy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.5,
            high_confidence: 65,
            default_limit: 10,
            missing_embedding: MissingEmbeddingPolicy::default(),
        }
    }
}

/// Ranked results plus provenance for the response envelope.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<RankedResult>,
    pub from_cache: bool,
    pub message: String,
}

/// Orchestrates cache lookup, the semantic pass, relevance re-filtering and
/// the deterministic text fallback.
pub struct HybridResolver {
    backend: Arc<dyn VectorSearchBackend>,
    catalog: Arc<dyn DirectoryCatalog>,
    cache: QueryCache,
    formatter: ResultFormatter,
    settings: SearchSettings,
}

impl HybridResolver {
    pub fn new(
        backend: Arc<dyn VectorSearchBackend>,
        catalog: Arc<dyn DirectoryCatalog>,
        cache: QueryCache,
        formatter: ResultFormatter,
        settings: SearchSettings,
    ) -> Self {
        Self {
            backend,
            catalog,
            cache,
            formatter,
            settings,
        }
    }

    /// Resolve a raw query inside a scope.
    ///
    /// Zero results is a successful outcome; an error is returned only for
    /// an empty query, a rejected missing embedding, or a backend failure
    /// with no fallback available.
    pub async fn resolve(
        &self,
        raw_query: &str,
        scope_id: &str,
        embedding: Option<&[f32]>,
        limit: Option<usize>,
    ) -> Result<SearchOutcome> {
        // 1. Normalize; an empty query never reaches a backend.
        let normalized = normalize_query(raw_query);
        if normalized.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let limit = limit.unwrap_or(self.settings.default_limit).max(1);
        log::debug!("Resolving '{}' in scope {} (limit {})", normalized, scope_id, limit);

        // 2. Cache lookup; a non-empty hit short-circuits everything else.
        if let Some(results) = self.cache.get(&normalized, scope_id).await {
            let message = found_message(results.len(), raw_query);
            return Ok(SearchOutcome {
                results: self.formatter.format(results.into_iter().map(RawHit::Cached).collect()),
                from_cache: true,
                message,
            });
        }

        // 3. Missing-embedding policy gate.
        if embedding.is_none() && self.settings.missing_embedding == MissingEmbeddingPolicy::Reject
        {
            return Err(SearchError::MissingEmbedding);
        }

        let terms = query_terms(&normalized);

        // 4-5. Semantic pass plus relevance re-filter. A backend failure
        // here is recoverable as long as the fallback can run.
        let mut semantic_error = None;
        let mut hits: Vec<RawHit> = Vec::new();
        if let Some(embedding) = embedding {
            match self
                .backend
                .similarity_search(
                    &normalized,
                    embedding,
                    scope_id,
                    self.settings.similarity_threshold,
                    limit,
                )
                .await
            {
                Ok(vector_hits) => {
                    log::debug!("Semantic pass: {} hits", vector_hits.len());
                    hits = self
                        .relevance_filter(vector_hits, &terms)
                        .into_iter()
                        .map(|hit| RawHit::Vector {
                            record: hit.record,
                            similarity: hit.similarity,
                        })
                        .collect();
                }
                Err(err) => {
                    log::warn!("Semantic search failed, trying text fallback: {}", err);
                    semantic_error = Some(err);
                }
            }
        }

        // 6. Deterministic fallback when the semantic pass produced nothing.
        if hits.is_empty() {
            match self.text_fallback(scope_id, &terms, limit).await {
                Ok(rows) => {
                    log::debug!("Text fallback: {} rows", rows.len());
                    hits = rows.into_iter().map(RawHit::Fallback).collect();
                }
                Err(err) => {
                    // Critical path: no cache hit, no semantic hits, no rows.
                    return Err(SearchError::Backend(semantic_error.unwrap_or(err)));
                }
            }
        }

        // 7. Empty after both passes is a valid terminal outcome.
        if hits.is_empty() {
            return Ok(SearchOutcome {
                results: Vec::new(),
                from_cache: false,
                message: format!("No matches found for \"{}\".", raw_query.trim()),
            });
        }

        // 8. Rank/format, then a fire-and-forget cache write.
        let results = self.formatter.format(hits);
        let message = found_message(results.len(), raw_query);
        self.spawn_cache_write(scope_id, raw_query, &normalized, &results);

        Ok(SearchOutcome {
            results,
            from_cache: false,
            message,
        })
    }

    /// Keep a hit if it is high-confidence or its searchable text contains
    /// any query term. If that would empty a non-empty set, keep the
    /// original hits: a weak filter must not erase useful signal.
    fn relevance_filter(&self, hits: Vec<VectorHit>, terms: &[&str]) -> Vec<VectorHit> {
        if hits.is_empty() {
            return hits;
        }
        let filtered: Vec<VectorHit> = hits
            .iter()
            .filter(|hit| {
                normalize_similarity(hit.similarity) >= self.settings.high_confidence
                    || text_matches(&hit.record.searchable_text(), terms)
            })
            .cloned()
            .collect();
        if filtered.is_empty() {
            log::debug!("Relevance filter emptied the set; keeping unfiltered hits");
            hits
        } else {
            filtered
        }
    }

    async fn text_fallback(
        &self,
        scope_id: &str,
        terms: &[&str],
        limit: usize,
    ) -> BackendResult<Vec<DirectoryRecord>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows = self.catalog.scope_records(scope_id).await?;
        rows.retain(|row| text_matches(&row.fallback_text(), terms));
        rows.truncate(limit);
        Ok(rows)
    }

    /// Never awaited for correctness; failures are logged inside the cache.
    fn spawn_cache_write(
        &self,
        scope_id: &str,
        raw_query: &str,
        normalized: &str,
        results: &[RankedResult],
    ) {
        let cache = self.cache.clone();
        let scope_id = scope_id.to_string();
        let raw_query = raw_query.to_string();
        let normalized = normalized.to_string();
        let results = results.to_vec();
        tokio::spawn(async move {
            cache.put(&scope_id, &raw_query, &normalized, &results).await;
        });
    }
}

fn text_matches(searchable: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| searchable.contains(term))
}

fn found_message(count: usize, raw_query: &str) -> String {
    if count == 1 {
        format!("Found 1 match for \"{}\".", raw_query.trim())
    } else {
        format!("Found {} matches for \"{}\".", count, raw_query.trim())
    }
}
