use async_trait::async_trait;
use directory_protocol::DirectoryRecord;
use directory_search::{BackendResult, DirectoryCatalog, VectorHit, VectorSearchBackend};
use directory_session::{matches_variant, MembershipRoster, Result as SessionResult};
use std::collections::HashMap;

/// In-memory directory backing for tests and the demo binary: holds scopes,
/// rows and optional per-record embeddings, and serves all three
/// collaborator seams (vector search, catalog reads, roster lookups).
/// Production deployments inject real datastore-backed implementations.
#[derive(Default)]
pub struct MemoryDirectory {
    scope_names: HashMap<String, String>,
    records: HashMap<String, Vec<DirectoryRecord>>,
    embeddings: HashMap<String, Vec<f32>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_scope(&mut self, scope_id: &str, name: &str) {
        self.scope_names.insert(scope_id.to_string(), name.to_string());
        self.records.entry(scope_id.to_string()).or_default();
    }

    pub fn add_record(&mut self, scope_id: &str, record: DirectoryRecord) {
        self.records
            .entry(scope_id.to_string())
            .or_default()
            .push(record);
    }

    pub fn add_embedding(&mut self, record_id: &str, embedding: Vec<f32>) {
        self.embeddings.insert(record_id.to_string(), embedding);
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorSearchBackend for MemoryDirectory {
    async fn similarity_search(
        &self,
        _query: &str,
        embedding: &[f32],
        scope_id: &str,
        threshold: f32,
        limit: usize,
    ) -> BackendResult<Vec<VectorHit>> {
        let mut hits: Vec<VectorHit> = self
            .records
            .get(scope_id)
            .into_iter()
            .flatten()
            .filter_map(|record| {
                let stored = self.embeddings.get(&record.id)?;
                let similarity = cosine(embedding, stored);
                (similarity >= threshold).then(|| VectorHit {
                    record: record.clone(),
                    similarity,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

#[async_trait]
impl DirectoryCatalog for MemoryDirectory {
    async fn scope_name(&self, scope_id: &str) -> BackendResult<Option<String>> {
        Ok(self.scope_names.get(scope_id).cloned())
    }

    async fn scope_records(&self, scope_id: &str) -> BackendResult<Vec<DirectoryRecord>> {
        Ok(self.records.get(scope_id).cloned().unwrap_or_default())
    }

    async fn segments(&self, scope_id: &str) -> BackendResult<Vec<String>> {
        let mut segments: Vec<String> = self
            .records
            .get(scope_id)
            .into_iter()
            .flatten()
            .filter_map(|r| r.industry.clone())
            .collect();
        segments.sort();
        segments.dedup();
        Ok(segments)
    }

    async fn members(
        &self,
        scope_id: &str,
        segment: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> BackendResult<Vec<DirectoryRecord>> {
        let rows = self
            .records
            .get(scope_id)
            .into_iter()
            .flatten()
            .filter(|r| {
                segment.is_none_or(|wanted| {
                    r.industry
                        .as_deref()
                        .is_some_and(|ind| ind.eq_ignore_ascii_case(wanted))
                })
            })
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn find_contact(
        &self,
        membership_id: Option<&str>,
        business_name: Option<&str>,
    ) -> BackendResult<Option<DirectoryRecord>> {
        let by_membership = |r: &DirectoryRecord| {
            membership_id.is_some_and(|id| r.membership_id.as_deref() == Some(id))
        };
        let by_name = |r: &DirectoryRecord| {
            business_name.is_some_and(|name| {
                r.name.to_lowercase().contains(&name.trim().to_lowercase())
            })
        };
        Ok(self
            .records
            .values()
            .flatten()
            .find(|r| by_membership(r) || by_name(r))
            .cloned())
    }
}

#[async_trait]
impl MembershipRoster for MemoryDirectory {
    async fn find_member(
        &self,
        scope_id: &str,
        phone_variants: &[String],
    ) -> SessionResult<Option<DirectoryRecord>> {
        Ok(self
            .records
            .get(scope_id)
            .into_iter()
            .flatten()
            .find(|r| {
                r.phone
                    .as_deref()
                    .is_some_and(|phone| matches_variant(phone, phone_variants))
            })
            .cloned())
    }
}
