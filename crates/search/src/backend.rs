use crate::error::BackendError;
use async_trait::async_trait;
use directory_protocol::DirectoryRecord;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// One hit from the vector-similarity backend. `similarity` is on whatever
/// scale the backend reports (0-1 fraction or percentage); normalization
/// happens downstream.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub record: DirectoryRecord,
    pub similarity: f32,
}

/// Approximate-similarity query against the external vector index.
#[async_trait]
pub trait VectorSearchBackend: Send + Sync {
    /// Hits scoring at or above `threshold`, best first, at most `limit`.
    async fn similarity_search(
        &self,
        query: &str,
        embedding: &[f32],
        scope_id: &str,
        threshold: f32,
        limit: usize,
    ) -> BackendResult<Vec<VectorHit>>;
}

/// Read-only directory rows, consumed by the fallback text search and the
/// listing/contact capabilities.
#[async_trait]
pub trait DirectoryCatalog: Send + Sync {
    /// Display name of a scope, if the scope exists.
    async fn scope_name(&self, scope_id: &str) -> BackendResult<Option<String>>;

    /// All rows of a scope, for the deterministic fallback scan.
    async fn scope_records(&self, scope_id: &str) -> BackendResult<Vec<DirectoryRecord>>;

    /// Distinct industry segments present in a scope.
    async fn segments(&self, scope_id: &str) -> BackendResult<Vec<String>>;

    /// Member rows of a scope, optionally filtered by segment, paged.
    async fn members(
        &self,
        scope_id: &str,
        segment: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> BackendResult<Vec<DirectoryRecord>>;

    /// Cross-scope contact lookup by membership id or business name.
    async fn find_contact(
        &self,
        membership_id: Option<&str>,
        business_name: Option<&str>,
    ) -> BackendResult<Option<DirectoryRecord>>;
}
