//! Hybrid business-directory search.
//!
//! Combines a semantic vector pass with relevance re-filtering and a
//! deterministic substring fallback, fronted by the scope-shared query
//! cache. Also hosts the pure intent resolver and the result formatter.

mod backend;
mod error;
mod formatter;
mod hit;
mod intent;
mod normalize;
mod resolver;

pub use backend::{BackendResult, DirectoryCatalog, VectorHit, VectorSearchBackend};
pub use error::{BackendError, Result, SearchError};
pub use formatter::{ResultFormatter, FALLBACK_SIMILARITY};
pub use hit::RawHit;
pub use intent::IntentResolver;
pub use normalize::{normalize_query, normalize_similarity, query_terms};
pub use resolver::{HybridResolver, MissingEmbeddingPolicy, SearchOutcome, SearchSettings};
