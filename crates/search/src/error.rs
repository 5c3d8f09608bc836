use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Failure reported by an injected backend collaborator.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    /// Query normalized to the empty string; no backend was consulted.
    #[error("Empty query")]
    EmptyQuery,

    /// Missing-embedding policy is `Reject` and no embedding was supplied.
    #[error("Search requires an embedding")]
    MissingEmbedding,

    /// Both the semantic pass and the text fallback were unavailable.
    #[error("Search backend unavailable: {0}")]
    Backend(#[from] BackendError),
}
