use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache store error: {0}")]
    Store(String),

    #[error("Cache entry serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
