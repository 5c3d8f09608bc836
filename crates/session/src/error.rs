use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session store error: {0}")]
    Store(String),

    #[error("Roster lookup error: {0}")]
    Roster(String),
}
