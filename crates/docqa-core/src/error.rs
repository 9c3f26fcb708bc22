use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0} is required")]
    MissingCredential(String),

    #[error("Invalid API key format: {0}")]
    InvalidCredential(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to ingest {path}: {reason}")]
    Ingest { path: String, reason: String },

    #[error("Index construction failed: {0}")]
    Index(String),

    #[error("{0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, Error>;
