use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Response is not a graph document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid data source: {0}")]
    InvalidSource(String),

    #[error("Normalization failed: {0}")]
    Normalization(String),

    #[error("Load hook failed: {0}")]
    Hook(anyhow::Error),

    #[error("Worker '{0}' failed: {1}")]
    Worker(String, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, UpdateError>;
