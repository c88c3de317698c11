//! Error types for Golem.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Bot is not initialized")]
    NotReady,

    #[error("Send error: {0}")]
    Send(String),

    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    #[error("Duplicate response key: {0}")]
    DuplicateResponseKey(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Slack error: {0}")]
    Slack(String),

    #[error("Web error: {0}")]
    Web(String),
}

impl Error {
    pub fn malformed(s: impl Into<String>) -> Self {
        Error::MalformedCommand(s.into())
    }
}
