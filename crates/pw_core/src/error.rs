use thiserror::Error;

use crate::types::ArticleStatus;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    ProviderAuth(String),

    #[error("{message}")]
    ProviderUnavailable {
        attempts: u32,
        status: Option<u16>,
        message: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to publish to WordPress: {0}")]
    Publishing(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: ArticleStatus, to: ArticleStatus },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// HTTP status of the last provider response, when the failure came from one.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            Error::ProviderUnavailable { status, .. } => *status,
            Error::ProviderAuth(_) => Some(401),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
