use thiserror::Error;

use crate::api::ApiError;

/// Errors surfaced to the view layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Bad credentials, duplicate account, logout failure.
    #[error("{0}")]
    Auth(String),

    /// A read from the API failed.
    #[error("{0}")]
    Fetch(String),

    /// A create, update or delete was not accepted.
    #[error("{0}")]
    Mutation(String),

    /// Rejected locally before any request was made.
    #[error("{0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Auth failure carrying the server's message, or `fallback` when it sent none.
    pub fn auth(err: &ApiError, fallback: &str) -> Self {
        ClientError::Auth(err.server_message().unwrap_or_else(|| fallback.to_string()))
    }

    pub fn fetch(err: &ApiError, fallback: &str) -> Self {
        ClientError::Fetch(err.server_message().unwrap_or_else(|| fallback.to_string()))
    }

    pub fn mutation(err: &ApiError, fallback: &str) -> Self {
        ClientError::Mutation(err.server_message().unwrap_or_else(|| fallback.to_string()))
    }

    pub fn message(&self) -> &str {
        match self {
            ClientError::Auth(m)
            | ClientError::Fetch(m)
            | ClientError::Mutation(m)
            | ClientError::Validation(m) => m,
        }
    }
}
