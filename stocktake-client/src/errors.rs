//! Client error taxonomy

use thiserror::Error;

/// Client result type
pub type ClientResult<T> = Result<T, ClientError>;

/// Error type for API client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Credentials rejected or session no longer valid
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Request rejected by server-side validation
    #[error("invalid request: {detail}")]
    Validation { detail: String },

    /// State conflict, e.g. a duplicate tag or a delete blocked by references
    #[error("conflict: {detail}")]
    Conflict { detail: String },

    /// The server denied the operation for the caller's role
    #[error("forbidden: {detail}")]
    Forbidden { detail: String },

    /// Resource does not exist (or belongs to another tenant)
    #[error("not found")]
    NotFound,

    /// Transport-level failure, including timeouts
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 5xx response
    #[error("server error (status {status})")]
    Server { status: u16 },

    /// Response body did not match the expected shape
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configured base URL could not be parsed
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
}
