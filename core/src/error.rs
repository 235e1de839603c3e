//! Error types for the product API client.
//!
//! # Design
//! A non-2xx response is reported with its status and raw body exactly as
//! received; there is no per-status variant, callers read the status (or use
//! `is_not_found`) and decide. The backend owns the error semantics.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by `ProductClient` and `ProductApi`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend returned a status outside 2xx.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connect, DNS, body read).
    /// Holds the HTTP client's own error; downcast it for details.
    #[error("transport failed: {0}")]
    TransportError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "transport")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::TransportError(Box::new(err))
    }
}

impl ApiError {
    /// The HTTP status for `HttpError`, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
