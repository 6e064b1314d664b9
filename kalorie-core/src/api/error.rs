//! API error types.

use thiserror::Error;

/// Errors returned by a [`CalorieApi`](super::CalorieApi) call.
///
/// Transport failures, non-success envelopes and undecodable payloads all end
/// up here so callers handle a single failure shape.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The resource does not exist (HTTP 404)
    #[error("not found: {0}")]
    NotFound(String),
    /// Network failure or non-success HTTP status
    #[error("HTTP error: {0}")]
    Http(String),
    /// The backend answered with `{"success": false}`
    #[error("rejected by server: {0}")]
    Rejected(String),
    /// The payload matched none of the accepted response shapes
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
