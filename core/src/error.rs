//! Error types for the SkillSwap client.
//!
//! # Design
//! Three families of failure reach callers: validation failures raised before
//! any request is built, HTTP/transport failures carrying a best-effort
//! message, and `NotImplemented` for operations the backend does not expose
//! yet. Slices never hold an `ApiError` directly; thunks convert it into an
//! `ErrorPayload` that can be cloned into state and shown verbatim.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the API client and services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A parameter failed client-side validation; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The backend has no endpoint for this operation yet.
    #[error("{0} is not implemented in backend")]
    NotImplemented(&'static str),

    /// The server answered 401. The stored token has already been cleared.
    #[error("session expired, please sign in again")]
    Unauthorized,

    /// The server answered 404.
    #[error("{0}")]
    NotFound(String),

    /// Any other non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 2xx envelope with `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The body parsed as JSON but not into the expected envelope.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),
}

impl ApiError {
    /// HTTP status associated with this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::NotFound(_) => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::NotImplemented(_) => ErrorKind::NotImplemented,
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Http { .. } | ApiError::Rejected(_) => ErrorKind::Server,
            ApiError::UnexpectedShape(_)
            | ApiError::Serialization(_)
            | ApiError::Deserialization(_) => ErrorKind::Decode,
            ApiError::Transport(_) => ErrorKind::Network,
        }
    }
}

/// Coarse classification carried in `ErrorPayload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotImplemented,
    Unauthorized,
    NotFound,
    Server,
    Decode,
    Network,
}

/// Rejection payload stored on slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl From<&ApiError> for ErrorPayload {
    fn from(err: &ApiError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            status: err.status(),
        }
    }
}

impl From<ApiError> for ErrorPayload {
    fn from(err: ApiError) -> Self {
        Self::from(&err)
    }
}

/// Reject blank identifiers before they reach a URL.
pub(crate) fn require_id<'a>(field: &str, id: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Ratings are whole stars from 1 to 5.
pub(crate) fn require_rating(rating: u8) -> Result<u8, ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(rating)
}
