//! Error taxonomy for the scene service
//!
//! Four cases cover every handler outcome:
//! - missing required input -> 400
//! - record absent or not visible to this owner -> 404
//! - record exists but owner mismatch -> 401
//! - database or asset-store failure -> 500

use warp::http::StatusCode;

/// Main service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or malformed required input
    #[error("{0}")]
    Validation(String),

    /// Record absent, or owner-scoped lookup found nothing
    #[error("{0}")]
    NotFound(String),

    /// Caller is not the owner of an existing record
    #[error("{0}")]
    Unauthorized(String),

    /// A backing system call errored
    #[error("{message}: {detail}")]
    Dependency {
        /// Generic, caller-facing message
        message: String,
        /// Underlying error text
        detail: String,
    },
}

impl ServiceError {
    /// Wrap a dependency failure with a generic caller-facing message
    #[inline]
    pub fn dependency(message: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Dependency {
            message: message.into(),
            detail: err.to_string(),
        }
    }

    /// HTTP status for this error
    #[inline]
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Dependency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::NotFound(m) | Self::Unauthorized(m) => m,
            Self::Dependency { message, .. } => message,
        }
    }

    /// Underlying error text, present for dependency failures only
    #[inline]
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Dependency { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

impl warp::reject::Reject for ServiceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            ServiceError::Validation("no file".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound("scene".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Unauthorized("owner".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::dependency("db", "timeout").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn dependency_exposes_detail() {
        let err = ServiceError::dependency("Error uploading model", "connection reset");
        assert_eq!(err.message(), "Error uploading model");
        assert_eq!(err.detail(), Some("connection reset"));
        assert!(ServiceError::NotFound("Scene not found".into()).detail().is_none());
    }
}
