//! HTTP error mapping.
//!
//! Validation problems are user-correctable and carry their message;
//! everything infrastructural collapses to an opaque 500 whose detail
//! goes to the log only.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use castmatch_recognition::RecognitionError;
use castmatch_store::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad or missing upload, wrong extension, undecodable media.
    #[error("{0}")]
    Validation(String),

    /// Enrollment under a name that already exists.
    #[error("name already enrolled: {0}")]
    Conflict(String),

    /// Store, extractor, or processing failure; `detail` is logged, the
    /// caller gets a generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::Internal(detail) => {
                error!("Internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, please try again".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateName(name) => Self::Conflict(name),
            StoreError::EmptyName
            | StoreError::NameTooLong { .. }
            | StoreError::DimensionMismatch { .. } => Self::Validation(e.to_string()),
            StoreError::Unavailable(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<RecognitionError> for ApiError {
    fn from(e: RecognitionError) -> Self {
        match e {
            RecognitionError::Store(inner) => inner.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_maps_to_conflict() {
        let api: ApiError = StoreError::DuplicateName("Alice".to_string()).into();
        assert!(matches!(api, ApiError::Conflict(_)));
    }

    #[test]
    fn store_outage_maps_to_internal() {
        let api: ApiError = StoreError::Unavailable("connection refused".to_string()).into();
        assert!(matches!(api, ApiError::Internal(_)));
    }

    #[test]
    fn dimension_mismatch_maps_to_validation() {
        let api: ApiError = StoreError::DimensionMismatch {
            expected: 128,
            actual: 12,
        }
        .into();
        assert!(matches!(api, ApiError::Validation(_)));
    }
}
