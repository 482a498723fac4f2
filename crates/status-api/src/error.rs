//! Error types for the status API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! converts into an HTTP problem document via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use status_core::CoreError;
use tracing::error;

/// Media type of error bodies.
const PROBLEM_JSON: &str = "application/problem+json";

/// Errors that can occur in the status API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Nothing of the requested kind lives at the requested location.
    #[error("{0} not found")]
    NotFound(String),

    /// A query parameter could not be interpreted.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A request header or path argument is malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidQuery(_) | Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Serialization(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidFilter { .. } | CoreError::InvalidDate { .. } => {
                Self::InvalidQuery(err.to_string())
            }
            // Hrefs come from the loaded dataset, so a bad one is corrupt data.
            CoreError::InvalidHref { .. }
            | CoreError::InvalidTransform { .. }
            | CoreError::Io { .. }
            | CoreError::Json { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "type": "about:blank",
            "title": status.canonical_reason().unwrap_or("Error"),
            "status": status.as_u16(),
            "detail": self.to_string(),
        });

        (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON))],
            axum::Json(body),
        )
            .into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_is_a_problem_document() {
        let (status, body) =
            body_of(ApiError::NotFound(String::from("/api/v1/status/resources/bad-id"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["title"], "Not Found");
        assert_eq!(body["status"], 404);
        assert_eq!(body["detail"], "/api/v1/status/resources/bad-id not found");
    }

    #[tokio::test]
    async fn core_errors_map_by_cause() {
        let bad_filter = CoreError::InvalidFilter {
            name: "type",
            reason: String::from("unknown"),
        };
        assert_eq!(ApiError::from(bad_filter).status(), StatusCode::BAD_REQUEST);

        let bad_href = CoreError::InvalidHref {
            href: String::from("/x"),
        };
        let (status, body) = body_of(ApiError::from(bad_href)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["title"], "Internal Server Error");
    }
}
