//! Request extractors whose rejections are [`ApiError`]s.
//!
//! Axum's own `Query` and `Path` reject with plain-text bodies. These
//! wrappers route the rejection through [`ApiError`] so every 4xx is a
//! problem document.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{FromRequestParts, Path, Query};

use crate::error::ApiError;

/// [`Query`] rejecting with [`ApiError::InvalidQuery`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// [`Path`] rejecting with [`ApiError::InvalidArgument`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}
