//! Account endpoint handlers: capabilities, projects, and allocations.
//!
//! Read-only views with the same conditional-GET behaviour as the status
//! endpoints. Each collection accepts `short_name`.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use status_core::filter::ShortNameFilter;
use status_types::{Capability, Project, ProjectAllocation, UserAllocation};

use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::handlers::{IncludeQuery, ShortNameQuery, all, by_id};
use crate::respond::RequestMeta;
use crate::state::AppState;

/// `GET /account/capabilities`.
pub async fn list_capabilities(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<ShortNameQuery>,
) -> Result<Response, ApiError> {
    let filter = ShortNameFilter::new(params.short_name.as_deref());
    all::<Capability, _>(&state, &meta, |c| filter.matches(c), params.include.as_deref())
}

/// `GET /account/capabilities/{id}`.
pub async fn get_capability(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    by_id::<Capability>(&state, &meta, &id, params.include.as_deref())
}

/// `GET /account/projects`.
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<ShortNameQuery>,
) -> Result<Response, ApiError> {
    let filter = ShortNameFilter::new(params.short_name.as_deref());
    all::<Project, _>(&state, &meta, |p| filter.matches(p), params.include.as_deref())
}

/// `GET /account/projects/{id}`.
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    by_id::<Project>(&state, &meta, &id, params.include.as_deref())
}

/// `GET /account/project_allocations`.
pub async fn list_project_allocations(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<ShortNameQuery>,
) -> Result<Response, ApiError> {
    let filter = ShortNameFilter::new(params.short_name.as_deref());
    all::<ProjectAllocation, _>(&state, &meta, |a| filter.matches(a), params.include.as_deref())
}

/// `GET /account/project_allocations/{id}`.
pub async fn get_project_allocation(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    by_id::<ProjectAllocation>(&state, &meta, &id, params.include.as_deref())
}

/// `GET /account/user_allocations`.
pub async fn list_user_allocations(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<ShortNameQuery>,
) -> Result<Response, ApiError> {
    let filter = ShortNameFilter::new(params.short_name.as_deref());
    all::<UserAllocation, _>(&state, &meta, |a| filter.matches(a), params.include.as_deref())
}

/// `GET /account/user_allocations/{id}`.
pub async fn get_user_allocation(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    by_id::<UserAllocation>(&state, &meta, &id, params.include.as_deref())
}
