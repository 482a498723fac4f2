//! Discovery documents: static `{name, version, path}` tables.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::respond::RequestMeta;
use crate::state::AppState;

/// API version served under `/api/v1`.
const VERSION: &str = "v1";

/// One discoverable endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryEntry {
    /// Short name of the endpoint.
    pub name: &'static str,
    /// API version.
    pub version: &'static str,
    /// Server-relative path.
    pub path: &'static str,
}

const fn entry(name: &'static str, path: &'static str) -> DiscoveryEntry {
    DiscoveryEntry {
        name,
        version: VERSION,
        path,
    }
}

/// Top-level API groups.
pub const ROOT: &[DiscoveryEntry] = &[
    entry("status", "/api/v1/status"),
    entry("account", "/api/v1/account"),
];

/// Status collections.
pub const STATUS: &[DiscoveryEntry] = &[
    entry("facility", "/api/v1/status/facility"),
    entry("sites", "/api/v1/status/sites"),
    entry("locations", "/api/v1/status/locations"),
    entry("resources", "/api/v1/status/resources"),
    entry("incidents", "/api/v1/status/incidents"),
    entry("events", "/api/v1/status/events"),
];

/// Account collections.
pub const ACCOUNT: &[DiscoveryEntry] = &[
    entry("capabilities", "/api/v1/account/capabilities"),
    entry("projects", "/api/v1/account/projects"),
    entry("project_allocations", "/api/v1/account/project_allocations"),
    entry("user_allocations", "/api/v1/account/user_allocations"),
];

/// Serialized form of a [`DiscoveryEntry`], with an outbound path.
#[derive(Debug, Serialize)]
struct DiscoveryItem {
    name: &'static str,
    version: &'static str,
    path: String,
}

fn render(
    state: &AppState,
    meta: &RequestMeta,
    table: &[DiscoveryEntry],
) -> Json<Vec<DiscoveryItem>> {
    Json(
        table
            .iter()
            .map(|e| DiscoveryItem {
                name: e.name,
                version: e.version,
                path: state.rewrite(&meta.absolute(e.path)),
            })
            .collect(),
    )
}

/// `GET /api/v1`.
pub async fn root(State(state): State<Arc<AppState>>, meta: RequestMeta) -> impl IntoResponse {
    render(&state, &meta, ROOT)
}

/// `GET /api/v1/status`.
pub async fn status(State(state): State<Arc<AppState>>, meta: RequestMeta) -> impl IntoResponse {
    render(&state, &meta, STATUS)
}

/// `GET /api/v1/account`.
pub async fn account(State(state): State<Arc<AppState>>, meta: RequestMeta) -> impl IntoResponse {
    render(&state, &meta, ACCOUNT)
}
