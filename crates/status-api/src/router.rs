//! Axum router construction for the status API.
//!
//! Assembles every route into a single [`Router`] with CORS and request
//! tracing. Unknown paths get the same problem document as any other 404.

use std::sync::Arc;

use axum::Router;
use axum::http::Uri;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::account;
use crate::discovery;
use crate::error::ApiError;
use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /api/v1` -- top-level discovery
/// - `GET /api/v1/status` -- status discovery
/// - `GET /api/v1/status/{facility,sites,locations,resources,incidents,events}[/{id}]`
/// - `GET /api/v1/status/sites/{id}/location`
/// - `GET /api/v1/status/incidents/{id}/events`
/// - `GET /api/v1/status/events/{id}/{resource,incident}`
/// - `GET /api/v1/account` -- account discovery
/// - `GET /api/v1/account/{capabilities,projects,project_allocations,user_allocations}[/{id}]`
///
/// CORS allows any origin; the API is read-only and unauthenticated.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Discovery
        .route("/api/v1", get(discovery::root))
        .route("/api/v1/status", get(discovery::status))
        .route("/api/v1/account", get(discovery::account))
        // Status
        .route("/api/v1/status/facility", get(handlers::get_facility))
        .route("/api/v1/status/facility/{id}", get(handlers::get_facility_by_id))
        .route("/api/v1/status/sites", get(handlers::list_sites))
        .route("/api/v1/status/sites/{id}", get(handlers::get_site))
        .route("/api/v1/status/sites/{id}/location", get(handlers::get_site_location))
        .route("/api/v1/status/locations", get(handlers::list_locations))
        .route("/api/v1/status/locations/{id}", get(handlers::get_location))
        .route("/api/v1/status/resources", get(handlers::list_resources))
        .route("/api/v1/status/resources/{id}", get(handlers::get_resource))
        .route("/api/v1/status/incidents", get(handlers::list_incidents))
        .route("/api/v1/status/incidents/{id}", get(handlers::get_incident))
        .route("/api/v1/status/incidents/{id}/events", get(handlers::list_incident_events))
        .route("/api/v1/status/events", get(handlers::list_events))
        .route("/api/v1/status/events/{id}", get(handlers::get_event))
        .route("/api/v1/status/events/{id}/resource", get(handlers::get_event_resource))
        .route("/api/v1/status/events/{id}/incident", get(handlers::get_event_incident))
        // Account
        .route("/api/v1/account/capabilities", get(account::list_capabilities))
        .route("/api/v1/account/capabilities/{id}", get(account::get_capability))
        .route("/api/v1/account/projects", get(account::list_projects))
        .route("/api/v1/account/projects/{id}", get(account::get_project))
        .route("/api/v1/account/project_allocations", get(account::list_project_allocations))
        .route("/api/v1/account/project_allocations/{id}", get(account::get_project_allocation))
        .route("/api/v1/account/user_allocations", get(account::list_user_allocations))
        .route("/api/v1/account/user_allocations/{id}", get(account::get_user_allocation))
        .fallback(fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_owned())
}
