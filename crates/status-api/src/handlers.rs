//! Status endpoint handlers.
//!
//! Every handler reads from one snapshot of the object index taken from
//! the shared [`AppState`] and finishes through [`respond`], which applies
//! conditional retrieval, embedding, and URL rewriting.
//!
//! # Endpoints
//!
//! | Method | Path | Filters |
//! |--------|------|---------|
//! | `GET` | `/api/v1/status/facility[/{id}]` | |
//! | `GET` | `/api/v1/status/sites[/{id}]`, `/sites/{id}/location` | `short_name` |
//! | `GET` | `/api/v1/status/locations[/{id}]` | `short_name` |
//! | `GET` | `/api/v1/status/resources[/{id}]` | `short_name`, `group`, `type` |
//! | `GET` | `/api/v1/status/incidents[/{id}]`, `/incidents/{id}/events` | `short_name`, `status`, `type`, `resolution`, `time`, `from`, `to`, `resource` |
//! | `GET` | `/api/v1/status/events[/{id}]`, `/events/{id}/resource`, `/events/{id}/incident` | `short_name`, `status`, `resource`, `incident` |
//!
//! All of them accept `include=<relation>[,<relation>...]`.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use status_core::ObjectIndex;
use status_core::embed::parse_include;
use status_core::filter::{
    EventFilter, IncidentFilter, IncidentParams, ResourceFilter, ShortNameFilter,
};
use status_types::{Event, Facility, Incident, Link, Location, Relation, Resource, Site, TypedEntity};

use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::respond::{self, RequestMeta};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for single-entity endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeQuery {
    /// Comma-separated relations to embed.
    pub include: Option<String>,
}

/// Query parameters for collections filtered by `short_name` only.
#[derive(Debug, Default, Deserialize)]
pub struct ShortNameQuery {
    /// Exact `short_name` match.
    pub short_name: Option<String>,
    /// Comma-separated relations to embed.
    pub include: Option<String>,
}

/// Query parameters for `GET /resources`.
#[derive(Debug, Default, Deserialize)]
pub struct ResourcesQuery {
    /// Exact `short_name` match.
    pub short_name: Option<String>,
    /// Exact `group` match.
    pub group: Option<String>,
    /// Resource type wire name.
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    /// Comma-separated relations to embed.
    pub include: Option<String>,
}

/// Query parameters for `GET /incidents`.
#[derive(Debug, Default, Deserialize)]
pub struct IncidentsQuery {
    /// Exact `short_name` match.
    pub short_name: Option<String>,
    /// Status wire name.
    pub status: Option<String>,
    /// Incident type wire name.
    #[serde(rename = "type")]
    pub incident_type: Option<String>,
    /// Resolution wire name.
    pub resolution: Option<String>,
    /// RFC 3339 instant the incident must be active at.
    pub time: Option<String>,
    /// RFC 3339 start of the conflict window.
    pub from: Option<String>,
    /// RFC 3339 end of the conflict window.
    pub to: Option<String>,
    /// Resource id the incident must impact.
    pub resource: Option<String>,
    /// Comma-separated relations to embed.
    pub include: Option<String>,
}

/// Query parameters for `GET /events`.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Exact `short_name` match.
    pub short_name: Option<String>,
    /// Status wire name.
    pub status: Option<String>,
    /// Resource id the event must be about.
    pub resource: Option<String>,
    /// Incident id the event must come from.
    pub incident: Option<String>,
    /// Comma-separated relations to embed.
    pub include: Option<String>,
}

impl EventsQuery {
    fn filter(&self) -> Result<EventFilter, ApiError> {
        Ok(EventFilter::parse(
            self.short_name.as_deref(),
            self.status.as_deref(),
            self.resource.as_deref(),
            self.incident.as_deref(),
        )?)
    }
}

// ---------------------------------------------------------------------------
// Shared shapes
// ---------------------------------------------------------------------------

/// Respond with the `T` identified by `id`.
pub(crate) fn by_id<T: TypedEntity + Serialize>(
    state: &AppState,
    meta: &RequestMeta,
    id: &str,
    include: Option<&str>,
) -> Result<Response, ApiError> {
    let index = state.index();
    let entity: T = respond::find(&index, meta, id)?;
    respond::single(state, &index, meta, entity, &parse_include(include))
}

/// Respond with every `T` passing `keep`.
pub(crate) fn all<T, F>(
    state: &AppState,
    meta: &RequestMeta,
    keep: F,
    include: Option<&str>,
) -> Result<Response, ApiError>
where
    T: TypedEntity + Serialize,
    F: Fn(&T) -> bool,
{
    let index = state.index();
    let items = index.find_all::<T>();
    respond::collection(state, &index, meta, items, keep, &parse_include(include))
}

/// Respond with the `T` an href points at.
///
/// An absent href, a dangling one, and one naming another kind are all
/// "not found".
fn follow<T: TypedEntity + Serialize>(
    state: &AppState,
    index: &ObjectIndex,
    meta: &RequestMeta,
    href: Option<&str>,
    include: Option<&str>,
) -> Result<Response, ApiError> {
    let entity: T = match href {
        Some(href) => index.get_by_href(href)?,
        None => None,
    }
    .ok_or_else(|| meta.not_found())?;
    respond::single(state, index, meta, entity, &parse_include(include))
}

/// The href of the first link with `relation`.
fn first_link(links: &[Link], relation: Relation) -> Option<&str> {
    links
        .iter()
        .find(|link| link.is(relation))
        .map(|link| link.href.as_str())
}

// ---------------------------------------------------------------------------
// Facility
// ---------------------------------------------------------------------------

/// `GET /facility`: the facility singleton.
///
/// A deployment without a facility is misconfigured, so this is a 500
/// rather than a 404.
pub async fn get_facility(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    let index = state.index();
    let facility: Facility = index
        .find_one()
        .ok_or_else(|| ApiError::Internal(String::from("no facility is configured")))?;
    respond::single(
        &state,
        &index,
        &meta,
        facility,
        &parse_include(params.include.as_deref()),
    )
}

/// `GET /facility/{id}`.
pub async fn get_facility_by_id(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    by_id::<Facility>(&state, &meta, &id, params.include.as_deref())
}

// ---------------------------------------------------------------------------
// Sites and locations
// ---------------------------------------------------------------------------

/// `GET /sites`.
pub async fn list_sites(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<ShortNameQuery>,
) -> Result<Response, ApiError> {
    let filter = ShortNameFilter::new(params.short_name.as_deref());
    all::<Site, _>(&state, &meta, |s| filter.matches(s), params.include.as_deref())
}

/// `GET /sites/{id}`.
pub async fn get_site(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    by_id::<Site>(&state, &meta, &id, params.include.as_deref())
}

/// `GET /sites/{id}/location`: the location the site sits at.
pub async fn get_site_location(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    let index = state.index();
    let site: Site = respond::find(&index, &meta, &id)?;
    let href = site
        .location_uri
        .as_deref()
        .or_else(|| first_link(&site.base.links, Relation::LocatedAt));
    follow::<Location>(&state, &index, &meta, href, params.include.as_deref())
}

/// `GET /locations`.
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<ShortNameQuery>,
) -> Result<Response, ApiError> {
    let filter = ShortNameFilter::new(params.short_name.as_deref());
    all::<Location, _>(&state, &meta, |l| filter.matches(l), params.include.as_deref())
}

/// `GET /locations/{id}`.
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    by_id::<Location>(&state, &meta, &id, params.include.as_deref())
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// `GET /resources`.
///
/// # Query Parameters
///
/// - `group`: exact group label.
/// - `type`: `website` | `service` | `compute` | `system` | `storage` |
///   `network` | `unknown`.
/// - `short_name`: exact short name.
///
/// Filters combine with AND.
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<ResourcesQuery>,
) -> Result<Response, ApiError> {
    let filter = ResourceFilter::parse(
        params.short_name.as_deref(),
        params.group.as_deref(),
        params.resource_type.as_deref(),
    )?;
    all::<Resource, _>(&state, &meta, |r| filter.matches(r), params.include.as_deref())
}

/// `GET /resources/{id}`.
pub async fn get_resource(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    by_id::<Resource>(&state, &meta, &id, params.include.as_deref())
}

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

/// `GET /incidents`.
///
/// # Query Parameters
///
/// - `status`, `type`, `resolution`: enum wire names.
/// - `time`: keep incidents whose window contains this RFC 3339 instant.
/// - `from` / `to`: keep incidents whose window intersects `[from, to]`.
/// - `resource`: keep incidents impacting this resource id.
/// - `short_name`: exact short name.
pub async fn list_incidents(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<IncidentsQuery>,
) -> Result<Response, ApiError> {
    let filter = IncidentFilter::parse(IncidentParams {
        short_name: params.short_name.as_deref(),
        status: params.status.as_deref(),
        incident_type: params.incident_type.as_deref(),
        resolution: params.resolution.as_deref(),
        time: params.time.as_deref(),
        from: params.from.as_deref(),
        to: params.to.as_deref(),
        resource: params.resource.as_deref(),
    })?;
    all::<Incident, _>(&state, &meta, |i| filter.matches(i), params.include.as_deref())
}

/// `GET /incidents/{id}`.
pub async fn get_incident(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    by_id::<Incident>(&state, &meta, &id, params.include.as_deref())
}

/// `GET /incidents/{id}/events`: events generated by the incident.
///
/// Accepts the same filters as `GET /events`.
pub async fn list_incident_events(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<EventsQuery>,
) -> Result<Response, ApiError> {
    let filter = params.filter()?;
    let index = state.index();
    let incident: Incident = respond::find(&index, &meta, &id)?;
    let events: Vec<Event> = index.resolve_all(&incident.event_uris)?;
    respond::collection(
        &state,
        &index,
        &meta,
        events,
        |e| filter.matches(e),
        &parse_include(params.include.as_deref()),
    )
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// `GET /events`.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiQuery(params): ApiQuery<EventsQuery>,
) -> Result<Response, ApiError> {
    let filter = params.filter()?;
    all::<Event, _>(&state, &meta, |e| filter.matches(e), params.include.as_deref())
}

/// `GET /events/{id}`.
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    by_id::<Event>(&state, &meta, &id, params.include.as_deref())
}

/// `GET /events/{id}/resource`: the resource the event is about.
pub async fn get_event_resource(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    let index = state.index();
    let event: Event = respond::find(&index, &meta, &id)?;
    let href = event
        .resource_uri
        .as_deref()
        .or_else(|| first_link(&event.base.links, Relation::Impacts));
    follow::<Resource>(&state, &index, &meta, href, params.include.as_deref())
}

/// `GET /events/{id}/incident`: the incident that generated the event.
pub async fn get_event_incident(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<IncludeQuery>,
) -> Result<Response, ApiError> {
    let index = state.index();
    let event: Event = respond::find(&index, &meta, &id)?;
    let href = event
        .incident_uri
        .as_deref()
        .or_else(|| first_link(&event.base.links, Relation::GeneratedBy));
    follow::<Incident>(&state, &index, &meta, href, params.include.as_deref())
}
