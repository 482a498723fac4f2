//! Entity records served by the status API.
//!
//! Every entity flattens a [`NamedObject`] (identity, display strings,
//! modification time, links) and adds its own scalar fields plus `*_uri` /
//! `*_uris` fields: the denormalized, directly dereferenceable form of the
//! entity's outbound relationships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AllocationUnit, IncidentType, ResolutionType, ResourceType, StatusType};
use crate::link::Link;

/// Rewrites every URI-valued field of a value in place.
///
/// Implementations must cover the self URI, every link href, and every
/// relationship URI or URI list the type carries.
pub trait RewriteUris {
    /// Replace each URI `u` held by `self` with `rewrite(u)`.
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F);
}

fn rewrite_opt<F: Fn(&str) -> String>(field: &mut Option<String>, rewrite: &F) {
    if let Some(uri) = field {
        *uri = rewrite(uri);
    }
}

fn rewrite_all<F: Fn(&str) -> String>(list: &mut [String], rewrite: &F) {
    for uri in list {
        *uri = rewrite(uri);
    }
}

// ---------------------------------------------------------------------------
// NamedObject
// ---------------------------------------------------------------------------

/// Fields shared by every entity.
///
/// `id` is the sole identity key in the object index and never changes
/// after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedObject {
    /// Opaque unique identifier.
    pub id: String,
    /// Canonical URI of this entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_uri: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short display name, used as a query filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When this entity last changed.
    pub last_modified: DateTime<Utc>,
    /// Outbound typed links, in document order.
    #[serde(default)]
    pub links: Vec<Link>,
}

impl NamedObject {
    /// Create a bare named object with no display strings or links.
    pub fn new(id: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            self_uri: None,
            name: None,
            short_name: None,
            description: None,
            last_modified,
            links: Vec::new(),
        }
    }
}

impl RewriteUris for NamedObject {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        rewrite_opt(&mut self.self_uri, rewrite);
        for link in &mut self.links {
            link.href = rewrite(&link.href);
        }
    }
}

// ---------------------------------------------------------------------------
// Status entities
// ---------------------------------------------------------------------------

/// The facility a deployment reports on. Normally a singleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Shared identity fields.
    #[serde(flatten)]
    pub base: NamedObject,
    /// Organization operating the facility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    /// Where users go for help.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_uri: Option<String>,
    /// Sites hosting the facility.
    #[serde(default)]
    pub site_uris: Vec<String>,
    /// Locations of the facility.
    #[serde(default)]
    pub location_uris: Vec<String>,
    /// Resources provided by the facility.
    #[serde(default)]
    pub resource_uris: Vec<String>,
    /// Events reported by the facility.
    #[serde(default)]
    pub event_uris: Vec<String>,
    /// Incidents reported by the facility.
    #[serde(default)]
    pub incident_uris: Vec<String>,
}

impl RewriteUris for Facility {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.base.rewrite_uris(rewrite);
        rewrite_opt(&mut self.support_uri, rewrite);
        rewrite_all(&mut self.site_uris, rewrite);
        rewrite_all(&mut self.location_uris, rewrite);
        rewrite_all(&mut self.resource_uris, rewrite);
        rewrite_all(&mut self.event_uris, rewrite);
        rewrite_all(&mut self.incident_uris, rewrite);
    }
}

/// A physical site (campus, building) where resources run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Shared identity fields.
    #[serde(flatten)]
    pub base: NamedObject,
    /// Organization operating the site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_organization: Option<String>,
    /// Where the site is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_uri: Option<String>,
    /// Resources running at the site.
    #[serde(default)]
    pub resource_uris: Vec<String>,
}

impl RewriteUris for Site {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.base.rewrite_uris(rewrite);
        rewrite_opt(&mut self.location_uri, rewrite);
        rewrite_all(&mut self.resource_uris, rewrite);
    }
}

/// A geographic location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Shared identity fields.
    #[serde(flatten)]
    pub base: NamedObject,
    /// Country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    /// City or town.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality_name: Option<String>,
    /// State or province.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_or_province_name: Option<String>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    /// UN/LOCODE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocode: Option<String>,
    /// Altitude in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Latitude in decimal degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Sites at this location.
    #[serde(default)]
    pub site_uris: Vec<String>,
}

impl RewriteUris for Location {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.base.rewrite_uris(rewrite);
        rewrite_all(&mut self.site_uris, rewrite);
    }
}

/// A user-visible service, system, or component whose status is reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Shared identity fields.
    #[serde(flatten)]
    pub base: NamedObject,
    /// What kind of resource this is.
    #[serde(default)]
    pub resource_type: ResourceType,
    /// Current operational status.
    #[serde(default)]
    pub current_status: StatusType,
    /// Free-form grouping label (e.g. `storage`, `perlmutter`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Capabilities offered by this resource.
    #[serde(default)]
    pub capability_uris: Vec<String>,
    /// Site where the resource runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub located_at_uri: Option<String>,
    /// Facility the resource belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_of_uri: Option<String>,
    /// Resources this one needs.
    #[serde(default)]
    pub depends_on_uris: Vec<String>,
    /// Resources that need this one.
    #[serde(default)]
    pub has_dependent_uris: Vec<String>,
    /// Events affecting this resource.
    #[serde(default)]
    pub impacted_by_uris: Vec<String>,
    /// Incidents involving this resource.
    #[serde(default)]
    pub incident_uris: Vec<String>,
}

impl RewriteUris for Resource {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.base.rewrite_uris(rewrite);
        rewrite_all(&mut self.capability_uris, rewrite);
        rewrite_opt(&mut self.located_at_uri, rewrite);
        rewrite_opt(&mut self.member_of_uri, rewrite);
        rewrite_all(&mut self.depends_on_uris, rewrite);
        rewrite_all(&mut self.has_dependent_uris, rewrite);
        rewrite_all(&mut self.impacted_by_uris, rewrite);
        rewrite_all(&mut self.incident_uris, rewrite);
    }
}

/// A planned or unplanned disruption spanning a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Shared identity fields.
    #[serde(flatten)]
    pub base: NamedObject,
    /// Status the impacted resources are in during the incident.
    #[serde(default)]
    pub status: StatusType,
    /// Planned, unplanned, or reservation.
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    /// Start of the incident window.
    pub start: DateTime<Utc>,
    /// End of the incident window; open-ended when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// How the incident was resolved.
    #[serde(default)]
    pub resolution: ResolutionType,
    /// Resources the incident may impact.
    #[serde(default)]
    pub resource_uris: Vec<String>,
    /// Events generated by the incident.
    #[serde(default)]
    pub event_uris: Vec<String>,
}

impl Incident {
    /// Whether `at` falls inside the incident window (bounds inclusive).
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && self.end.is_none_or(|end| at <= end)
    }

    /// Whether the incident window intersects `[from, to]`.
    ///
    /// A missing bound is unbounded on that side.
    pub fn overlaps(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> bool {
        let starts_in_time = to.is_none_or(|to| self.start <= to);
        let ends_in_time = match (from, self.end) {
            (Some(from), Some(end)) => end >= from,
            _ => true,
        };
        starts_in_time && ends_in_time
    }
}

impl RewriteUris for Incident {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.base.rewrite_uris(rewrite);
        rewrite_all(&mut self.resource_uris, rewrite);
        rewrite_all(&mut self.event_uris, rewrite);
    }
}

/// A point-in-time status observation on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Shared identity fields.
    #[serde(flatten)]
    pub base: NamedObject,
    /// When the event happened.
    pub occurred_at: DateTime<Utc>,
    /// Status the resource entered.
    #[serde(default)]
    pub status: StatusType,
    /// Resource the event is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_uri: Option<String>,
    /// Incident that generated the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_uri: Option<String>,
}

impl RewriteUris for Event {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.base.rewrite_uris(rewrite);
        rewrite_opt(&mut self.resource_uri, rewrite);
        rewrite_opt(&mut self.incident_uri, rewrite);
    }
}

// ---------------------------------------------------------------------------
// Account entities
// ---------------------------------------------------------------------------

/// Something a project can be allocated (CPU hours, storage, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Shared identity fields.
    #[serde(flatten)]
    pub base: NamedObject,
    /// Units the capability is measured in.
    #[serde(default)]
    pub units: Vec<AllocationUnit>,
}

impl RewriteUris for Capability {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.base.rewrite_uris(rewrite);
    }
}

/// A research project holding allocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Shared identity fields.
    #[serde(flatten)]
    pub base: NamedObject,
    /// Members of the project.
    #[serde(default)]
    pub user_ids: Vec<String>,
    /// Allocations granted to the project.
    #[serde(default)]
    pub project_allocation_uris: Vec<String>,
}

impl RewriteUris for Project {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.base.rewrite_uris(rewrite);
        rewrite_all(&mut self.project_allocation_uris, rewrite);
    }
}

/// Granted amount and current consumption in one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    /// Amount granted.
    pub allocation: f64,
    /// Amount consumed so far.
    #[serde(default)]
    pub usage: f64,
    /// Unit of both amounts.
    pub unit: AllocationUnit,
}

/// A project's share of a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAllocation {
    /// Shared identity fields.
    #[serde(flatten)]
    pub base: NamedObject,
    /// Per-unit amounts.
    #[serde(default)]
    pub entries: Vec<AllocationEntry>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_uri: Option<String>,
    /// Capability being allocated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_uri: Option<String>,
    /// Per-user slices of this allocation.
    #[serde(default)]
    pub user_allocation_uris: Vec<String>,
}

impl RewriteUris for ProjectAllocation {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.base.rewrite_uris(rewrite);
        rewrite_opt(&mut self.project_uri, rewrite);
        rewrite_opt(&mut self.capability_uri, rewrite);
        rewrite_all(&mut self.user_allocation_uris, rewrite);
    }
}

/// A single user's slice of a project allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAllocation {
    /// Shared identity fields.
    #[serde(flatten)]
    pub base: NamedObject,
    /// The user.
    pub user_id: String,
    /// Per-unit amounts.
    #[serde(default)]
    pub entries: Vec<AllocationEntry>,
    /// Parent project allocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_allocation_uri: Option<String>,
}

impl RewriteUris for UserAllocation {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.base.rewrite_uris(rewrite);
        rewrite_opt(&mut self.project_allocation_uri, rewrite);
    }
}
