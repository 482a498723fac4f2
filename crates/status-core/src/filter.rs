//! Query-string filters for collection endpoints.
//!
//! Each filter is built from the raw parameter values of one request and
//! then tested against candidates with `matches`. Unset fields match
//! everything, so a filter with no fields set is the identity. Set fields
//! combine with AND.

use chrono::{DateTime, Utc};
use status_types::{
    Event, Incident, IncidentType, Named, ResolutionType, Resource, ResourceType, StatusType,
    extract_id,
};

use crate::conditional::parse_instant;
use crate::error::CoreError;

/// Parse an optional enum-valued parameter.
fn parse_enum<T>(name: &'static str, raw: Option<&str>) -> Result<Option<T>, CoreError>
where
    T: std::str::FromStr<Err = status_types::UnknownVariant>,
{
    raw.map(|value| {
        value.parse().map_err(|e: status_types::UnknownVariant| CoreError::InvalidFilter {
            name,
            reason: e.to_string(),
        })
    })
    .transpose()
}

/// Parse an optional RFC 3339 parameter.
fn parse_time(name: &'static str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, CoreError> {
    raw.map(|value| {
        parse_instant(value).map_err(|e| CoreError::InvalidFilter {
            name,
            reason: e.to_string(),
        })
    })
    .transpose()
}

/// Whether `href` points at the entity with `id`.
fn references(href: &str, id: &str) -> bool {
    extract_id(href) == Some(id)
}

/// Match on `short_name` only. Used by every endpoint without richer filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortNameFilter {
    /// Required `short_name`.
    pub short_name: Option<String>,
}

impl ShortNameFilter {
    /// Build from the raw `short_name` parameter.
    pub fn new(short_name: Option<&str>) -> Self {
        Self {
            short_name: short_name.map(str::to_owned),
        }
    }

    /// Whether `item` passes.
    pub fn matches<T: Named>(&self, item: &T) -> bool {
        self.short_name
            .as_deref()
            .is_none_or(|wanted| item.short_name() == Some(wanted))
    }
}

/// Filters for `GET /resources`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Required `short_name`.
    pub short_name: ShortNameFilter,
    /// Required `group`.
    pub group: Option<String>,
    /// Required resource type.
    pub resource_type: Option<ResourceType>,
}

impl ResourceFilter {
    /// Build from raw `short_name`, `group`, and `type` values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFilter`] for an unknown resource type.
    pub fn parse(
        short_name: Option<&str>,
        group: Option<&str>,
        resource_type: Option<&str>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            short_name: ShortNameFilter::new(short_name),
            group: group.map(str::to_owned),
            resource_type: parse_enum("type", resource_type)?,
        })
    }

    /// Whether `resource` passes.
    pub fn matches(&self, resource: &Resource) -> bool {
        self.short_name.matches(resource)
            && self
                .group
                .as_deref()
                .is_none_or(|group| resource.group.as_deref() == Some(group))
            && self
                .resource_type
                .is_none_or(|kind| resource.resource_type == kind)
    }
}

/// Raw parameters accepted by `GET /incidents`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncidentParams<'a> {
    /// `short_name`.
    pub short_name: Option<&'a str>,
    /// `status`.
    pub status: Option<&'a str>,
    /// `type`.
    pub incident_type: Option<&'a str>,
    /// `resolution`.
    pub resolution: Option<&'a str>,
    /// `time`: keep incidents active at this instant.
    pub time: Option<&'a str>,
    /// `from`: start of the conflict window.
    pub from: Option<&'a str>,
    /// `to`: end of the conflict window.
    pub to: Option<&'a str>,
    /// `resource`: keep incidents impacting this resource id.
    pub resource: Option<&'a str>,
}

/// Filters for `GET /incidents`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentFilter {
    /// Required `short_name`.
    pub short_name: ShortNameFilter,
    /// Required status.
    pub status: Option<StatusType>,
    /// Required incident type.
    pub incident_type: Option<IncidentType>,
    /// Required resolution.
    pub resolution: Option<ResolutionType>,
    /// Instant the incident must be active at.
    pub time: Option<DateTime<Utc>>,
    /// Conflict window start.
    pub from: Option<DateTime<Utc>>,
    /// Conflict window end.
    pub to: Option<DateTime<Utc>>,
    /// Resource id the incident must reference.
    pub resource: Option<String>,
}

impl IncidentFilter {
    /// Build from raw parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFilter`] for unknown enum values and
    /// malformed instants.
    pub fn parse(params: IncidentParams<'_>) -> Result<Self, CoreError> {
        Ok(Self {
            short_name: ShortNameFilter::new(params.short_name),
            status: parse_enum("status", params.status)?,
            incident_type: parse_enum("type", params.incident_type)?,
            resolution: parse_enum("resolution", params.resolution)?,
            time: parse_time("time", params.time)?,
            from: parse_time("from", params.from)?,
            to: parse_time("to", params.to)?,
            resource: params.resource.map(str::to_owned),
        })
    }

    /// Whether `incident` passes.
    pub fn matches(&self, incident: &Incident) -> bool {
        let windowed = self.from.is_some() || self.to.is_some();
        self.short_name.matches(incident)
            && self.status.is_none_or(|s| incident.status == s)
            && self.incident_type.is_none_or(|t| incident.incident_type == t)
            && self.resolution.is_none_or(|r| incident.resolution == r)
            && self.time.is_none_or(|at| incident.is_active_at(at))
            && (!windowed || incident.overlaps(self.from, self.to))
            && self.resource.as_deref().is_none_or(|id| {
                incident.resource_uris.iter().any(|href| references(href, id))
            })
    }
}

/// Filters for `GET /events`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Required `short_name`.
    pub short_name: ShortNameFilter,
    /// Required status.
    pub status: Option<StatusType>,
    /// Resource id the event must be about.
    pub resource: Option<String>,
    /// Incident id the event must come from.
    pub incident: Option<String>,
}

impl EventFilter {
    /// Build from raw `short_name`, `status`, `resource`, and `incident`
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFilter`] for an unknown status.
    pub fn parse(
        short_name: Option<&str>,
        status: Option<&str>,
        resource: Option<&str>,
        incident: Option<&str>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            short_name: ShortNameFilter::new(short_name),
            status: parse_enum("status", status)?,
            resource: resource.map(str::to_owned),
            incident: incident.map(str::to_owned),
        })
    }

    /// Whether `event` passes.
    pub fn matches(&self, event: &Event) -> bool {
        self.short_name.matches(event)
            && self.status.is_none_or(|s| event.status == s)
            && self.resource.as_deref().is_none_or(|id| {
                event.resource_uri.as_deref().is_some_and(|href| references(href, id))
            })
            && self.incident.as_deref().is_none_or(|id| {
                event.incident_uri.as_deref().is_some_and(|href| references(href, id))
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use status_types::NamedObject;

    use super::*;

    const RES_ID: &str = "29989783-bc70-4cc8-880f-f2176d6cec20";
    const INC_ID: &str = "5b7c0d7e-3f55-4b0a-9f57-0f2f7d1f3b21";

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 24, hour, 0, 0).unwrap()
    }

    fn resource(short_name: &str, group: Option<&str>, kind: ResourceType) -> Resource {
        let mut base = NamedObject::new(RES_ID, at(0));
        base.short_name = Some(short_name.to_owned());
        Resource {
            base,
            resource_type: kind,
            current_status: StatusType::Up,
            group: group.map(str::to_owned),
            capability_uris: Vec::new(),
            located_at_uri: None,
            member_of_uri: None,
            depends_on_uris: Vec::new(),
            has_dependent_uris: Vec::new(),
            impacted_by_uris: Vec::new(),
            incident_uris: Vec::new(),
        }
    }

    fn incident(start: u32, end: Option<u32>) -> Incident {
        Incident {
            base: NamedObject::new(INC_ID, at(0)),
            status: StatusType::Down,
            incident_type: IncidentType::Planned,
            start: at(start),
            end: end.map(at),
            resolution: ResolutionType::Pending,
            resource_uris: vec![format!("http://localhost:8081/api/v1/status/resources/{RES_ID}")],
            event_uris: Vec::new(),
        }
    }

    #[test]
    fn resource_filters_intersect() {
        let filter = ResourceFilter::parse(None, Some("storage"), Some("storage")).unwrap();
        assert!(filter.matches(&resource("hpss", Some("storage"), ResourceType::Storage)));
        assert!(!filter.matches(&resource("dtn01", Some("storage"), ResourceType::System)));
        assert!(!filter.matches(&resource("scratch", Some("perlmutter"), ResourceType::Storage)));
        assert!(!filter.matches(&resource("web", None, ResourceType::Storage)));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ResourceFilter::parse(None, None, None).unwrap();
        assert!(filter.matches(&resource("web", None, ResourceType::Website)));
        assert!(EventFilter::default().short_name.short_name.is_none());
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let err = ResourceFilter::parse(None, None, Some("mainframe")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFilter { name: "type", .. }));
        let err = IncidentFilter::parse(IncidentParams {
            resolution: Some("maybe"),
            ..IncidentParams::default()
        })
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidFilter { name: "resolution", .. }));
    }

    #[test]
    fn malformed_instant_is_rejected() {
        let err = IncidentFilter::parse(IncidentParams {
            from: Some("last tuesday"),
            ..IncidentParams::default()
        })
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidFilter { name: "from", .. }));
    }

    #[test]
    fn incident_time_and_window() {
        let closed = incident(2, Some(4));
        let open = incident(6, None);

        let active_at_three = IncidentFilter::parse(IncidentParams {
            time: Some("2025-07-24T03:00:00Z"),
            ..IncidentParams::default()
        })
        .unwrap();
        assert!(active_at_three.matches(&closed));
        assert!(!active_at_three.matches(&open));

        let window = IncidentFilter::parse(IncidentParams {
            from: Some("2025-07-24T05:00:00Z"),
            to: Some("2025-07-24T07:00:00Z"),
            ..IncidentParams::default()
        })
        .unwrap();
        assert!(!window.matches(&closed));
        assert!(window.matches(&open));
    }

    #[test]
    fn incident_resource_membership() {
        let hit = IncidentFilter::parse(IncidentParams {
            resource: Some(RES_ID),
            ..IncidentParams::default()
        })
        .unwrap();
        assert!(hit.matches(&incident(1, None)));

        let miss = IncidentFilter::parse(IncidentParams {
            resource: Some("00000000-0000-4000-8000-000000000000"),
            ..IncidentParams::default()
        })
        .unwrap();
        assert!(!miss.matches(&incident(1, None)));
    }

    #[test]
    fn event_membership_and_status() {
        let event = Event {
            base: NamedObject::new("e", at(1)),
            occurred_at: at(1),
            status: StatusType::Degraded,
            resource_uri: Some(format!("/api/v1/status/resources/{RES_ID}")),
            incident_uri: None,
        };
        let by_resource = EventFilter::parse(None, Some("degraded"), Some(RES_ID), None).unwrap();
        assert!(by_resource.matches(&event));
        let by_incident = EventFilter::parse(None, None, None, Some(INC_ID)).unwrap();
        assert!(!by_incident.matches(&event));
        let wrong_status = EventFilter::parse(None, Some("up"), None, None).unwrap();
        assert!(!wrong_status.matches(&event));
    }
}
