//! On-demand embedding of related entities.
//!
//! Given an entity and the relation names a client asked to `include`,
//! each matching link is dereferenced through the [`ObjectIndex`] and the
//! result lands in the typed bucket of an [`Included`] bundle. Which kind a
//! relation points at depends on the source kind; [`relation_target`] is
//! that table.

use serde::Serialize;
use status_types::{
    Entity, EntityKind, Event, Facility, Incident, Location, Named, Relation, Resource,
    RewriteUris, Site, TypedEntity,
};
use tracing::error;

use crate::error::CoreError;
use crate::index::ObjectIndex;

/// Related entities embedded alongside a response entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Included {
    /// Embedded facilities.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facility: Vec<Facility>,
    /// Embedded sites.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<Site>,
    /// Embedded locations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    /// Embedded resources.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    /// Embedded incidents.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub incidents: Vec<Incident>,
    /// Embedded events.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

impl Included {
    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.facility.is_empty()
            && self.sites.is_empty()
            && self.locations.is_empty()
            && self.resources.is_empty()
            && self.incidents.is_empty()
            && self.events.is_empty()
    }

    /// Add an entity to its bucket unless one with the same id is already
    /// there. Kinds without a bucket are ignored.
    fn push(&mut self, entity: Entity) {
        match entity {
            Entity::Facility(v) => push_unique(&mut self.facility, v),
            Entity::Site(v) => push_unique(&mut self.sites, v),
            Entity::Location(v) => push_unique(&mut self.locations, v),
            Entity::Resource(v) => push_unique(&mut self.resources, v),
            Entity::Incident(v) => push_unique(&mut self.incidents, v),
            Entity::Event(v) => push_unique(&mut self.events, v),
            Entity::Capability(_)
            | Entity::Project(_)
            | Entity::ProjectAllocation(_)
            | Entity::UserAllocation(_) => {}
        }
    }
}

impl RewriteUris for Included {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        self.facility.iter_mut().for_each(|v| v.rewrite_uris(rewrite));
        self.sites.iter_mut().for_each(|v| v.rewrite_uris(rewrite));
        self.locations.iter_mut().for_each(|v| v.rewrite_uris(rewrite));
        self.resources.iter_mut().for_each(|v| v.rewrite_uris(rewrite));
        self.incidents.iter_mut().for_each(|v| v.rewrite_uris(rewrite));
        self.events.iter_mut().for_each(|v| v.rewrite_uris(rewrite));
    }
}

fn push_unique<T: Named>(bucket: &mut Vec<T>, value: T) {
    if !bucket.iter().any(|existing| existing.id() == value.id()) {
        bucket.push(value);
    }
}

/// The kind a relation points at, for links leaving an entity of kind
/// `source`. `None` means the relation is not embeddable from `source`.
pub const fn relation_target(source: EntityKind, relation: Relation) -> Option<EntityKind> {
    use EntityKind as K;
    use Relation as R;

    match (source, relation) {
        (K::Facility, R::HostedAt | R::HasSite)
        | (K::Location, R::HasSite)
        | (K::Resource, R::LocatedAt) => Some(K::Site),
        (K::Facility, R::HasLocation) | (K::Site, R::LocatedAt | R::HasLocation) => {
            Some(K::Location)
        }
        (K::Facility | K::Site, R::HasResource)
        | (K::Resource, R::DependsOn | R::HasDependent)
        | (K::Incident | K::Event, R::Impacts) => Some(K::Resource),
        (K::Facility | K::Incident, R::HasEvent) | (K::Resource, R::ImpactedBy) => Some(K::Event),
        (K::Facility | K::Resource, R::HasIncident) | (K::Event, R::GeneratedBy) => {
            Some(K::Incident)
        }
        (K::Site | K::Location | K::Resource | K::Incident | K::Event, R::MemberOf) => {
            Some(K::Facility)
        }
        _ => None,
    }
}

/// Split an `include` query value into relation names.
///
/// Names are comma separated; blanks are dropped.
pub fn parse_include(param: Option<&str>) -> Vec<String> {
    param
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Dereference the links of `item` whose relation is in `requested`.
///
/// Relation names must match exactly. A name that is unknown, or not
/// embeddable from `T`, is logged and skipped. Links whose target is
/// missing or of the wrong kind are skipped silently. Returns `None` when
/// nothing was embedded.
///
/// # Errors
///
/// Returns [`CoreError::InvalidHref`] if a matching link's href has no
/// trailing UUID.
pub fn resolve_includes<T: TypedEntity>(
    index: &ObjectIndex,
    item: &T,
    requested: &[String],
) -> Result<Option<Included>, CoreError> {
    if requested.is_empty() {
        return Ok(None);
    }

    let mut included = Included::default();
    for name in requested {
        let Some(target) = name
            .parse::<Relation>()
            .ok()
            .and_then(|relation| relation_target(T::KIND, relation))
        else {
            error!(
                source = %T::KIND,
                relation = %name,
                "relation cannot be included for this entity kind"
            );
            continue;
        };

        for link in item.links().iter().filter(|link| link.relation == *name) {
            if let Some(entity) = index.get_by_href_kind(&link.href, target)? {
                included.push(entity);
            }
        }
    }

    Ok((!included.is_empty()).then_some(included))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};
    use status_types::{Link, NamedObject, ResourceType, StatusType};

    use super::*;

    const SITE_ID: &str = "ce2bbc49-ba63-4711-8f36-43b74ec2fe45";
    const FACILITY_ID: &str = "09a22593-2be8-46f6-ae54-2904b04e13a4";
    const DEP_ID: &str = "8b61b346-b53c-4a8e-83b4-776eaa14cc67";
    const RES_ID: &str = "29989783-bc70-4cc8-880f-f2176d6cec20";

    fn named(id: &str) -> NamedObject {
        NamedObject::new(id, Utc.with_ymd_and_hms(2025, 7, 24, 0, 0, 0).unwrap())
    }

    fn resource(id: &str, links: Vec<Link>) -> Resource {
        let mut base = named(id);
        base.links = links;
        Resource {
            base,
            resource_type: ResourceType::Service,
            current_status: StatusType::Up,
            group: None,
            capability_uris: Vec::new(),
            located_at_uri: None,
            member_of_uri: None,
            depends_on_uris: Vec::new(),
            has_dependent_uris: Vec::new(),
            impacted_by_uris: Vec::new(),
            incident_uris: Vec::new(),
        }
    }

    fn fixture() -> (ObjectIndex, Resource) {
        let source = resource(
            RES_ID,
            vec![
                Link::new(Relation::LocatedAt, format!("/api/v1/status/sites/{SITE_ID}")),
                Link::new(Relation::MemberOf, format!("/api/v1/status/facility/{FACILITY_ID}")),
                Link::new(Relation::DependsOn, format!("/api/v1/status/resources/{DEP_ID}")),
                // Duplicate link to the same dependency.
                Link::new(Relation::DependsOn, format!("/api/v1/status/resources/{DEP_ID}")),
                // Points at the site but claims a resource relation.
                Link::new(Relation::HasDependent, format!("/api/v1/status/resources/{SITE_ID}")),
            ],
        );

        let mut index = ObjectIndex::new();
        index.insert(Site {
            base: named(SITE_ID),
            operating_organization: None,
            location_uri: None,
            resource_uris: Vec::new(),
        });
        index.insert(Facility {
            base: named(FACILITY_ID),
            organization_name: None,
            support_uri: None,
            site_uris: Vec::new(),
            location_uris: Vec::new(),
            resource_uris: Vec::new(),
            event_uris: Vec::new(),
            incident_uris: Vec::new(),
        });
        index.insert(resource(DEP_ID, Vec::new()));
        index.insert(source.clone());
        (index, source)
    }

    fn request(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn fills_typed_buckets_per_relation() {
        let (index, source) = fixture();
        let included = resolve_includes(&index, &source, &request(&["locatedAt", "memberOf"]))
            .unwrap()
            .unwrap();
        assert_eq!(included.sites.len(), 1);
        assert_eq!(included.facility.len(), 1);
        assert!(included.resources.is_empty());
    }

    #[test]
    fn duplicate_links_embed_once() {
        let (index, source) = fixture();
        let included = resolve_includes(&index, &source, &request(&["dependsOn"]))
            .unwrap()
            .unwrap();
        assert_eq!(included.resources.len(), 1);
        assert_eq!(included.resources[0].base.id, DEP_ID);
    }

    #[test]
    fn wrong_kind_targets_are_skipped() {
        let (index, source) = fixture();
        let included = resolve_includes(&index, &source, &request(&["hasDependent"])).unwrap();
        assert!(included.is_none());
    }

    #[test]
    fn unknown_or_partial_relation_names_embed_nothing() {
        let (index, source) = fixture();
        for name in ["located", "hasSite", "bogus"] {
            let included = resolve_includes(&index, &source, &request(&[name])).unwrap();
            assert!(included.is_none(), "{name} should not embed");
        }
        assert!(resolve_includes(&index, &source, &[]).unwrap().is_none());
    }

    #[test]
    fn malformed_href_surfaces_as_error() {
        let (index, _) = fixture();
        let broken = resource(
            RES_ID,
            vec![Link::new(Relation::LocatedAt, "/api/v1/status/sites/not-a-uuid")],
        );
        let result = resolve_includes(&index, &broken, &request(&["locatedAt"]));
        assert!(matches!(result, Err(CoreError::InvalidHref { .. })));
    }

    #[test]
    fn relation_table_covers_resource_edges() {
        use EntityKind as K;
        assert_eq!(relation_target(K::Resource, Relation::MemberOf), Some(K::Facility));
        assert_eq!(relation_target(K::Resource, Relation::LocatedAt), Some(K::Site));
        assert_eq!(relation_target(K::Resource, Relation::HasIncident), Some(K::Incident));
        assert_eq!(relation_target(K::Resource, Relation::ImpactedBy), Some(K::Event));
        assert_eq!(relation_target(K::Resource, Relation::DependsOn), Some(K::Resource));
        assert_eq!(relation_target(K::Resource, Relation::HasDependent), Some(K::Resource));
        assert_eq!(relation_target(K::Resource, Relation::SelfLink), None);
        assert_eq!(relation_target(K::Capability, Relation::MemberOf), None);
    }

    #[test]
    fn include_param_is_comma_separated() {
        assert_eq!(
            parse_include(Some("hasSite, memberOf,,")),
            vec![String::from("hasSite"), String::from("memberOf")]
        );
        assert!(parse_include(None).is_empty());
    }

    #[test]
    fn empty_bundle_serializes_without_buckets() {
        let json = serde_json::to_value(Included::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
