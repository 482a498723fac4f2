//! Typed hyperlinks between entities.
//!
//! A [`Link`] connects one entity to another through a named
//! [`Relation`]. The `href` may be absolute, root-relative, or a bare path;
//! anything that is expected to resolve to an entity ends in a hyphenated
//! UUID, which [`extract_id`] pulls back out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::EntityKind;

/// Canonical media types for every entity kind.
pub mod media_type {
    /// Media type of a facility document.
    pub const FACILITY: &str = "application/vnd.status.facility+json";
    /// Media type of a site document.
    pub const SITE: &str = "application/vnd.status.site+json";
    /// Media type of a location document.
    pub const LOCATION: &str = "application/vnd.status.location+json";
    /// Media type of a resource document.
    pub const RESOURCE: &str = "application/vnd.status.resource+json";
    /// Media type of an incident document.
    pub const INCIDENT: &str = "application/vnd.status.incident+json";
    /// Media type of an event document.
    pub const EVENT: &str = "application/vnd.status.event+json";
    /// Media type of a capability document.
    pub const CAPABILITY: &str = "application/vnd.status.capability+json";
    /// Media type of a project document.
    pub const PROJECT: &str = "application/vnd.status.project+json";
    /// Media type of a project allocation document.
    pub const PROJECT_ALLOCATION: &str = "application/vnd.status.project_allocation+json";
    /// Media type of a user allocation document.
    pub const USER_ALLOCATION: &str = "application/vnd.status.user_allocation+json";
}

/// Collection path segments checked, in order, when inferring a link's
/// media type.
const MEDIA_TYPE_HINTS: &[(&str, EntityKind)] = &[
    ("resources", EntityKind::Resource),
    ("sites", EntityKind::Site),
    ("locations", EntityKind::Location),
    ("events", EntityKind::Event),
    ("incidents", EntityKind::Incident),
    ("facility", EntityKind::Facility),
    ("capabilities", EntityKind::Capability),
    ("project_allocations", EntityKind::ProjectAllocation),
    ("user_allocations", EntityKind::UserAllocation),
    ("projects", EntityKind::Project),
];

/// Length of a hyphenated UUID (`8-4-4-4-12`).
const UUID_LEN: usize = 36;

define_enum! {
    /// The named edge types of the entity graph.
    ///
    /// Links carry their relation as a plain string so unknown relations
    /// survive a load; this enum is the vocabulary the server understands.
    Relation {
        /// The entity's own canonical location.
        SelfLink => "self",
        /// The site hosting a facility.
        HostedAt => "hostedAt",
        /// Where an entity physically sits.
        LocatedAt => "locatedAt",
        /// A resource provided by the source.
        HasResource => "hasResource",
        /// An event associated with the source.
        HasEvent => "hasEvent",
        /// An incident associated with the source.
        HasIncident => "hasIncident",
        /// A location associated with the source.
        HasLocation => "hasLocation",
        /// A resource the source needs in order to operate.
        DependsOn => "dependsOn",
        /// A resource that needs the source in order to operate.
        HasDependent => "hasDependent",
        /// A resource affected by the source.
        Impacts => "impacts",
        /// An event affecting the source.
        ImpactedBy => "impactedBy",
        /// The incident that produced an event.
        GeneratedBy => "generatedBy",
        /// The facility the source belongs to.
        MemberOf => "memberOf",
        /// A site associated with the source.
        HasSite => "hasSite",
    }
}

/// A typed hyperlink from one entity to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Relation name, normally one of [`Relation`]'s wire names.
    #[serde(alias = "rel")]
    pub relation: String,
    /// Target of the link.
    pub href: String,
    /// Media type of the target, inferred after load.
    #[serde(default, alias = "media-type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Link {
    /// Create a link with no media type.
    pub fn new(relation: Relation, href: impl Into<String>) -> Self {
        Self {
            relation: relation.as_str().to_owned(),
            href: href.into(),
            media_type: None,
        }
    }

    /// Whether this link carries the given relation.
    pub fn is(&self, relation: Relation) -> bool {
        self.relation == relation.as_str()
    }

    /// Set [`Link::media_type`] from the href.
    ///
    /// Returns `false` (and leaves the media type empty) when the href
    /// matches no known collection.
    pub fn annotate_media_type(&mut self) -> bool {
        match infer_media_type(&self.href) {
            Some(media) => {
                self.media_type = Some(media.to_owned());
                true
            }
            None => {
                self.media_type = None;
                false
            }
        }
    }
}

/// Extract the trailing hyphenated UUID from an href.
///
/// Trailing slashes, query strings, and fragments are ignored. Returns
/// `None` when the last path segment is not shaped `8-4-4-4-12` hex.
pub fn extract_id(href: &str) -> Option<&str> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    if segment.len() == UUID_LEN && Uuid::try_parse(segment).is_ok() {
        Some(segment)
    } else {
        None
    }
}

/// Infer the media type of an href from the collection named in its path.
///
/// Whole path segments are compared, so `project_allocations` never
/// matches `locations`.
pub fn infer_media_type(href: &str) -> Option<&'static str> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    MEDIA_TYPE_HINTS
        .iter()
        .find(|(collection, _)| path.split('/').any(|segment| segment == *collection))
        .map(|(_, kind)| kind.media_type())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ID: &str = "29989783-bc70-4cc8-880f-f2176d6cec20";

    #[test]
    fn extracts_trailing_uuid_from_any_href_shape() {
        let absolute = format!("http://localhost:8081/api/v1/status/resources/{ID}");
        let relative = format!("/api/v1/status/resources/{ID}/");
        let with_query = format!("/api/v1/status/resources/{ID}?include=hasSite");
        assert_eq!(extract_id(&absolute), Some(ID));
        assert_eq!(extract_id(&relative), Some(ID));
        assert_eq!(extract_id(&with_query), Some(ID));
        assert_eq!(extract_id(ID), Some(ID));
    }

    #[test]
    fn rejects_hrefs_without_a_uuid_tail() {
        assert_eq!(extract_id("/api/v1/status/facility"), None);
        assert_eq!(extract_id("/api/v1/status/resources/bad-id"), None);
        // Simple (unhyphenated) form is not accepted.
        assert_eq!(
            extract_id("/api/v1/status/resources/29989783bc704cc8880ff2176d6cec20"),
            None
        );
        assert_eq!(extract_id(""), None);
    }

    #[test]
    fn infers_media_type_from_collection_segment() {
        assert_eq!(
            infer_media_type(&format!("/api/v1/status/sites/{ID}")),
            Some(media_type::SITE)
        );
        assert_eq!(
            infer_media_type(&format!("/api/v1/account/project_allocations/{ID}")),
            Some(media_type::PROJECT_ALLOCATION)
        );
        assert_eq!(
            infer_media_type(&format!("/api/v1/account/projects/{ID}")),
            Some(media_type::PROJECT)
        );
        assert_eq!(
            infer_media_type(&format!("/api/v1/account/user_allocations/{ID}")),
            Some(media_type::USER_ALLOCATION)
        );
        assert_eq!(
            infer_media_type("/api/v1/status/facility"),
            Some(EntityKind::Facility.media_type())
        );
        assert_eq!(infer_media_type("https://www.nersc.gov/"), None);
        assert_eq!(infer_media_type("https://example.org/all-resources-here"), None);
    }

    #[test]
    fn annotate_leaves_unknown_links_empty() {
        let mut link = Link::new(Relation::HasResource, format!("/resources/{ID}"));
        assert!(link.annotate_media_type());
        assert_eq!(link.media_type.as_deref(), Some(media_type::RESOURCE));

        let mut other = Link::new(Relation::LocatedAt, "https://maps.example.org/berkeley");
        assert!(!other.annotate_media_type());
        assert!(other.media_type.is_none());
    }

    #[test]
    fn relation_vocabulary_parses_known_names_only() {
        let link = Link::new(Relation::HostedAt, "/x");
        assert!(link.is(Relation::HostedAt));
        assert!(!link.is(Relation::LocatedAt));
        assert_eq!("self".parse::<Relation>(), Ok(Relation::SelfLink));
        assert!("hasEventLog".parse::<Relation>().is_err());
    }

    #[test]
    fn deserializes_rel_and_media_type_aliases() {
        let link: Link = serde_json::from_str(
            r#"{"rel": "hasSite", "href": "/sites/x", "media-type": "text/plain"}"#,
        )
        .unwrap();
        assert_eq!(link.relation, "hasSite");
        assert_eq!(link.media_type.as_deref(), Some("text/plain"));
    }
}
