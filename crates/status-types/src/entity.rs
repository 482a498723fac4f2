//! The closed set of entity kinds and uniform access to their shared fields.
//!
//! [`Entity`] is a sum type over every record the index can hold.
//! Polymorphic lookups check the variant discriminant through
//! [`TypedEntity::from_entity`]; there is no dynamic casting.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::link::{Link, media_type};
use crate::structs::{
    Capability, Event, Facility, Incident, Location, NamedObject, Project, ProjectAllocation,
    Resource, RewriteUris, Site, UserAllocation,
};

define_enum! {
    /// Discriminant of an [`Entity`].
    EntityKind {
        /// [`Facility`].
        Facility => "facility",
        /// [`Site`].
        Site => "site",
        /// [`Location`].
        Location => "location",
        /// [`Resource`].
        Resource => "resource",
        /// [`Incident`].
        Incident => "incident",
        /// [`Event`].
        Event => "event",
        /// [`Capability`].
        Capability => "capability",
        /// [`Project`].
        Project => "project",
        /// [`ProjectAllocation`].
        ProjectAllocation => "project_allocation",
        /// [`UserAllocation`].
        UserAllocation => "user_allocation",
    }
}

impl EntityKind {
    /// Canonical media type for documents of this kind.
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Facility => media_type::FACILITY,
            Self::Site => media_type::SITE,
            Self::Location => media_type::LOCATION,
            Self::Resource => media_type::RESOURCE,
            Self::Incident => media_type::INCIDENT,
            Self::Event => media_type::EVENT,
            Self::Capability => media_type::CAPABILITY,
            Self::Project => media_type::PROJECT,
            Self::ProjectAllocation => media_type::PROJECT_ALLOCATION,
            Self::UserAllocation => media_type::USER_ALLOCATION,
        }
    }
}

/// Uniform access to the [`NamedObject`] every entity carries.
pub trait Named {
    /// The shared identity fields.
    fn named(&self) -> &NamedObject;

    /// Mutable access to the shared identity fields.
    fn named_mut(&mut self) -> &mut NamedObject;

    /// The entity's identifier.
    fn id(&self) -> &str {
        &self.named().id
    }

    /// When the entity last changed.
    fn last_modified(&self) -> DateTime<Utc> {
        self.named().last_modified
    }

    /// Outbound links.
    fn links(&self) -> &[Link] {
        &self.named().links
    }

    /// Short display name, if any.
    fn short_name(&self) -> Option<&str> {
        self.named().short_name.as_deref()
    }
}

/// An entity struct that is one variant of [`Entity`].
pub trait TypedEntity: Named + RewriteUris + Clone + Into<Entity> {
    /// The variant this type occupies.
    const KIND: EntityKind;

    /// Borrow the inner value if `entity` is this variant.
    fn from_entity(entity: &Entity) -> Option<&Self>;
}

/// Any entity held by the object index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    /// A facility.
    Facility(Facility),
    /// A site.
    Site(Site),
    /// A location.
    Location(Location),
    /// A resource.
    Resource(Resource),
    /// An incident.
    Incident(Incident),
    /// An event.
    Event(Event),
    /// A capability.
    Capability(Capability),
    /// A project.
    Project(Project),
    /// A project allocation.
    ProjectAllocation(ProjectAllocation),
    /// A user allocation.
    UserAllocation(UserAllocation),
}

/// Dispatches an expression over every [`Entity`] variant.
macro_rules! each_variant {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Entity::Facility($inner) => $body,
            Entity::Site($inner) => $body,
            Entity::Location($inner) => $body,
            Entity::Resource($inner) => $body,
            Entity::Incident($inner) => $body,
            Entity::Event($inner) => $body,
            Entity::Capability($inner) => $body,
            Entity::Project($inner) => $body,
            Entity::ProjectAllocation($inner) => $body,
            Entity::UserAllocation($inner) => $body,
        }
    };
}

impl Entity {
    /// The variant discriminant.
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Facility(_) => EntityKind::Facility,
            Self::Site(_) => EntityKind::Site,
            Self::Location(_) => EntityKind::Location,
            Self::Resource(_) => EntityKind::Resource,
            Self::Incident(_) => EntityKind::Incident,
            Self::Event(_) => EntityKind::Event,
            Self::Capability(_) => EntityKind::Capability,
            Self::Project(_) => EntityKind::Project,
            Self::ProjectAllocation(_) => EntityKind::ProjectAllocation,
            Self::UserAllocation(_) => EntityKind::UserAllocation,
        }
    }

    /// Clone out the inner value if this entity is a `T`.
    pub fn to_typed<T: TypedEntity>(&self) -> Option<T> {
        T::from_entity(self).cloned()
    }
}

impl Named for Entity {
    fn named(&self) -> &NamedObject {
        each_variant!(self, inner => &inner.base)
    }

    fn named_mut(&mut self) -> &mut NamedObject {
        each_variant!(self, inner => &mut inner.base)
    }
}

impl RewriteUris for Entity {
    fn rewrite_uris<F: Fn(&str) -> String>(&mut self, rewrite: &F) {
        each_variant!(self, inner => inner.rewrite_uris(rewrite));
    }
}

/// Implements [`Named`], [`TypedEntity`], and `From<T> for Entity`.
macro_rules! typed_entity {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl Named for $ty {
                fn named(&self) -> &NamedObject {
                    &self.base
                }

                fn named_mut(&mut self) -> &mut NamedObject {
                    &mut self.base
                }
            }

            impl From<$ty> for Entity {
                fn from(value: $ty) -> Self {
                    Self::$ty(value)
                }
            }

            impl TypedEntity for $ty {
                const KIND: EntityKind = EntityKind::$ty;

                fn from_entity(entity: &Entity) -> Option<&Self> {
                    match entity {
                        Entity::$ty(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )+
    };
}

typed_entity!(
    Facility,
    Site,
    Location,
    Resource,
    Incident,
    Event,
    Capability,
    Project,
    ProjectAllocation,
    UserAllocation,
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::enums::{ResourceType, StatusType};

    fn resource() -> Resource {
        Resource {
            base: NamedObject::new(
                "29989783-bc70-4cc8-880f-f2176d6cec20",
                Utc.with_ymd_and_hms(2025, 7, 24, 2, 32, 36).unwrap(),
            ),
            resource_type: ResourceType::Website,
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

    #[test]
    fn discriminant_gates_typed_access() {
        let entity = Entity::from(resource());
        assert_eq!(entity.kind(), EntityKind::Resource);
        assert!(Resource::from_entity(&entity).is_some());
        assert!(Facility::from_entity(&entity).is_none());
        assert!(entity.to_typed::<Site>().is_none());
        assert_eq!(entity.id(), "29989783-bc70-4cc8-880f-f2176d6cec20");
    }

    #[test]
    fn untagged_serialization_matches_inner_value() {
        let res = resource();
        let direct = serde_json::to_value(&res).unwrap();
        let wrapped = serde_json::to_value(Entity::from(res)).unwrap();
        assert_eq!(direct, wrapped);
    }

    #[test]
    fn kinds_have_distinct_media_types() {
        let mut seen: Vec<&str> = EntityKind::ALL.iter().map(|k| k.media_type()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), EntityKind::ALL.len());
    }
}
