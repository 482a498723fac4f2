//! The in-memory object index: the system's only data store.
//!
//! [`ObjectIndex`] maps identifier to [`Entity`] across every entity kind.
//! It is populated once at startup and then only read, so a built index is
//! shared behind an `Arc` and never mutated in view of readers. Typed
//! accessors hand out independent copies; the index keeps the canonical
//! value.

use indexmap::IndexMap;
use status_types::{Entity, EntityKind, Named, TypedEntity, extract_id};

use crate::error::CoreError;

/// Identifier-keyed store of every loaded entity.
///
/// Iteration order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct ObjectIndex {
    entries: IndexMap<String, Entity>,
}

impl ObjectIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity, keyed by its id.
    ///
    /// Last write wins. A replaced entity keeps its original position in
    /// iteration order. Returns the previous value, if any.
    pub fn insert(&mut self, entity: impl Into<Entity>) -> Option<Entity> {
        let entity = entity.into();
        self.entries.insert(entity.id().to_owned(), entity)
    }

    /// Number of entities held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow every entity in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }

    /// Copy out the entity with the given id, whatever its kind.
    pub fn get_by_id(&self, id: &str) -> Option<Entity> {
        self.entries.get(id).cloned()
    }

    /// Copy out the entity with the given id if it is a `T`.
    pub fn get<T: TypedEntity>(&self, id: &str) -> Option<T> {
        self.entries.get(id).and_then(Entity::to_typed::<T>)
    }

    /// Resolve an href to a `T`.
    ///
    /// Returns `Ok(None)` both when nothing has the href's id and when the
    /// entity found is of another kind.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHref`] when the href does not end in a
    /// UUID.
    pub fn get_by_href<T: TypedEntity>(&self, href: &str) -> Result<Option<T>, CoreError> {
        let id = href_id(href)?;
        Ok(self.get(id))
    }

    /// Resolve an href to an entity of the given kind.
    ///
    /// The untyped counterpart of [`ObjectIndex::get_by_href`], for callers
    /// that pick the target kind at run time.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHref`] when the href does not end in a
    /// UUID.
    pub fn get_by_href_kind(
        &self,
        href: &str,
        kind: EntityKind,
    ) -> Result<Option<Entity>, CoreError> {
        let id = href_id(href)?;
        Ok(self
            .entries
            .get(id)
            .filter(|entity| entity.kind() == kind)
            .cloned())
    }

    /// Copy out every `T`, in insertion order.
    pub fn find_all<T: TypedEntity>(&self) -> Vec<T> {
        self.entries.values().filter_map(Entity::to_typed::<T>).collect()
    }

    /// Copy out the first `T` in insertion order.
    ///
    /// Used for singletons such as the facility.
    pub fn find_one<T: TypedEntity>(&self) -> Option<T> {
        self.entries.values().find_map(Entity::to_typed::<T>)
    }

    /// Resolve every href in `hrefs` to a `T`, skipping those that do not
    /// resolve.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHref`] on the first href without a
    /// trailing UUID.
    pub fn resolve_all<T: TypedEntity>(&self, hrefs: &[String]) -> Result<Vec<T>, CoreError> {
        let mut out = Vec::with_capacity(hrefs.len());
        for href in hrefs {
            if let Some(value) = self.get_by_href(href)? {
                out.push(value);
            }
        }
        Ok(out)
    }
}

impl FromIterator<Entity> for ObjectIndex {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut index = Self::new();
        for entity in iter {
            index.insert(entity);
        }
        index
    }
}

fn href_id(href: &str) -> Result<&str, CoreError> {
    extract_id(href).ok_or_else(|| CoreError::InvalidHref {
        href: href.to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use status_types::{Facility, NamedObject, Resource, ResourceType, StatusType};

    use super::*;

    const FACILITY_ID: &str = "09a22593-2be8-46f6-ae54-2904b04e13a4";
    const RESOURCE_ID: &str = "29989783-bc70-4cc8-880f-f2176d6cec20";

    fn base(id: &str) -> NamedObject {
        NamedObject::new(id, Utc.with_ymd_and_hms(2025, 7, 24, 2, 32, 36).unwrap())
    }

    fn facility() -> Facility {
        Facility {
            base: base(FACILITY_ID),
            organization_name: Some(String::from("NERSC")),
            support_uri: None,
            site_uris: Vec::new(),
            location_uris: Vec::new(),
            resource_uris: vec![format!("/api/v1/status/resources/{RESOURCE_ID}")],
            event_uris: Vec::new(),
            incident_uris: Vec::new(),
        }
    }

    fn resource(id: &str, name: &str) -> Resource {
        let mut named = base(id);
        named.name = Some(name.to_owned());
        Resource {
            base: named,
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

    fn index() -> ObjectIndex {
        let mut index = ObjectIndex::new();
        index.insert(facility());
        index.insert(resource(RESOURCE_ID, "iris.nersc.gov"));
        index
    }

    #[test]
    fn insert_is_an_upsert_keeping_position() {
        let mut index = index();
        let previous = index.insert(resource(RESOURCE_ID, "renamed"));
        assert!(previous.is_some());
        assert_eq!(index.len(), 2);

        let found: Resource = index.get(RESOURCE_ID).unwrap();
        assert_eq!(found.base.name.as_deref(), Some("renamed"));
        let order: Vec<&str> = index.iter().map(|e| e.id()).collect();
        assert_eq!(order, vec![FACILITY_ID, RESOURCE_ID]);
    }

    #[test]
    fn get_by_id_returns_none_when_absent() {
        assert!(index().get_by_id("bad-id").is_none());
        assert!(index().get_by_id(FACILITY_ID).is_some());
    }

    #[test]
    fn href_resolution_checks_kind() {
        let index = index();
        let href = format!("http://localhost:8081/api/v1/status/resources/{RESOURCE_ID}");

        let res = index.get_by_href::<Resource>(&href).unwrap().unwrap();
        assert_eq!(res.base.id, RESOURCE_ID);
        assert!(index.get_by_href::<Facility>(&href).unwrap().is_none());
        assert!(
            index
                .get_by_href_kind(&href, EntityKind::Facility)
                .unwrap()
                .is_none()
        );
        assert_eq!(
            index
                .get_by_href_kind(&href, EntityKind::Resource)
                .unwrap()
                .map(|e| e.kind()),
            Some(EntityKind::Resource)
        );
    }

    #[test]
    fn malformed_href_is_invalid_argument() {
        let result = index().get_by_href::<Resource>("/api/v1/status/resources/bad-id");
        assert!(matches!(result, Err(CoreError::InvalidHref { .. })));
    }

    #[test]
    fn unknown_uuid_is_not_found_not_error() {
        let href = "/api/v1/status/resources/00000000-0000-4000-8000-000000000000";
        assert!(index().get_by_href::<Resource>(href).unwrap().is_none());
    }

    #[test]
    fn typed_reads_are_independent_copies() {
        let index = index();
        let mut copy: Facility = index.find_one().unwrap();
        copy.base.name = Some(String::from("mutated"));
        let fresh: Facility = index.find_one().unwrap();
        assert!(fresh.base.name.is_none());
    }

    #[test]
    fn find_all_filters_by_kind_in_insertion_order() {
        let mut index = index();
        let second = "4b0e5a3e-8f7e-4d59-9d0a-6a1f0c2b7e11";
        index.insert(resource(second, "www.nersc.gov"));
        let ids: Vec<String> = index
            .find_all::<Resource>()
            .into_iter()
            .map(|r| r.base.id)
            .collect();
        assert_eq!(ids, vec![RESOURCE_ID.to_owned(), second.to_owned()]);
        assert_eq!(index.find_all::<Facility>().len(), 1);
    }

    #[test]
    fn resolve_all_skips_dangling_hrefs() {
        let index = index();
        let hrefs = vec![
            format!("/resources/{RESOURCE_ID}"),
            String::from("/resources/00000000-0000-4000-8000-000000000000"),
            format!("/facility/{FACILITY_ID}"),
        ];
        let resolved: Vec<Resource> = index.resolve_all(&hrefs).unwrap();
        assert_eq!(resolved.len(), 1);
    }
}
