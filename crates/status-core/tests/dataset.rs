//! Integration tests over the repository's sample dataset in `data/`.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use std::path::PathBuf;

use status_core::config::DataConfig;
use status_core::embed::resolve_includes;
use status_core::loader::load_dataset;
use status_core::ObjectIndex;
use status_types::{
    Entity, EntityKind, Event, Facility, Incident, Named, Relation, Resource, Site, extract_id,
};

const FACILITY_ID: &str = "09a22593-2be8-46f6-ae54-2904b04e13a4";
const IRIS_ID: &str = "29989783-bc70-4cc8-880f-f2176d6cec20";

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn load() -> ObjectIndex {
    load_dataset(&DataConfig::in_directory(data_dir())).unwrap()
}

#[test]
fn sample_dataset_loads_every_collection() {
    let index = load();
    assert_eq!(index.find_all::<Facility>().len(), 1);
    assert_eq!(index.find_all::<Site>().len(), 1);
    assert_eq!(index.find_all::<Resource>().len(), 20);
    assert_eq!(index.find_all::<Incident>().len(), 2);
    assert_eq!(index.find_all::<Event>().len(), 5);
    assert!(index.iter().any(|e| e.kind() == EntityKind::UserAllocation));
}

#[test]
fn facility_links_break_down_by_relation() {
    let facility: Facility = load().find_one().unwrap();
    assert_eq!(facility.base.id, FACILITY_ID);

    let links = &facility.base.links;
    let count = |relation: Relation| links.iter().filter(|l| l.is(relation)).count();
    assert_eq!(links.len(), 30);
    assert_eq!(count(Relation::SelfLink), 1);
    assert_eq!(count(Relation::HasResource), 20);
    assert_eq!(count(Relation::HasEvent), 5);
    assert_eq!(count(Relation::HasIncident), 2);
    assert_eq!(count(Relation::HostedAt), 1);
    assert_eq!(count(Relation::HasLocation), 1);
}

#[test]
fn iris_is_a_website() {
    let iris: Resource = load().get(IRIS_ID).unwrap();
    assert_eq!(iris.base.name.as_deref(), Some("iris.nersc.gov"));
    assert_eq!(iris.resource_type.as_str(), "website");
}

#[test]
fn every_self_link_round_trips_through_the_index() {
    let index = load();
    let mut checked = 0;
    for entity in index.iter() {
        for link in entity.links().iter().filter(|l| l.is(Relation::SelfLink)) {
            let resolved = index
                .get_by_href_kind(&link.href, entity.kind())
                .unwrap()
                .unwrap();
            assert_eq!(Some(resolved.id()), extract_id(&link.href));
            checked += 1;
        }
    }
    assert_eq!(checked, index.len());
}

#[test]
fn resource_href_never_resolves_as_facility() {
    let index = load();
    let href = format!("http://localhost:8081/api/v1/status/resources/{IRIS_ID}");
    assert!(index.get_by_href::<Facility>(&href).unwrap().is_none());
    assert!(index.get_by_href::<Resource>(&href).unwrap().is_some());
}

#[test]
fn every_link_in_the_sample_has_a_media_type() {
    let index = load();
    for entity in index.iter() {
        for link in entity.links() {
            assert!(
                link.media_type.is_some(),
                "{} link {} has no media type",
                entity.id(),
                link.href
            );
        }
    }
}

#[test]
fn facility_includes_its_site_and_incidents() {
    let index = load();
    let facility: Facility = index.find_one().unwrap();
    let requested = vec![String::from("hostedAt"), String::from("hasIncident")];
    let included = resolve_includes(&index, &facility, &requested).unwrap().unwrap();
    assert_eq!(included.sites.len(), 1);
    assert_eq!(included.incidents.len(), 2);
    assert!(included.resources.is_empty());
}

#[test]
fn index_holds_one_entity_per_id() {
    let index = load();
    let entities: Vec<Entity> = index.iter().cloned().collect();
    let rebuilt: ObjectIndex = entities.into_iter().collect();
    assert_eq!(rebuilt.len(), index.len());
}
