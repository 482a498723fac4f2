//! Startup loading of the JSON dataset into an [`ObjectIndex`].
//!
//! Each collection lives in its own file (see [`DataConfig`]). Every file
//! holds a JSON array of one entity shape; the facility file may instead
//! hold a single object. A missing file contributes nothing. After parsing,
//! every link gets a media type inferred from its href.

use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use status_types::{
    Capability, Entity, Event, Facility, Incident, Location, Named, Project, ProjectAllocation,
    Resource, Site, TypedEntity, UserAllocation,
};
use tracing::{debug, error, info, warn};

use crate::config::DataConfig;
use crate::error::CoreError;
use crate::index::ObjectIndex;

/// A document holding either one value or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(doc: OneOrMany<T>) -> Self {
        match doc {
            OneOrMany::Many(values) => values,
            OneOrMany::One(value) => vec![value],
        }
    }
}

/// Load every configured collection into a fresh index.
///
/// Collections are inserted in a fixed order: facility, sites, locations,
/// resources, incidents, events, capabilities, projects, project
/// allocations, user allocations. A duplicate id replaces the earlier
/// entity and is logged.
///
/// # Errors
///
/// Returns [`CoreError::Io`] when an existing file cannot be read and
/// [`CoreError::Json`] when a file does not parse as its entity type.
pub fn load_dataset(config: &DataConfig) -> Result<ObjectIndex, CoreError> {
    let mut index = ObjectIndex::new();

    load_into::<Facility>(&mut index, &config.path_of(&config.facility))?;
    load_into::<Site>(&mut index, &config.path_of(&config.sites))?;
    load_into::<Location>(&mut index, &config.path_of(&config.locations))?;
    load_into::<Resource>(&mut index, &config.path_of(&config.resources))?;
    load_into::<Incident>(&mut index, &config.path_of(&config.incidents))?;
    load_into::<Event>(&mut index, &config.path_of(&config.events))?;
    load_into::<Capability>(&mut index, &config.path_of(&config.capabilities))?;
    load_into::<Project>(&mut index, &config.path_of(&config.projects))?;
    load_into::<ProjectAllocation>(&mut index, &config.path_of(&config.project_allocations))?;
    load_into::<UserAllocation>(&mut index, &config.path_of(&config.user_allocations))?;

    info!(
        directory = %config.directory.display(),
        entities = index.len(),
        "dataset loaded"
    );
    Ok(index)
}

/// Parse one file and insert its entities.
fn load_into<T>(index: &mut ObjectIndex, path: &Path) -> Result<(), CoreError>
where
    T: TypedEntity + DeserializeOwned,
{
    let Some(items) = read_collection::<T>(path)? else {
        warn!(path = %path.display(), kind = %T::KIND, "dataset file missing, skipping");
        return Ok(());
    };

    debug!(path = %path.display(), kind = %T::KIND, count = items.len(), "parsed dataset file");
    for mut item in items {
        annotate_links(&mut item);
        let id = item.id().to_owned();
        if let Some(previous) = index.insert(item) {
            warn!(
                id = %id,
                previous = %previous.kind(),
                kind = %T::KIND,
                "duplicate id in dataset, later entity wins"
            );
        }
    }
    Ok(())
}

/// Read a collection file, or `None` if it does not exist.
fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, CoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let doc: OneOrMany<T> = serde_json::from_str(&contents).map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(doc.into()))
}

/// Infer a media type for every link of `item`.
///
/// Links whose href names no known collection keep no media type; the
/// entity still loads.
fn annotate_links<T: Named>(item: &mut T) {
    let id = item.id().to_owned();
    for link in &mut item.named_mut().links {
        if !link.annotate_media_type() {
            error!(
                id = %id,
                relation = %link.relation,
                href = %link.href,
                "cannot infer media type for link"
            );
        }
    }
}

/// Build an index directly from entities, annotating links as the file
/// loader does.
pub fn index_from_entities(entities: impl IntoIterator<Item = Entity>) -> ObjectIndex {
    entities
        .into_iter()
        .map(|mut entity| {
            annotate_links(&mut entity);
            entity
        })
        .collect()
}
