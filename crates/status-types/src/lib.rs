//! Shared type definitions for the facility status API.
//!
//! This crate is the single source of truth for the records the status
//! server loads and serves.
//!
//! # Modules
//!
//! - [`enums`] -- Wire-named enumerations (resource type, status, incident type, ...)
//! - [`link`] -- Typed hyperlinks, the relation vocabulary, and media types
//! - [`structs`] -- Entity records and the URI-rewrite traversal
//! - [`entity`] -- The [`Entity`] sum type and uniform accessors

#[macro_use]
mod macros;

pub mod entity;
pub mod enums;
pub mod link;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use entity::{Entity, EntityKind, Named, TypedEntity};
pub use enums::{
    AllocationUnit, IncidentType, ResolutionType, ResourceType, StatusType, UnknownVariant,
};
pub use link::{Link, Relation, extract_id, infer_media_type, media_type};
pub use structs::{
    AllocationEntry, Capability, Event, Facility, Incident, Location, NamedObject, Project,
    ProjectAllocation, Resource, RewriteUris, Site, UserAllocation,
};
