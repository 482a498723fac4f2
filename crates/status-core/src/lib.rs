//! Object index, dataset loading, and read policies for the facility status API.
//!
//! This crate owns everything between the JSON files on disk and the HTTP
//! layer: the identifier-keyed index, the loader that fills it, and the
//! rules applied to every read (URL rewriting, conditional retrieval,
//! embedding, filtering).
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `status-config.yaml` into
//!   strongly-typed structs.
//! - [`conditional`] -- `If-Modified-Since` / `Last-Modified` decisions for
//!   single entities and collections.
//! - [`embed`] -- Relationship resolver for `include=` requests.
//! - [`error`] -- [`CoreError`].
//! - [`filter`] -- Query-string filters for collection endpoints.
//! - [`index`] -- The [`ObjectIndex`] store.
//! - [`loader`] -- JSON dataset loading with link media-type inference.
//! - [`transform`] -- `(<fromURI>|<toURI>)` outbound URL rewriting.
//!
//! [`CoreError`]: error::CoreError
//! [`ObjectIndex`]: index::ObjectIndex

pub mod conditional;
pub mod config;
pub mod embed;
pub mod error;
pub mod filter;
pub mod index;
pub mod loader;
pub mod transform;

pub use conditional::Retrieval;
pub use embed::Included;
pub use error::CoreError;
pub use index::ObjectIndex;
pub use transform::UrlTransform;
