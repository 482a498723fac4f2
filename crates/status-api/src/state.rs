//! Shared application state for the status API.
//!
//! [`AppState`] owns the current [`ObjectIndex`] behind an [`ArcSwap`].
//! Each request takes one snapshot and reads only from it, so a reload
//! that swaps in a new index never shows a request a mix of old and new
//! entities.

use std::sync::Arc;

use arc_swap::ArcSwap;
use status_core::{ObjectIndex, UrlTransform};
use status_core::transform::apply_optional;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    index: ArcSwap<ObjectIndex>,
    transform: Option<UrlTransform>,
    strict_if_modified_since: bool,
}

impl AppState {
    /// Create state serving `index` with no URL transform.
    pub fn new(index: ObjectIndex) -> Self {
        Self {
            index: ArcSwap::from_pointee(index),
            transform: None,
            strict_if_modified_since: false,
        }
    }

    /// Rewrite outbound URIs with `transform`.
    #[must_use]
    pub fn with_transform(mut self, transform: Option<UrlTransform>) -> Self {
        self.transform = transform;
        self
    }

    /// Reject malformed `If-Modified-Since` headers instead of ignoring them.
    #[must_use]
    pub fn with_strict_if_modified_since(mut self, strict: bool) -> Self {
        self.strict_if_modified_since = strict;
        self
    }

    /// Snapshot of the current index.
    pub fn index(&self) -> Arc<ObjectIndex> {
        self.index.load_full()
    }

    /// Atomically replace the index. Requests already holding a snapshot
    /// keep reading the old one.
    pub fn replace_index(&self, index: ObjectIndex) {
        self.index.store(Arc::new(index));
    }

    /// The configured URL transform, if any.
    pub const fn transform(&self) -> Option<&UrlTransform> {
        self.transform.as_ref()
    }

    /// Pass `uri` through the URL transform.
    pub fn rewrite(&self, uri: &str) -> String {
        apply_optional(self.transform.as_ref(), uri)
    }

    /// Whether malformed `If-Modified-Since` headers are rejected.
    pub const fn strict_if_modified_since(&self) -> bool {
        self.strict_if_modified_since
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ObjectIndex::new())
    }
}
