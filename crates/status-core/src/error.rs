//! Error types for the `status-core` crate.
//!
//! Lookups that find nothing return `None`; only the conditions below are
//! errors. [`CoreError::InvalidHref`] in particular signals corrupt
//! reference data, not an empty result.

use std::path::PathBuf;

/// Errors raised by the object index, dataset loader, and helpers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An href does not end in an extractable UUID.
    #[error("href has no trailing UUID: {href}")]
    InvalidHref {
        /// The offending href.
        href: String,
    },

    /// A date string is not a valid HTTP (RFC 1123) or RFC 3339 date.
    #[error("invalid date {value:?}: {reason}")]
    InvalidDate {
        /// The rejected input.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A URL transform specification is malformed.
    #[error("invalid URL transform {spec:?}: {reason}")]
    InvalidTransform {
        /// The rejected specification.
        spec: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A query filter value cannot be interpreted.
    #[error("invalid value for filter {name:?}: {reason}")]
    InvalidFilter {
        /// The query parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A dataset file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A dataset file is not valid JSON for its entity type.
    #[error("failed to parse {path}: {source}")]
    Json {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}
