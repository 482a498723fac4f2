//! `If-Modified-Since` / `Last-Modified` semantics.
//!
//! HTTP dates carry whole seconds, so every comparison here truncates
//! entity timestamps to the second. Equality between the client's date and
//! an entity's timestamp always means "not modified".

use chrono::{DateTime, Utc};
use status_types::Named;

use crate::error::CoreError;

/// IMF-fixdate, the preferred HTTP date format (RFC 9110 section 5.6.7).
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Outcome of a conditional read.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval<T> {
    /// Nothing changed since the client's copy; send no body.
    NotModified {
        /// Value for the `Last-Modified` header.
        last_modified: DateTime<Utc>,
    },
    /// Send `value`.
    Modified {
        /// The (possibly narrowed) payload.
        value: T,
        /// Value for the `Last-Modified` header.
        last_modified: DateTime<Utc>,
    },
}

impl<T> Retrieval<T> {
    /// Value for the `Last-Modified` header, in either outcome.
    pub fn last_modified(&self) -> DateTime<Utc> {
        match self {
            Self::NotModified { last_modified } | Self::Modified { last_modified, .. } => {
                *last_modified
            }
        }
    }
}

/// Parse an `If-Modified-Since` value (RFC 1123 / RFC 2822).
///
/// # Errors
///
/// Returns [`CoreError::InvalidDate`] if the value is not a valid date.
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc2822(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::InvalidDate {
            value: value.to_owned(),
            reason: e.to_string(),
        })
}

/// Format a timestamp for the `Last-Modified` header.
pub fn format_http_date(at: DateTime<Utc>) -> String {
    at.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an RFC 3339 instant, as used by time-window query parameters.
///
/// # Errors
///
/// Returns [`CoreError::InvalidDate`] if the value is not RFC 3339.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::InvalidDate {
            value: value.to_owned(),
            reason: e.to_string(),
        })
}

/// Whether a timestamp is no newer than the client's date, at HTTP
/// resolution.
fn unchanged_since(timestamp: DateTime<Utc>, since: DateTime<Utc>) -> bool {
    timestamp.timestamp() <= since.timestamp()
}

/// The most recent `last_modified` over `items`, or now when empty.
///
/// An empty collection is always treated as freshly modified.
pub fn latest_modified<T: Named>(items: &[T]) -> DateTime<Utc> {
    items
        .iter()
        .map(Named::last_modified)
        .max()
        .unwrap_or_else(Utc::now)
}

/// Decide a conditional read of a single entity.
pub fn retrieve_one<T: Named>(
    item: T,
    if_modified_since: Option<DateTime<Utc>>,
) -> Retrieval<T> {
    let last_modified = item.last_modified();
    match if_modified_since {
        Some(since) if unchanged_since(last_modified, since) => {
            Retrieval::NotModified { last_modified }
        }
        _ => Retrieval::Modified {
            value: item,
            last_modified,
        },
    }
}

/// Decide a conditional read of a collection.
///
/// The whole collection is "not modified" when its latest member is no
/// newer than `if_modified_since`. An empty collection is never "not
/// modified", whatever the date. Otherwise, with a date present, only
/// members modified strictly after it are kept. Further query filters are
/// the caller's to apply, after this narrowing.
pub fn retrieve_collection<T: Named>(
    items: Vec<T>,
    if_modified_since: Option<DateTime<Utc>>,
) -> Retrieval<Vec<T>> {
    let last_modified = latest_modified(&items);
    let Some(since) = if_modified_since.filter(|_| !items.is_empty()) else {
        return Retrieval::Modified {
            value: items,
            last_modified,
        };
    };

    if unchanged_since(last_modified, since) {
        return Retrieval::NotModified { last_modified };
    }

    let value = items
        .into_iter()
        .filter(|item| !unchanged_since(item.last_modified(), since))
        .collect();
    Retrieval::Modified {
        value,
        last_modified,
    }
}
