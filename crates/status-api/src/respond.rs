//! Conditional responses shared by every entity endpoint.
//!
//! Handlers pick the entities to return; this module applies the common
//! tail: `If-Modified-Since` evaluation, query filtering, embedding, URL
//! rewriting, and the `Last-Modified` / `Content-Location` headers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use axum::http::uri::Authority;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use status_core::conditional::{self, Retrieval, format_http_date};
use status_core::embed::resolve_includes;
use status_core::{Included, ObjectIndex};
use status_types::{RewriteUris, TypedEntity};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Per-request facts every entity endpoint needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    /// Parsed `If-Modified-Since`, if present and valid.
    pub if_modified_since: Option<DateTime<Utc>>,
    /// Scheme and authority the client addressed (`http://host:port`),
    /// empty when the request named neither.
    pub base: String,
    /// Request path and query.
    pub path: String,
}

impl RequestMeta {
    /// Absolute URI of the request, before URL rewriting.
    pub fn location(&self) -> String {
        format!("{}{}", self.base, self.path)
    }

    /// Absolute URI of a server path, before URL rewriting.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// The error for "nothing here".
    pub fn not_found(&self) -> ApiError {
        ApiError::NotFound(self.path.clone())
    }
}

impl FromRequestParts<Arc<AppState>> for RequestMeta {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let if_modified_since = if_modified_since(&parts.headers, state.strict_if_modified_since())?;
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);
        let base = base_url(uri, &parts.headers);
        let path = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned());

        Ok(Self {
            if_modified_since,
            base,
            path,
        })
    }
}

/// Scheme and authority the client addressed.
///
/// HTTP/2 carries both in the request URI; HTTP/1.1 has only the `Host`
/// header, served as plain `http`.
fn base_url(uri: &Uri, headers: &HeaderMap) -> String {
    let scheme = uri.scheme_str().unwrap_or("http");
    let authority = uri.authority().map(Authority::as_str).or_else(|| {
        headers
            .get(header::HOST)
            .and_then(|host| host.to_str().ok())
    });
    authority
        .map(|authority| format!("{scheme}://{authority}"))
        .unwrap_or_default()
}

/// Read `If-Modified-Since`. A malformed value is logged and treated as
/// absent, or rejected when `strict`.
fn if_modified_since(headers: &HeaderMap, strict: bool) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = headers.get(header::IF_MODIFIED_SINCE) else {
        return Ok(None);
    };

    let parsed = raw
        .to_str()
        .map_err(|e| e.to_string())
        .and_then(|value| conditional::parse_http_date(value).map_err(|e| e.to_string()));

    match parsed {
        Ok(since) => Ok(Some(since)),
        Err(reason) => {
            warn!(value = ?raw, %reason, "malformed If-Modified-Since");
            if strict {
                Err(ApiError::InvalidArgument(format!(
                    "malformed If-Modified-Since header: {reason}"
                )))
            } else {
                Ok(None)
            }
        }
    }
}

/// An entity with its embedded relations.
#[derive(Debug, Serialize)]
pub struct Embedded<T> {
    /// The entity itself; its fields appear at the top level.
    #[serde(flatten)]
    pub entity: T,
    /// Related entities requested via `include`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included: Option<Included>,
}

/// Resolve includes, then rewrite every URI for the outside world.
fn prepare<T: TypedEntity>(
    state: &AppState,
    index: &ObjectIndex,
    mut entity: T,
    include: &[String],
) -> Result<Embedded<T>, ApiError> {
    let mut included = resolve_includes(index, &entity, include)?;
    let rewrite = |uri: &str| state.rewrite(uri);
    entity.rewrite_uris(&rewrite);
    if let Some(bundle) = included.as_mut() {
        bundle.rewrite_uris(&rewrite);
    }
    Ok(Embedded { entity, included })
}

fn headers(
    state: &AppState,
    meta: &RequestMeta,
    last_modified: DateTime<Utc>,
) -> Result<[(header::HeaderName, HeaderValue); 2], ApiError> {
    let value = |text: String| {
        HeaderValue::from_str(&text)
            .map_err(|e| ApiError::Internal(format!("cannot encode header {text:?}: {e}")))
    };
    Ok([
        (header::LAST_MODIFIED, value(format_http_date(last_modified))?),
        (header::CONTENT_LOCATION, value(state.rewrite(&meta.location()))?),
    ])
}

fn not_modified(
    state: &AppState,
    meta: &RequestMeta,
    last_modified: DateTime<Utc>,
) -> Result<Response, ApiError> {
    Ok((StatusCode::NOT_MODIFIED, headers(state, meta, last_modified)?).into_response())
}

/// Respond with a single entity, honouring `If-Modified-Since`.
pub fn single<T>(
    state: &AppState,
    index: &ObjectIndex,
    meta: &RequestMeta,
    entity: T,
    include: &[String],
) -> Result<Response, ApiError>
where
    T: TypedEntity + Serialize,
{
    match conditional::retrieve_one(entity, meta.if_modified_since) {
        Retrieval::NotModified { last_modified } => not_modified(state, meta, last_modified),
        Retrieval::Modified {
            value,
            last_modified,
        } => {
            let body = prepare(state, index, value, include)?;
            Ok((headers(state, meta, last_modified)?, Json(body)).into_response())
        }
    }
}

/// Respond with a collection, honouring `If-Modified-Since`.
///
/// `keep` is the query filter; it runs after freshness narrowing.
pub fn collection<T, F>(
    state: &AppState,
    index: &ObjectIndex,
    meta: &RequestMeta,
    items: Vec<T>,
    keep: F,
    include: &[String],
) -> Result<Response, ApiError>
where
    T: TypedEntity + Serialize,
    F: Fn(&T) -> bool,
{
    match conditional::retrieve_collection(items, meta.if_modified_since) {
        Retrieval::NotModified { last_modified } => not_modified(state, meta, last_modified),
        Retrieval::Modified {
            value,
            last_modified,
        } => {
            let body = value
                .into_iter()
                .filter(|item| keep(item))
                .map(|item| prepare(state, index, item, include))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((headers(state, meta, last_modified)?, Json(body)).into_response())
        }
    }
}

/// Look up a `T` by id, or 404 naming the request path.
pub fn find<T: TypedEntity>(index: &ObjectIndex, meta: &RequestMeta, id: &str) -> Result<T, ApiError> {
    index.get(id).ok_or_else(|| meta.not_found())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn valid_header_is_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_MODIFIED_SINCE,
            HeaderValue::from_static("Thu, 24 Jul 2025 02:19:00 GMT"),
        );
        let since = if_modified_since(&headers, true).unwrap().unwrap();
        assert_eq!(format_http_date(since), "Thu, 24 Jul 2025 02:19:00 GMT");
    }

    #[test]
    fn malformed_header_is_ignored_unless_strict() {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_MODIFIED_SINCE, HeaderValue::from_static("yesterday"));
        assert_eq!(if_modified_since(&headers, false).unwrap(), None);
        assert!(matches!(
            if_modified_since(&headers, true),
            Err(ApiError::InvalidArgument(_))
        ));
        assert_eq!(if_modified_since(&HeaderMap::new(), true).unwrap(), None);
    }

    #[test]
    fn location_joins_base_and_path() {
        let meta = RequestMeta {
            if_modified_since: None,
            base: String::from("http://localhost:8081"),
            path: String::from("/api/v1/status/sites?short_name=x"),
        };
        assert_eq!(meta.location(), "http://localhost:8081/api/v1/status/sites?short_name=x");
        assert_eq!(meta.absolute("/api/v1"), "http://localhost:8081/api/v1");
    }

    #[test]
    fn base_prefers_uri_authority() {
        let uri: Uri = "https://status.example.org/api/v1/status/sites".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:8081"));
        assert_eq!(base_url(&uri, &headers), "https://status.example.org");
    }

    #[test]
    fn base_falls_back_to_host_header() {
        let uri: Uri = "/api/v1/status/sites".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:8081"));
        assert_eq!(base_url(&uri, &headers), "http://localhost:8081");
        assert_eq!(base_url(&uri, &HeaderMap::new()), "");
    }
}
