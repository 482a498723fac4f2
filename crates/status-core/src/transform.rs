//! Outbound URL rewriting for reverse-proxied deployments.
//!
//! Stored URIs often name the internal host (`http://localhost:8081/...`).
//! A [`UrlTransform`] swaps that prefix for the externally visible one
//! before a document leaves the server. It is configured with a string of
//! the form `(<fromURI>|<toURI>)`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Accepted URI shape for either side of a transform.
// The pattern is a literal; compiling it cannot fail.
#[allow(clippy::unwrap_used)]
static URI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?|ftp|file)://[-a-zA-Z0-9+&@#/%?=~_!:,.;]*[-a-zA-Z0-9+&@#/%=~_]$").unwrap()
});

/// Literal root path, accepted on either side of a transform.
const ROOT: &str = "/";

/// A parsed `(<fromURI>|<toURI>)` prefix substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTransform {
    from: String,
    to: String,
}

impl UrlTransform {
    /// Build a transform from explicit prefixes, validating both.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransform`] if either side is neither an
    /// `http`, `https`, `ftp`, or `file` URI nor the root path `/`.
    pub fn new(from: &str, to: &str) -> Result<Self, CoreError> {
        let spec = format!("({from}|{to})");
        Ok(Self {
            from: validate(&spec, from)?,
            to: validate(&spec, to)?,
        })
    }

    /// Parse an optional transform specification.
    ///
    /// `None` and blank strings mean "no transform".
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransform`] if the delimiters are
    /// missing or either side fails validation.
    pub fn parse(spec: Option<&str>) -> Result<Option<Self>, CoreError> {
        let Some(spec) = spec.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        let invalid = |reason: &str| CoreError::InvalidTransform {
            spec: spec.to_owned(),
            reason: reason.to_owned(),
        };

        let inner = spec
            .strip_prefix('(')
            .ok_or_else(|| invalid("missing opening '('"))?;
        let (from, rest) = inner
            .split_once('|')
            .ok_or_else(|| invalid("missing '|' separator"))?;
        let to = rest
            .rsplit_once(')')
            .map(|(to, _)| to)
            .ok_or_else(|| invalid("missing closing ')'"))?;

        Ok(Some(Self {
            from: validate(spec, from)?,
            to: validate(spec, to)?,
        }))
    }

    /// The prefix being replaced.
    pub fn from_uri(&self) -> &str {
        &self.from
    }

    /// The replacement prefix.
    pub fn to_uri(&self) -> &str {
        &self.to
    }

    /// Rewrite `uri` if it starts with the `from` prefix; otherwise return
    /// it unchanged.
    pub fn apply(&self, uri: &str) -> String {
        match uri.strip_prefix(self.from.as_str()) {
            Some(rest) => format!("{}{rest}", self.to),
            None => uri.to_owned(),
        }
    }
}

/// Apply an optional transform. `None` is the identity.
pub fn apply_optional(transform: Option<&UrlTransform>, uri: &str) -> String {
    transform.map_or_else(|| uri.to_owned(), |t| t.apply(uri))
}

fn validate(spec: &str, candidate: &str) -> Result<String, CoreError> {
    let candidate = candidate.trim();
    if candidate == ROOT || URI_PATTERN.is_match(candidate) {
        Ok(candidate.to_owned())
    } else {
        Err(CoreError::InvalidTransform {
            spec: spec.to_owned(),
            reason: format!("{candidate:?} is not a URI or '/'"),
        })
    }
}
