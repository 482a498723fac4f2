//! Configuration loading and typed config structures for the status server.
//!
//! The canonical configuration lives in `status-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure and a
//! loader that reads the file and applies environment overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `status-config.yaml`. Every field has a
/// default, so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Dataset file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Outbound URL rewriting.
    #[serde(default)]
    pub urls: UrlConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StatusConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `STATUS_HOST` overrides `server.host`
    /// - `STATUS_PORT` overrides `server.port`
    /// - `STATUS_DATA_DIR` overrides `data.directory`
    /// - `STATUS_URL_TRANSFORM` overrides `urls.transform`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STATUS_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("STATUS_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!(value = %val, error = %e, "ignoring invalid STATUS_PORT"),
            }
        }
        if let Ok(val) = std::env::var("STATUS_DATA_DIR") {
            self.data.directory = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("STATUS_URL_TRANSFORM") {
            self.urls.transform = Some(val);
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Reject malformed `If-Modified-Since` headers with 400 instead of
    /// treating them as absent.
    #[serde(default)]
    pub strict_if_modified_since: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            strict_if_modified_since: false,
        }
    }
}

/// Where the dataset files live.
///
/// Each file name is resolved relative to [`DataConfig::directory`]. A
/// file that does not exist contributes no entities.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    /// Directory holding the JSON files.
    #[serde(default = "default_data_directory")]
    pub directory: PathBuf,

    /// Facility document (single object or one-element array).
    #[serde(default = "default_facility_file")]
    pub facility: String,

    /// Site array.
    #[serde(default = "default_sites_file")]
    pub sites: String,

    /// Location array.
    #[serde(default = "default_locations_file")]
    pub locations: String,

    /// Resource array.
    #[serde(default = "default_resources_file")]
    pub resources: String,

    /// Incident array.
    #[serde(default = "default_incidents_file")]
    pub incidents: String,

    /// Event array.
    #[serde(default = "default_events_file")]
    pub events: String,

    /// Capability array.
    #[serde(default = "default_capabilities_file")]
    pub capabilities: String,

    /// Project array.
    #[serde(default = "default_projects_file")]
    pub projects: String,

    /// Project allocation array.
    #[serde(default = "default_project_allocations_file")]
    pub project_allocations: String,

    /// User allocation array.
    #[serde(default = "default_user_allocations_file")]
    pub user_allocations: String,
}

impl DataConfig {
    /// Configuration reading the default file names from `directory`.
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Resolve a configured file name against the data directory.
    pub fn path_of(&self, file: &str) -> PathBuf {
        self.directory.join(file)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: default_data_directory(),
            facility: default_facility_file(),
            sites: default_sites_file(),
            locations: default_locations_file(),
            resources: default_resources_file(),
            incidents: default_incidents_file(),
            events: default_events_file(),
            capabilities: default_capabilities_file(),
            projects: default_projects_file(),
            project_allocations: default_project_allocations_file(),
            user_allocations: default_user_allocations_file(),
        }
    }
}

/// Outbound URL rewriting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UrlConfig {
    /// Transform of the form `(<fromURI>|<toURI>)`.
    #[serde(default)]
    pub transform: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8081
}

fn default_data_directory() -> PathBuf {
    PathBuf::from("data")
}

fn default_facility_file() -> String {
    String::from("facility.json")
}

fn default_sites_file() -> String {
    String::from("sites.json")
}

fn default_locations_file() -> String {
    String::from("locations.json")
}

fn default_resources_file() -> String {
    String::from("resources.json")
}

fn default_incidents_file() -> String {
    String::from("incidents.json")
}

fn default_events_file() -> String {
    String::from("events.json")
}

fn default_capabilities_file() -> String {
    String::from("capabilities.json")
}

fn default_projects_file() -> String {
    String::from("projects.json")
}

fn default_project_allocations_file() -> String {
    String::from("project_allocations.json")
}

fn default_user_allocations_file() -> String {
    String::from("user_allocations.json")
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = StatusConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8081);
        assert!(!config.server.strict_if_modified_since);
        assert_eq!(config.data.directory, PathBuf::from("data"));
        assert_eq!(config.data.resources, "resources.json");
        assert!(config.urls.transform.is_none());
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9000
  strict_if_modified_since: true

data:
  directory: "/srv/status"
  facility: "nersc.json"
  resources: "systems.json"

urls:
  transform: "(http://localhost:8081/|https://status.example.org/)"

logging:
  level: "debug"
  format: "json"
"#;
        let config = StatusConfig::parse_without_env(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert!(config.server.strict_if_modified_since);
        assert_eq!(config.data.path_of(&config.data.facility), PathBuf::from("/srv/status/nersc.json"));
        assert_eq!(config.data.resources, "systems.json");
        // Unspecified file names keep their defaults.
        assert_eq!(config.data.events, "events.json");
        assert_eq!(
            config.urls.transform.as_deref(),
            Some("(http://localhost:8081/|https://status.example.org/)")
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_partial_yaml_uses_defaults() {
        let config = StatusConfig::parse_without_env("server:\n  port: 8100\n").unwrap();
        assert_eq!(config.server.port, 8100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.data, DataConfig::default());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(StatusConfig::parse_without_env("").unwrap(), StatusConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = StatusConfig::parse_without_env("server: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn in_directory_keeps_default_file_names() {
        let data = DataConfig::in_directory("/tmp/fixture");
        assert_eq!(data.path_of(&data.sites), PathBuf::from("/tmp/fixture/sites.json"));
    }
}
