//! Status server binary for the facility status API.
//!
//! Wires configuration, logging, the dataset, and the HTTP surface
//! together, then serves until Ctrl-C or `SIGTERM`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$STATUS_CONFIG` or `status-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the dataset into an object index
//! 4. Parse the outbound URL transform
//! 5. Install the `SIGHUP` reload handler (unix only)
//! 6. Serve HTTP

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use status_api::{AppState, start_server};
use status_core::UrlTransform;
use status_core::config::{LogFormat, LoggingConfig, StatusConfig};
use status_core::loader::load_dataset;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::StartupError;

/// Default configuration path, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "status-config.yaml";

/// Application entry point for the status server.
///
/// # Errors
///
/// Returns an error if configuration, the dataset, the URL transform, or
/// the listener is invalid.
#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // 1. Load configuration.
    let (config, config_path, found) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("status-server starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Load the dataset.
    let index = load_dataset(&config.data)?;

    // 4. Outbound URL rewriting.
    let transform = UrlTransform::parse(config.urls.transform.as_deref())?;
    if let Some(t) = &transform {
        info!(from = t.from_uri(), to = t.to_uri(), "URL transform enabled");
    }

    let state = Arc::new(
        AppState::new(index)
            .with_transform(transform)
            .with_strict_if_modified_since(config.server.strict_if_modified_since),
    );

    // 5. Reload on SIGHUP.
    #[cfg(unix)]
    reload::spawn(Arc::clone(&state), config.data.clone());

    // 6. Serve.
    start_server(&config.server, state).await?;

    info!("status-server exited cleanly");
    Ok(())
}

/// Load configuration from `$STATUS_CONFIG`, or `status-config.yaml`.
///
/// A missing file yields defaults (with environment overrides). Returns
/// the configuration, the path consulted, and whether the file existed.
fn load_config() -> Result<(StatusConfig, PathBuf, bool), StartupError> {
    let path = std::env::var_os("STATUS_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = StatusConfig::from_file(&path)?;
        Ok((config, path, true))
    } else {
        let mut config = StatusConfig::default();
        config.apply_env_overrides();
        Ok((config, path, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[cfg(unix)]
mod reload {
    //! Dataset reload on `SIGHUP`.

    use std::sync::Arc;

    use status_api::AppState;
    use status_core::config::DataConfig;
    use status_core::loader::load_dataset;
    use tokio::signal::unix::{SignalKind, signal};
    use tracing::{error, info, warn};

    /// Spawn a task that reloads the dataset on every `SIGHUP`.
    ///
    /// A failed reload keeps serving the current dataset.
    pub fn spawn(state: Arc<AppState>, data: DataConfig) {
        tokio::spawn(async move {
            let mut hangup = match signal(SignalKind::hangup()) {
                Ok(hangup) => hangup,
                Err(e) => {
                    warn!(error = %e, "cannot listen for SIGHUP, reload disabled");
                    return;
                }
            };
            while hangup.recv().await.is_some() {
                info!("received SIGHUP, reloading dataset");
                let config = data.clone();
                match tokio::task::spawn_blocking(move || load_dataset(&config)).await {
                    Ok(Ok(index)) => state.replace_index(index),
                    Ok(Err(e)) => error!(error = %e, "reload failed, keeping current dataset"),
                    Err(e) => error!(error = %e, "reload task aborted, keeping current dataset"),
                }
            }
        });
    }
}
