//! Error types for the status server binary.

/// Top-level error for the status server binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: status_core::config::ConfigError,
    },

    /// The dataset could not be loaded, or the URL transform is malformed.
    #[error("dataset error: {source}")]
    Core {
        /// The underlying core error.
        #[from]
        source: status_core::CoreError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: status_api::ServerError,
    },
}
