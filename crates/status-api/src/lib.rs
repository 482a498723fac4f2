//! HTTP surface of the facility status API.
//!
//! This crate provides an Axum server exposing:
//!
//! - **Status endpoints** (`/api/v1/status/...`) for the facility, its
//!   sites, locations, resources, incidents, and events
//! - **Account endpoints** (`/api/v1/account/...`) for capabilities,
//!   projects, and allocations
//! - **Discovery documents** at `/api/v1`, `/api/v1/status`, and
//!   `/api/v1/account`
//!
//! # Architecture
//!
//! Handlers read from an [`ObjectIndex`] snapshot held in [`AppState`].
//! The index is replaced wholesale on reload, never mutated, so reads need
//! no locking. Every entity response goes through [`respond`], which
//! implements `If-Modified-Since`, `include=` embedding, and outbound URL
//! rewriting in one place.
//!
//! [`ObjectIndex`]: status_core::ObjectIndex

pub mod account;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod respond;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
