//! HTTP API layer for trackdrop.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: songs, votes, favorites, reports, suggestions, users
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: token resolution into request extensions
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
