//! Slipstream Web - HTTP API for source resolution
//!
//! Serves the presentation layer: accepts a media identity as query
//! parameters and answers with the resolved candidate stream list or a
//! structured error.

pub mod catalog;
pub mod handlers;
pub mod server;

pub use catalog::{CatalogClient, CatalogError, CatalogTitle};
pub use handlers::{ApiError, SourcesResponse};
pub use server::{AppState, router, run_server};
