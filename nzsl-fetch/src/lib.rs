//! nzsl-fetch library
//!
//! Looks up NZSL signs by English gloss, scrapes the sign page for its video
//! and downloads the video to local storage. The same pipeline backs the CLI
//! and the HTTP service.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod services;

use services::fetch_pipeline::SharedPipeline;
use services::FetchPipeline;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Lookup and download pipeline
    pub pipeline: SharedPipeline,
}

impl AppState {
    /// Create new application state
    pub fn new(pipeline: FetchPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/download", get(api::download_video))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
