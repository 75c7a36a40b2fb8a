//! HTTP front end for mosaic frame generation and video interpolation.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod pipeline;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::ServiceConfig;
pub use state::AppState;

/// Build the service router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/fetch-stitched-frames", post(handlers::fetch_stitched_frames))
        .route(
            "/interpolate-and-generate-video",
            post(handlers::interpolate_and_generate_video),
        )
        .route("/sessions/:session_id", delete(handlers::delete_session))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
