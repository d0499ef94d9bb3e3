use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use formlens_pipeline::{FeedbackListing, UploadPipeline};

use crate::{control_ui, feedback_api, health_api, upload_api};

/// Shared state handed to every handler.
pub struct AppState {
    pub pipeline: UploadPipeline,
    pub listing: FeedbackListing,
}

impl AppState {
    pub fn new(pipeline: UploadPipeline, listing: FeedbackListing) -> Self {
        Self { pipeline, listing }
    }
}

/// Builds the API router. CORS and request tracing are layered on by the
/// binary, not here.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_api::root))
        .route("/ui", get(control_ui::dashboard))
        .route("/api/health", get(health_api::health))
        .route("/api/upload", post(upload_api::upload))
        .route("/api/feedback", get(feedback_api::feedback))
        .with_state(state)
}
