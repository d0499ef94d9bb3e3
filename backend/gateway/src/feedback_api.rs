use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use tracing::error;

use formlens_core::StoredFeedback;

use crate::api_error;
use crate::server::AppState;

/// Handler for `GET /api/feedback`. Returns every digitized record, newest
/// upload first.
pub async fn feedback(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredFeedback>>, (StatusCode, Json<Value>)> {
    match state.listing.all().await {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => {
            error!(error = %e, "Failed to fetch feedback");
            Err(api_error::listing_failure_response(&e))
        }
    }
}
