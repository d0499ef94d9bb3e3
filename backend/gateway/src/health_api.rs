use axum::Json;
use serde_json::{json, Value};

/// Handler for `GET /`. The banner doubles as a liveness probe for
/// deployments that only check the root path.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "FormLens OCR Backend Server is running" }))
}

/// Handler for `GET /api/health`.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "formlens",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
