use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use formlens_core::ImagePayload;

use crate::api_error;
use crate::server::AppState;

/// Handler for `POST /api/upload`.
///
/// Expects a multipart body with a single file field named `image`; other
/// fields are ignored. A request that is not multipart at all, or whose
/// body cannot be read, is treated the same as a missing field since both
/// mean the caller sent no usable image.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => {
            error!(error = %e, "Upload request is not multipart");
            return Err(api_error::missing_image_response());
        }
    };

    let image = match read_image_field(multipart).await {
        Some(image) => image,
        None => return Err(api_error::missing_image_response()),
    };

    match state.pipeline.run(image).await {
        Ok(receipt) => Ok(Json(json!({ "success": true, "data": receipt.record }))),
        Err(failure) => Err(api_error::upload_failure_response(&failure)),
    }
}

async fn read_image_field(mut multipart: Multipart) -> Option<ImagePayload> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                error!(error = %e, "Failed to read multipart body");
                return None;
            }
        };
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        match field.bytes().await {
            Ok(bytes) => return Some(ImagePayload::new(bytes.to_vec(), filename, mime_type)),
            Err(e) => {
                error!(error = %e, "Failed to read image field");
                return None;
            }
        }
    }
}
