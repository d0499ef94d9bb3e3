use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use formlens_core::{PipelineError, ServiceError};
use formlens_pipeline::UploadFailure;

/// Response for a request that never carried an image file.
pub fn missing_image_response() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "No image file provided" })),
    )
}

/// Maps a failed pipeline run onto the wire contract.
///
/// Missing input is the caller's fault and comes back as 400. A backing
/// service that is not provisioned yet comes back as 503 together with the
/// operator hint. Everything else is a 500 carrying the stable code of the
/// stage that failed.
pub fn upload_failure_response(failure: &UploadFailure) -> (StatusCode, Json<Value>) {
    if matches!(failure.error, PipelineError::InvalidInput) {
        return missing_image_response();
    }
    if let Some(unavailable) = failure.error.unavailable() {
        return unavailable_response(unavailable);
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Failed to process upload",
            "details": failure.error.to_string(),
            "code": failure.error.code(),
        })),
    )
}

/// Maps a failed listing read onto the wire contract.
pub fn listing_failure_response(error: &ServiceError) -> (StatusCode, Json<Value>) {
    match error {
        ServiceError::Unavailable { .. } => unavailable_response(error),
        ServiceError::Call(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to fetch feedback",
                "details": error.to_string(),
                "code": "persistence_error",
            })),
        ),
    }
}

fn unavailable_response(error: &ServiceError) -> (StatusCode, Json<Value>) {
    match error {
        ServiceError::Unavailable {
            summary,
            hint,
            details,
        } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": summary,
                "message": hint,
                "details": details,
            })),
        ),
        ServiceError::Call(details) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Service not available", "details": details })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formlens_pipeline::EffectLedger;

    fn failure(error: PipelineError) -> UploadFailure {
        UploadFailure {
            error,
            effects: EffectLedger::default(),
        }
    }

    #[test]
    fn missing_image_is_a_400_with_fixed_body() {
        let (status, Json(body)) = upload_failure_response(&failure(PipelineError::InvalidInput));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No image file provided" }));
    }

    #[test]
    fn unprovisioned_storage_is_a_503_with_hint() {
        let error = PipelineError::Storage(ServiceError::unavailable(
            "Storage service not available",
            "Please ensure Firebase Storage is enabled and bucket is created",
            "bucket not found",
        ));
        let (status, Json(body)) = upload_failure_response(&failure(error));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Storage service not available");
        assert_eq!(
            body["message"],
            "Please ensure Firebase Storage is enabled and bucket is created"
        );
        assert_eq!(body["details"], "bucket not found");
    }

    #[test]
    fn extraction_failure_is_a_500_with_stage_code() {
        let error = PipelineError::Extraction(ServiceError::call("model timed out"));
        let (status, Json(body)) = upload_failure_response(&failure(error));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to process upload");
        assert_eq!(body["code"], "extraction_error");
        assert!(body["details"].as_str().unwrap().contains("model timed out"));
    }

    #[test]
    fn missing_fields_are_a_500_with_schema_code() {
        let error = PipelineError::SchemaValidation {
            missing: vec!["Name".to_string(), "Room No".to_string()],
        };
        let (status, Json(body)) = upload_failure_response(&failure(error));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "schema_validation_error");
        let details = body["details"].as_str().unwrap();
        assert!(details.contains("Name"));
        assert!(details.contains("Room No"));
    }

    #[test]
    fn listing_unavailable_is_a_503() {
        let error = ServiceError::unavailable(
            "Firestore service not available",
            "Please ensure Firestore API is enabled and database is created",
            "database does not exist",
        );
        let (status, Json(body)) = listing_failure_response(&error);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Firestore service not available");
        assert_eq!(body["details"], "database does not exist");
    }

    #[test]
    fn listing_call_failure_is_a_500() {
        let error = ServiceError::call("malformed stored record abc");
        let (status, Json(body)) = listing_failure_response(&error);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch feedback");
        assert_eq!(body["code"], "persistence_error");
    }
}
