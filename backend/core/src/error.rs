use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Error surfaced by an external collaborator client.
///
/// `Unavailable` means the backing service itself is not provisioned or
/// reachable (bucket never created, database not enabled); the HTTP layer
/// maps it to 503. `Call` means the call reached the service and failed;
/// it maps to the failing stage's 500.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{summary}: {details}")]
    Unavailable {
        /// Short description, e.g. "Storage service not available".
        summary: String,
        /// Operator-facing hint on how to provision the dependency.
        hint: String,
        /// Underlying error detail from the service.
        details: String,
    },

    #[error("{0}")]
    Call(String),
}

impl ServiceError {
    pub fn call(details: impl Into<String>) -> Self {
        Self::Call(details.into())
    }

    pub fn unavailable(
        summary: impl Into<String>,
        hint: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::Unavailable {
            summary: summary.into(),
            hint: hint.into(),
            details: details.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// A failure of the upload pipeline, one variant per failable stage.
///
/// The variant order follows stage order; `code()` yields the stable
/// machine-readable code surfaced in 500 response bodies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The request carried no image bytes.
    #[error("no image file provided")]
    InvalidInput,

    /// Storing the image in the object store failed.
    #[error("image storage failed: {0}")]
    Storage(ServiceError),

    /// The extraction model call failed or returned an empty reply.
    #[error("field extraction failed: {0}")]
    Extraction(ServiceError),

    /// The extraction reply could not be parsed as JSON.
    #[error("extraction reply is not valid JSON: {0}")]
    ExtractionParse(String),

    /// Required form fields were absent or empty in the extraction reply.
    #[error("missing required fields: {}", .missing.join(", "))]
    SchemaValidation { missing: Vec<String> },

    /// Writing the record to the document store failed.
    #[error("document store write failed: {0}")]
    Persistence(ServiceError),

    /// Appending the mirror row to the spreadsheet failed.
    #[error("spreadsheet append failed: {0}")]
    Spreadsheet(ServiceError),
}

impl PipelineError {
    /// Stable code for the wire contract's `code` field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Storage(_) => "storage_error",
            Self::Extraction(_) => "extraction_error",
            Self::ExtractionParse(_) => "extraction_parse_error",
            Self::SchemaValidation { .. } => "schema_validation_error",
            Self::Persistence(_) => "persistence_error",
            Self::Spreadsheet(_) => "spreadsheet_error",
        }
    }

    /// The stage this failure belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidInput => Stage::ValidateInput,
            Self::Storage(_) => Stage::StoreImage,
            Self::Extraction(_) | Self::ExtractionParse(_) => Stage::ExtractFields,
            Self::SchemaValidation { .. } => Stage::ValidateSchema,
            Self::Persistence(_) => Stage::Persist,
            Self::Spreadsheet(_) => Stage::Mirror,
        }
    }

    /// The collaborator-unavailable detail, when this failure maps to 503.
    pub fn unavailable(&self) -> Option<&ServiceError> {
        match self {
            Self::Storage(e) | Self::Extraction(e) | Self::Persistence(e) | Self::Spreadsheet(e)
                if e.is_unavailable() =>
            {
                Some(e)
            }
            _ => None,
        }
    }
}

/// The failable stages of the upload pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ValidateInput,
    StoreImage,
    ExtractFields,
    ValidateSchema,
    Persist,
    Mirror,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ValidateInput => "validate-input",
            Stage::StoreImage => "store-image",
            Stage::ExtractFields => "extract-fields",
            Stage::ValidateSchema => "validate-schema",
            Stage::Persist => "persist",
            Stage::Mirror => "mirror",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_validation_names_fields_in_order() {
        let err = PipelineError::SchemaValidation {
            missing: vec!["Program".into(), "Room No".into()],
        };
        assert_eq!(
            err.to_string(),
            "missing required fields: Program, Room No"
        );
        assert_eq!(err.code(), "schema_validation_error");
        assert_eq!(err.stage(), Stage::ValidateSchema);
    }

    #[test]
    fn unavailable_surfaces_only_for_unprovisioned_backends() {
        let down = PipelineError::Storage(ServiceError::unavailable(
            "Storage service not available",
            "Please ensure the storage bucket is created",
            "bucket does not exist",
        ));
        assert!(down.unavailable().is_some());

        let failed = PipelineError::Storage(ServiceError::call("500 from upstream"));
        assert!(failed.unavailable().is_none());
        assert_eq!(failed.code(), "storage_error");
    }

    #[test]
    fn parse_and_call_failures_share_the_extract_stage() {
        let parse = PipelineError::ExtractionParse("expected value at line 1".into());
        let call = PipelineError::Extraction(ServiceError::call("empty reply"));
        assert_eq!(parse.stage(), Stage::ExtractFields);
        assert_eq!(call.stage(), Stage::ExtractFields);
        assert_ne!(parse.code(), call.code());
    }
}
