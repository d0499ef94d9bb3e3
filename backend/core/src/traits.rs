use async_trait::async_trait;

use crate::error::ServiceError;
use crate::types::{FeedbackRecord, StoredFeedback};

/// Binary blob storage holding uploaded form images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `bytes` under `key` and return a long-lived retrieval URL.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ServiceError>;
}

/// Vision-capable generative model that reads a form image.
#[async_trait]
pub trait VisionExtractor: Send + Sync {
    /// Submit the image and instruction prompt; returns the raw model reply,
    /// expected (but not guaranteed) to be a JSON document.
    async fn extract(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, ServiceError>;
}

/// Keyed JSON document persistence, the system of record.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Idempotently create the backing collection. Invoked once at process
    /// startup; a second call must not re-initialize.
    async fn ensure_ready(&self) -> Result<(), ServiceError>;

    /// Write one record keyed by its uid.
    async fn put(&self, record: &FeedbackRecord) -> Result<(), ServiceError>;

    /// Look up one record by uid.
    async fn get(&self, uid: &str) -> Result<Option<FeedbackRecord>, ServiceError>;

    /// Every record ordered by upload time descending, each annotated with
    /// its store-assigned document id. Documents without an upload time
    /// (the initialization sentinel) never appear.
    async fn list_by_upload_time(&self) -> Result<Vec<StoredFeedback>, ServiceError>;
}

/// Append-only worksheet receiving one summary row per record.
#[async_trait]
pub trait SheetMirror: Send + Sync {
    /// Append the record's summary row to the worksheet.
    async fn append(&self, record: &FeedbackRecord) -> Result<(), ServiceError>;
}
