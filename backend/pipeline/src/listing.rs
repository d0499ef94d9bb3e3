use std::sync::Arc;

use tracing::debug;

use formlens_core::{FeedbackStore, ServiceError, StoredFeedback};

/// Read side of the feedback API.
pub struct FeedbackListing {
    store: Arc<dyn FeedbackStore>,
}

impl FeedbackListing {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    /// Every digitized form, newest upload first.
    pub async fn all(&self) -> Result<Vec<StoredFeedback>, ServiceError> {
        let listed = self.store.list_by_upload_time().await?;
        debug!(count = listed.len(), "feedback listing served");
        Ok(listed)
    }
}
