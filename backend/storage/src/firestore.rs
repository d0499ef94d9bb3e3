use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info};

use formlens_core::{FeedbackRecord, FeedbackStore, ServiceError, StoredFeedback};
use formlens_gauth::TokenProvider;

use crate::codec;

/// Collection holding one document per digitized form, keyed by uid.
pub const FEEDBACK_COLLECTION: &str = "feedback";

/// Placeholder document written once so the collection exists before the
/// first real upload. It carries no `uploadedAt` field and therefore never
/// appears in listings.
pub const INIT_SENTINEL_ID: &str = "init";

const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";

/// Firestore-backed document store.
pub struct FirestoreStore {
    client: Client,
    token: Arc<TokenProvider>,
    project_id: String,
    base_url: String,
}

impl FirestoreStore {
    pub fn new(client: Client, token: Arc<TokenProvider>, project_id: impl Into<String>) -> Self {
        Self {
            client,
            token,
            project_id: project_id.into(),
            base_url: FIRESTORE_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn bearer(&self) -> Result<String, ServiceError> {
        self.token
            .access_token()
            .await
            .map_err(|e| ServiceError::call(format!("failed to obtain access token: {e}")))
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.base_url, self.project_id
        )
    }

    fn doc_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), FEEDBACK_COLLECTION, id)
    }

    fn database_unavailable(details: String) -> ServiceError {
        ServiceError::unavailable(
            "Firestore service not available",
            "Please ensure Firestore API is enabled and database is created",
            details,
        )
    }
}

/// The listing query: every feedback document, newest upload first.
///
/// Ordering by `uploadedAt` doubles as an existence filter, so the init
/// sentinel is excluded by the backend itself.
fn list_query_body() -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": FEEDBACK_COLLECTION }],
            "orderBy": [{
                "field": { "fieldPath": "uploadedAt" },
                "direction": "DESCENDING"
            }]
        }
    })
}

/// Last path segment of a fully qualified document name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[async_trait]
impl FeedbackStore for FirestoreStore {
    async fn ensure_ready(&self) -> Result<(), ServiceError> {
        let bearer = self.bearer().await?;
        let url = format!(
            "{}?currentDocument.exists=false",
            self.doc_url(INIT_SENTINEL_ID)
        );
        let body = json!({
            "fields": {
                "timestamp": {
                    "timestampValue": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
                }
            }
        });

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&bearer)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::call(format!("document store request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            // Sentinel already written by an earlier run.
            debug!("feedback collection already initialized");
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::database_unavailable(error_body));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ServiceError::call(format!(
                "collection init returned {status}: {error_body}"
            )));
        }

        info!(collection = FEEDBACK_COLLECTION, "feedback collection initialized");
        Ok(())
    }

    async fn put(&self, record: &FeedbackRecord) -> Result<(), ServiceError> {
        let bearer = self.bearer().await?;
        let value = serde_json::to_value(record)
            .map_err(|e| ServiceError::call(format!("failed to serialize record: {e}")))?;
        let doc = codec::to_document(&value).map_err(|e| ServiceError::call(e.to_string()))?;

        let response = self
            .client
            .patch(self.doc_url(&record.uid))
            .bearer_auth(&bearer)
            .json(&doc)
            .send()
            .await
            .map_err(|e| ServiceError::call(format!("document store request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::database_unavailable(error_body));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ServiceError::call(format!(
                "document write returned {status}: {error_body}"
            )));
        }

        debug!(uid = %record.uid, "record persisted");
        Ok(())
    }

    async fn get(&self, uid: &str) -> Result<Option<FeedbackRecord>, ServiceError> {
        let bearer = self.bearer().await?;

        let response = self
            .client
            .get(self.doc_url(uid))
            .bearer_auth(&bearer)
            .send()
            .await
            .map_err(|e| ServiceError::call(format!("document store request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ServiceError::call(format!(
                "document read returned {status}: {error_body}"
            )));
        }

        let doc: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::call(format!("failed to parse document: {e}")))?;
        let value = codec::from_document(&doc).map_err(|e| ServiceError::call(e.to_string()))?;
        let record = serde_json::from_value(value)
            .map_err(|e| ServiceError::call(format!("malformed stored record {uid}: {e}")))?;
        Ok(Some(record))
    }

    async fn list_by_upload_time(&self) -> Result<Vec<StoredFeedback>, ServiceError> {
        let bearer = self.bearer().await?;
        let url = format!("{}:runQuery", self.documents_root());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&bearer)
            .json(&list_query_body())
            .send()
            .await
            .map_err(|e| ServiceError::call(format!("document store request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::database_unavailable(error_body));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ServiceError::call(format!(
                "listing query returned {status}: {error_body}"
            )));
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| ServiceError::call(format!("failed to parse listing reply: {e}")))?;

        let mut out = Vec::new();
        for row in &rows {
            // A reply row may carry only a readTime and no document.
            let Some(doc) = row.get("document") else {
                continue;
            };
            let id = doc
                .get("name")
                .and_then(Value::as_str)
                .map(document_id)
                .unwrap_or_default()
                .to_string();
            let value =
                codec::from_document(doc).map_err(|e| ServiceError::call(e.to_string()))?;
            let record: FeedbackRecord = serde_json::from_value(value)
                .map_err(|e| ServiceError::call(format!("malformed stored record {id}: {e}")))?;
            out.push(StoredFeedback { id, record });
        }

        debug!(count = out.len(), "fetched feedback listing");
        Ok(out)
    }
}
