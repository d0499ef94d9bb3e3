use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use formlens_core::{ObjectStore, ServiceError};
use formlens_gauth::TokenProvider;

const STORAGE_API: &str = "https://storage.googleapis.com";
const DOWNLOAD_HOST: &str = "https://firebasestorage.googleapis.com";

/// Firebase Storage (GCS) object store.
///
/// Uploads go through the JSON API; the returned retrieval URL is the
/// Firebase download form, made long-lived by attaching a download token to
/// the object's metadata.
pub struct FirebaseObjectStore {
    client: Client,
    token: Arc<TokenProvider>,
    bucket: String,
    api_base: String,
    download_base: String,
}

impl FirebaseObjectStore {
    pub fn new(client: Client, token: Arc<TokenProvider>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            token,
            bucket: bucket.into(),
            api_base: STORAGE_API.to_string(),
            download_base: DOWNLOAD_HOST.to_string(),
        }
    }

    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    pub fn with_download_base(mut self, url: impl Into<String>) -> Self {
        self.download_base = url.into();
        self
    }

    async fn bearer(&self) -> Result<String, ServiceError> {
        self.token
            .access_token()
            .await
            .map_err(|e| ServiceError::call(format!("failed to obtain access token: {e}")))
    }

    fn upload_url(&self, key: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.api_base,
            self.bucket,
            urlencoding::encode(key)
        )
    }

    fn metadata_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.api_base,
            self.bucket,
            urlencoding::encode(key)
        )
    }

    fn download_url(&self, key: &str, token: &str) -> String {
        format!(
            "{}/v0/b/{}/o/{}?alt=media&token={}",
            self.download_base,
            self.bucket,
            urlencoding::encode(key),
            token
        )
    }

    async fn attach_download_token(
        &self,
        key: &str,
        bearer: &str,
        download_token: &str,
    ) -> Result<(), ServiceError> {
        let body = json!({
            "metadata": { "firebaseStorageDownloadTokens": download_token }
        });

        let response = self
            .client
            .patch(self.metadata_url(key))
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::call(format!("storage metadata request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ServiceError::call(format!(
                "storage metadata update returned {status}: {error_body}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FirebaseObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ServiceError> {
        let bearer = self.bearer().await?;

        debug!(
            key,
            bucket = %self.bucket,
            size = bytes.len(),
            "uploading image to object store"
        );

        let response = self
            .client
            .post(self.upload_url(key))
            .bearer_auth(&bearer)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ServiceError::call(format!("storage upload request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ServiceError::unavailable(
                "Storage service not available",
                "Please ensure Firebase Storage is enabled and bucket is created",
                error_body,
            ));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ServiceError::call(format!(
                "storage upload returned {status}: {error_body}"
            )));
        }

        let download_token = Uuid::new_v4().to_string();
        self.attach_download_token(key, &bearer, &download_token)
            .await?;

        let url = self.download_url(key, &download_token);
        debug!(key, "image stored");
        Ok(url)
    }
}
