use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use formlens_core::{FeedbackRecord, ServiceError, SheetMirror};
use formlens_gauth::TokenProvider;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4";

/// Column headers of the mirror worksheet, in append order.
pub const SUMMARY_HEADERS: [&str; 6] = [
    "UID",
    "Program",
    "Program Date",
    "Name",
    "Room No",
    "Image URL",
];

/// The one row a record contributes to the worksheet.
pub fn summary_row(record: &FeedbackRecord) -> Vec<String> {
    vec![
        record.uid.clone(),
        record.fields.program.clone(),
        record.fields.program_date.clone(),
        record.fields.name.clone(),
        record.fields.room_no.clone(),
        record.image_url.clone(),
    ]
}

/// Google Sheets v4 mirror appending to the first worksheet.
pub struct GoogleSheetMirror {
    client: Client,
    token: Arc<TokenProvider>,
    sheet_id: String,
    base_url: String,
}

impl GoogleSheetMirror {
    pub fn new(client: Client, token: Arc<TokenProvider>, sheet_id: impl Into<String>) -> Self {
        Self {
            client,
            token,
            sheet_id: sheet_id.into(),
            base_url: SHEETS_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn append_url(&self) -> String {
        // Anchoring the range at A1 appends below the header row of the
        // first worksheet.
        format!(
            "{}/spreadsheets/{}/values/A1:append?valueInputOption=RAW",
            self.base_url, self.sheet_id
        )
    }
}

#[async_trait]
impl SheetMirror for GoogleSheetMirror {
    async fn append(&self, record: &FeedbackRecord) -> Result<(), ServiceError> {
        let bearer = self
            .token
            .access_token()
            .await
            .map_err(|e| ServiceError::call(format!("failed to obtain access token: {e}")))?;

        let body = json!({ "values": [summary_row(record)] });

        let response = self
            .client
            .post(self.append_url())
            .bearer_auth(&bearer)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::call(format!("spreadsheet request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ServiceError::call(format!(
                "spreadsheet append returned {status}: {error_body}"
            )));
        }

        debug!(uid = %record.uid, "summary row mirrored");
        Ok(())
    }
}
