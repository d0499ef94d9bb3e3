use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use formlens_core::{ServiceError, VisionExtractor};

const GEMINI_API: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini `generateContent` client for reading form images.
pub struct GeminiExtractor {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiExtractor {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ReplyContent>,
}

#[derive(Deserialize)]
struct ReplyContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

fn request_body(prompt: &str, image: &[u8], mime_type: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text {
                    text: prompt.to_string(),
                },
                Part::Inline {
                    inline_data: InlineData {
                        mime_type: mime_type.to_string(),
                        data: STANDARD.encode(image),
                    },
                },
            ],
        }],
    }
}

/// Joins the text parts of the first candidate. Replies without a usable
/// candidate yield an empty string, which the pipeline rejects.
fn reply_text(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait]
impl VisionExtractor for GeminiExtractor {
    async fn extract(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, ServiceError> {
        debug!(
            model = %self.model,
            size = image.len(),
            mime_type,
            "requesting field extraction"
        );

        let response = self
            .client
            .post(self.request_url())
            .json(&request_body(prompt, image, mime_type))
            .send()
            .await
            .map_err(|e| ServiceError::call(format!("extraction request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ServiceError::call(format!(
                "extraction model returned {status}: {error_body}"
            )));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::call(format!("failed to parse model reply: {e}")))?;

        Ok(reply_text(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_the_inline_data_wire_shape() {
        let body = request_body("read this form", &[1, 2, 3], "image/png");
        let json = serde_json::to_value(&body).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "read this form");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], STANDARD.encode([1, 2, 3]));
    }

    #[test]
    fn reply_text_joins_candidate_parts() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"Program\":" }, { "text": " \"Sahaj\"}" }] }
            }]
        }))
        .unwrap();
        assert_eq!(reply_text(response), "{\"Program\": \"Sahaj\"}");
    }

    #[test]
    fn reply_without_candidates_is_empty() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(reply_text(response), "");
    }

    #[test]
    fn request_url_selects_the_configured_model() {
        let extractor = GeminiExtractor::new(Client::new(), "k-123").with_model("gemini-1.5-pro");
        assert_eq!(
            extractor.request_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent?key=k-123"
        );
    }
}
