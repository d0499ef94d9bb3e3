use async_trait::async_trait;

use formlens_core::{ServiceError, VisionExtractor};

/// A mock extractor that returns canned replies.
pub struct MockExtractor {
    reply: Option<String>,
    fail_with: Option<ServiceError>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            reply: None,
            fail_with: None,
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    /// An extractor whose every call fails with `err`.
    pub fn failing(err: ServiceError) -> Self {
        Self {
            reply: None,
            fail_with: Some(err),
        }
    }

    /// A complete reply satisfying the required-field contract, used as the
    /// default canned response.
    pub fn valid_reply() -> String {
        serde_json::json!({
            "Program": "Happiness Program",
            "Program Date": "2026-03-14",
            "Name": "A. Sharma",
            "Room No": "B-201",
            "Program Experience": {
                "How satisfied are you?": "Very satisfied",
                "How were you feeling before the program?": "Tired",
                "How were you feeling after the program?": "Calm",
                "How likely would you recommend this program?": "Definitely"
            },
            "Suggestions": "More morning sessions",
            "Overall Ashram Experience": {
                "Housing?": "Good",
                "Hygiene and cleanliness?": "Excellent",
                "Dining Experience?": "Good",
                "Program arrangements?": "Well organized"
            },
            "Volunteer Preferences": "Kitchen seva",
            "Contribution Interests": "Monthly donation"
        })
        .to_string()
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionExtractor for MockExtractor {
    async fn extract(
        &self,
        _image: &[u8],
        _mime_type: &str,
        _prompt: &str,
    ) -> Result<String, ServiceError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(self.reply.clone().unwrap_or_else(Self::valid_reply))
    }
}
