//! Validation of raw model replies against the form field contract.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use formlens_core::{ExtractedFields, PipelineError};

/// Fields a reply must carry with a non-empty value to be accepted.
pub const REQUIRED_FIELDS: [&str; 4] = ["Program", "Program Date", "Name", "Room No"];

static RE_CODE_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*(.*?)\s*```$").unwrap());

/// Removes an outer markdown code fence, with or without a `json` language
/// tag. Models add one despite being asked for bare JSON.
pub fn strip_code_fences(reply: &str) -> String {
    let trimmed = reply.trim();
    if let Some(caps) = RE_CODE_FENCES.captures(trimmed) {
        caps[1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses and validates a raw model reply.
///
/// The reply must be a JSON object whose required fields are present and
/// non-empty; question groups the model left out come back as empty groups
/// rather than failing the upload.
pub fn parse_reply(reply: &str) -> Result<ExtractedFields, PipelineError> {
    let cleaned = strip_code_fences(reply);
    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| PipelineError::ExtractionParse(e.to_string()))?;

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| is_missing(value.get(**field)))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::SchemaValidation { missing });
    }

    serde_json::from_value(value).map_err(|e| PipelineError::ExtractionParse(e.to_string()))
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formlens_core::types::ProgramExperience;

    fn full_reply() -> String {
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

    #[test]
    fn bare_json_parses() {
        let fields = parse_reply(&full_reply()).unwrap();
        assert_eq!(fields.program, "Happiness Program");
        assert_eq!(
            fields.program_experience.satisfaction.as_deref(),
            Some("Very satisfied")
        );
        assert_eq!(fields.suggestions.as_deref(), Some("More morning sessions"));
    }

    #[test]
    fn fenced_json_parses() {
        let fenced = format!("```json\n{}\n```", full_reply());
        assert!(parse_reply(&fenced).is_ok());
    }

    #[test]
    fn fence_without_language_tag_parses() {
        let fenced = format!("```\n{}\n```", full_reply());
        assert!(parse_reply(&fenced).is_ok());
    }

    #[test]
    fn fence_stripping_keeps_inner_backticks() {
        let stripped = strip_code_fences("```json\n{\"a\": \"x``y\"}\n```");
        assert_eq!(stripped, "{\"a\": \"x``y\"}");
    }

    #[test]
    fn unfenced_reply_is_only_trimmed() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn prose_reply_is_a_parse_error() {
        let err = parse_reply("I could not read the form, sorry.").unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionParse(_)));
    }

    #[test]
    fn missing_required_fields_reported_in_schema_order() {
        let reply = serde_json::json!({
            "Program": "Sahaj",
            "Room No": ""
        })
        .to_string();

        let err = parse_reply(&reply).unwrap_err();
        match err {
            PipelineError::SchemaValidation { missing } => {
                assert_eq!(missing, ["Program Date", "Name", "Room No"]);
            }
            other => panic!("expected schema validation, got {other:?}"),
        }
    }

    #[test]
    fn null_required_field_counts_as_missing() {
        let reply = serde_json::json!({
            "Program": "Sahaj",
            "Program Date": null,
            "Name": "R. Iyer",
            "Room No": "12"
        })
        .to_string();

        let err = parse_reply(&reply).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaValidation { missing } if missing == ["Program Date"]));
    }

    #[test]
    fn whitespace_only_value_is_accepted() {
        // Only the empty string counts as absent; a space does not.
        let reply = serde_json::json!({
            "Program": " ",
            "Program Date": "2026-01-02",
            "Name": "R. Iyer",
            "Room No": "12"
        })
        .to_string();
        assert!(parse_reply(&reply).is_ok());
    }

    #[test]
    fn absent_groups_become_empty_groups() {
        let reply = serde_json::json!({
            "Program": "Sahaj",
            "Program Date": "2026-01-02",
            "Name": "R. Iyer",
            "Room No": "12"
        })
        .to_string();

        let fields = parse_reply(&reply).unwrap();
        assert_eq!(fields.program_experience, ProgramExperience::default());
        assert!(fields.ashram_experience.housing.is_none());
        assert!(fields.volunteer_preferences.is_none());
    }

    #[test]
    fn unexpected_value_types_are_parse_errors() {
        let reply = serde_json::json!({
            "Program": "Sahaj",
            "Program Date": "2026-01-02",
            "Name": "R. Iyer",
            "Room No": 12
        })
        .to_string();

        let err = parse_reply(&reply).unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionParse(_)));
    }
}
