//! The extraction instruction sent with every form image.
//!
//! Keeping it as one constant makes the field contract greppable and lets
//! tests assert against it without a model call. The JSON block must stay in
//! lock-step with the field names in `formlens_core::types`: the model is
//! told to reply with these exact keys and the reply is deserialized into
//! those types.

/// Instruction prompt for digitizing one feedback form image.
pub const EXTRACTION_PROMPT: &str = r#"Please analyze this feedback form image and extract the following information in a structured format:
- Program name and date
- Room number and accommodation details
- Name of participant
- Program experience ratings
- Suggestions
- Overall ashram experience ratings
- Volunteer preferences
- Contribution interests
Please format the response as a JSON object with these exact keys:
{
  "Program": "string",
  "Program Date": "string",
  "Name": "string",
  "Room No": "string",
  "Program Experience": {
    "How satisfied are you?": "string",
    "How were you feeling before the program?": "string",
    "How were you feeling after the program?": "string",
    "How likely would you recommend this program?": "string"
  },
  "Suggestions": "string",
  "Overall Ashram Experience": {
    "Housing?": "string",
    "Hygiene and cleanliness?": "string",
    "Dining Experience?": "string",
    "Program arrangements?": "string"
  },
  "Volunteer Preferences": "string",
  "Contribution Interests": "string"
}"#;
