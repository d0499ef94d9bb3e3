use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded form image, as received from the HTTP layer.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    /// Original filename as sent by the client, kept in the storage key.
    pub filename: String,
    /// MIME type declared by the client (e.g. "image/jpeg").
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Answers for the "Program Experience" question group.
///
/// Sub-fields are optional: the model may leave any of them blank without
/// failing the upload. The group itself is always present in a stored
/// record, as an empty object when nothing was extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramExperience {
    #[serde(
        rename = "How satisfied are you?",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub satisfaction: Option<String>,

    #[serde(
        rename = "How were you feeling before the program?",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub feeling_before: Option<String>,

    #[serde(
        rename = "How were you feeling after the program?",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub feeling_after: Option<String>,

    #[serde(
        rename = "How likely would you recommend this program?",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recommendation: Option<String>,
}

/// Answers for the "Overall Ashram Experience" question group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AshramExperience {
    #[serde(rename = "Housing?", default, skip_serializing_if = "Option::is_none")]
    pub housing: Option<String>,

    #[serde(
        rename = "Hygiene and cleanliness?",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hygiene: Option<String>,

    #[serde(
        rename = "Dining Experience?",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dining: Option<String>,

    #[serde(
        rename = "Program arrangements?",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub arrangements: Option<String>,
}

/// The fields read off a form by the extraction model, after validation.
///
/// The four string fields are required: a reply missing any of them is
/// rejected before persistence. The nested groups default to empty so that
/// "group not extracted" and "required field missing" stay distinct at the
/// type level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(rename = "Program")]
    pub program: String,

    #[serde(rename = "Program Date")]
    pub program_date: String,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Room No")]
    pub room_no: String,

    #[serde(rename = "Program Experience", default)]
    pub program_experience: ProgramExperience,

    #[serde(rename = "Overall Ashram Experience", default)]
    pub ashram_experience: AshramExperience,

    #[serde(rename = "Suggestions", default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<String>,

    #[serde(
        rename = "Volunteer Preferences",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub volunteer_preferences: Option<String>,

    #[serde(
        rename = "Contribution Interests",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contribution_interests: Option<String>,
}

/// The persisted representation of one digitized feedback form.
///
/// Append-only: a record is written exactly once during the upload pipeline
/// and never mutated or deleted afterwards. `uploaded_at` is the sole
/// listing sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub uid: String,

    #[serde(rename = "imageUrl")]
    pub image_url: String,

    #[serde(rename = "uploadedAt", with = "iso_millis")]
    pub uploaded_at: DateTime<Utc>,

    #[serde(flatten)]
    pub fields: ExtractedFields,
}

/// A record as returned by the listing read path, annotated with the
/// store-assigned document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFeedback {
    pub id: String,

    #[serde(flatten)]
    pub record: FeedbackRecord,
}

/// Fixed-precision ISO-8601 timestamps (millisecond, `Z` suffix).
///
/// The document store sorts `uploadedAt` as a plain string, so every stored
/// value must share one shape for lexicographic order to equal
/// chronological order.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
