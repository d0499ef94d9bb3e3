//! Field extraction: sends an uploaded form image to a vision model and
//! turns the raw reply into validated form fields.

pub mod gemini;
pub mod mock;
pub mod prompt;
pub mod schema;

pub use gemini::GeminiExtractor;
pub use mock::MockExtractor;
pub use prompt::EXTRACTION_PROMPT;
pub use schema::{parse_reply, strip_code_fences, REQUIRED_FIELDS};
