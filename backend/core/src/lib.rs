pub mod error;
pub mod traits;
pub mod types;

pub use error::{PipelineError, ServiceError, Stage};
pub use traits::{FeedbackStore, ObjectStore, SheetMirror, VisionExtractor};
pub use types::{
    AshramExperience, ExtractedFields, FeedbackRecord, ImagePayload, ProgramExperience,
    StoredFeedback,
};
