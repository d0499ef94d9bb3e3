//! The upload digitization pipeline and the feedback listing read path.

pub mod listing;
pub mod pipeline;

pub use listing::FeedbackListing;
pub use pipeline::{EffectLedger, StoredImage, UploadFailure, UploadPipeline, UploadReceipt};
