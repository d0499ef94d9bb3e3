use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use formlens_core::{
    FeedbackRecord, FeedbackStore, ImagePayload, ObjectStore, PipelineError, ServiceError,
    SheetMirror, VisionExtractor,
};
use formlens_extraction::{parse_reply, EXTRACTION_PROMPT};

/// Image stored by a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
}

/// Side effects committed by the time the pipeline returned.
///
/// The stages are not transactional: a failure late in the run leaves
/// earlier effects in place (an orphaned image, or a record with no
/// spreadsheet row). The ledger makes those orphans observable instead of
/// silent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectLedger {
    /// Set once the image landed in the object store.
    pub stored_image: Option<StoredImage>,
    /// Set once the record landed in the document store.
    pub persisted_uid: Option<String>,
    /// Set once the summary row was appended.
    pub mirrored_row: bool,
}

/// A fully committed pipeline run.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub record: FeedbackRecord,
    pub effects: EffectLedger,
}

/// A failed pipeline run, with whatever effects had already committed.
#[derive(Debug)]
pub struct UploadFailure {
    pub error: PipelineError,
    pub effects: EffectLedger,
}

/// Turns one uploaded form image into a persisted, mirrored record.
///
/// Stage order is fixed: store the image, extract fields, validate, persist
/// the record, mirror the summary row. The first failing stage aborts the
/// rest; nothing is retried or rolled back.
pub struct UploadPipeline {
    objects: Arc<dyn ObjectStore>,
    extractor: Arc<dyn VisionExtractor>,
    store: Arc<dyn FeedbackStore>,
    sheet: Arc<dyn SheetMirror>,
}

impl UploadPipeline {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        extractor: Arc<dyn VisionExtractor>,
        store: Arc<dyn FeedbackStore>,
        sheet: Arc<dyn SheetMirror>,
    ) -> Self {
        Self {
            objects,
            extractor,
            store,
            sheet,
        }
    }

    pub async fn run(&self, image: ImagePayload) -> Result<UploadReceipt, UploadFailure> {
        let mut effects = EffectLedger::default();

        if image.bytes.is_empty() {
            return Err(fail(PipelineError::InvalidInput, effects));
        }

        let uid = Uuid::new_v4().to_string();
        let key = format!("forms/{}-{}", uid, image.filename);
        info!(
            uid = %uid,
            filename = %image.filename,
            size = image.bytes.len(),
            "processing upload"
        );

        let image_url = match self
            .objects
            .put(&key, image.bytes.clone(), &image.mime_type)
            .await
        {
            Ok(url) => url,
            Err(e) => return Err(fail(PipelineError::Storage(e), effects)),
        };
        effects.stored_image = Some(StoredImage {
            key: key.clone(),
            url: image_url.clone(),
        });
        debug!(uid = %uid, key = %key, "image stored");

        let reply = match self
            .extractor
            .extract(&image.bytes, &image.mime_type, EXTRACTION_PROMPT)
            .await
        {
            Ok(reply) => reply,
            Err(e) => return Err(fail(PipelineError::Extraction(e), effects)),
        };
        if reply.trim().is_empty() {
            let err = PipelineError::Extraction(ServiceError::call("model returned an empty reply"));
            return Err(fail(err, effects));
        }

        let fields = match parse_reply(&reply) {
            Ok(fields) => fields,
            Err(e) => return Err(fail(e, effects)),
        };
        debug!(uid = %uid, program = %fields.program, "fields extracted");

        let record = FeedbackRecord {
            uid: uid.clone(),
            image_url,
            uploaded_at: Utc::now(),
            fields,
        };

        if let Err(e) = self.store.put(&record).await {
            return Err(fail(PipelineError::Persistence(e), effects));
        }
        effects.persisted_uid = Some(uid.clone());

        if let Err(e) = self.sheet.append(&record).await {
            return Err(fail(PipelineError::Spreadsheet(e), effects));
        }
        effects.mirrored_row = true;

        info!(uid = %uid, "upload digitized");
        Ok(UploadReceipt { record, effects })
    }
}

fn fail(error: PipelineError, effects: EffectLedger) -> UploadFailure {
    error!(
        stage = %error.stage(),
        code = error.code(),
        effects = ?effects,
        error = %error,
        "upload pipeline failed"
    );
    UploadFailure { error, effects }
}
