use std::sync::RwLock;

use async_trait::async_trait;

use formlens_core::{FeedbackRecord, ServiceError, SheetMirror};

use crate::google::summary_row;

/// Mirror double that records appended rows in memory.
pub struct RecordingSheetMirror {
    rows: RwLock<Vec<Vec<String>>>,
    fail_with: Option<ServiceError>,
}

impl RecordingSheetMirror {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            fail_with: None,
        }
    }

    /// A mirror whose every call fails with `err`.
    pub fn failing(err: ServiceError) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            fail_with: Some(err),
        }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecordingSheetMirror {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SheetMirror for RecordingSheetMirror {
    async fn append(&self, record: &FeedbackRecord) -> Result<(), ServiceError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.rows.write().unwrap().push(summary_row(record));
        Ok(())
    }
}
