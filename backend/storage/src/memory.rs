//! In-memory doubles of the storage backends, used by the test suites and
//! for running the service without provisioned Google projects.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use formlens_core::{FeedbackRecord, FeedbackStore, ObjectStore, ServiceError, StoredFeedback};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Object store retaining uploads in process memory.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    fail_with: Option<ServiceError>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            fail_with: None,
        }
    }

    /// A store whose every call fails with `err`.
    pub fn failing(err: ServiceError) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            fail_with: Some(err),
        }
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ServiceError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.objects.write().unwrap().insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("memory://{key}"))
    }
}

/// Document store keeping records in a map keyed by uid.
pub struct InMemoryFeedbackStore {
    records: RwLock<HashMap<String, FeedbackRecord>>,
    init_calls: AtomicUsize,
    fail_with: Option<ServiceError>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            init_calls: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    /// A store whose every call fails with `err`.
    pub fn failing(err: ServiceError) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            init_calls: AtomicUsize::new(0),
            fail_with: Some(err),
        }
    }

    /// How many times `ensure_ready` has been invoked.
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryFeedbackStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn ensure_ready(&self) -> Result<(), ServiceError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn put(&self, record: &FeedbackRecord) -> Result<(), ServiceError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.records
            .write()
            .unwrap()
            .insert(record.uid.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, uid: &str) -> Result<Option<FeedbackRecord>, ServiceError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(self.records.read().unwrap().get(uid).cloned())
    }

    async fn list_by_upload_time(&self) -> Result<Vec<StoredFeedback>, ServiceError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        let records = self.records.read().unwrap();
        let mut out: Vec<StoredFeedback> = records
            .values()
            .map(|record| StoredFeedback {
                id: record.uid.clone(),
                record: record.clone(),
            })
            .collect();
        // Equal timestamps fall back to the document id, matching the
        // backing store's implicit name ordering.
        out.sort_by(|a, b| {
            b.record
                .uploaded_at
                .cmp(&a.record.uploaded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(out)
    }
}
