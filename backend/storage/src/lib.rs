//! Storage backends: the object store holding uploaded form images and the
//! document store holding digitized records.
//!
//! Production clients speak the Google REST APIs; in-memory doubles back
//! the test suites and local runs.

pub mod codec;
pub mod firebase;
pub mod firestore;
pub mod memory;

pub use firebase::FirebaseObjectStore;
pub use firestore::{FirestoreStore, FEEDBACK_COLLECTION, INIT_SENTINEL_ID};
pub use memory::{InMemoryFeedbackStore, InMemoryObjectStore};
