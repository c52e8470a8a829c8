//! Remote collaborators: object storage for photos, document store for records.
//!
//! Both are traits so the submission pipeline never knows which backend it
//! talks to. Three backends exist:
//! - `fake`: in-memory, records every call (tests)
//! - `disk`: plain files under a root directory (local use, the CLI default)
//! - `firebase`: Cloud Storage for Firebase and Cloud Firestore over REST

mod disk;
mod fake;
mod firebase;

pub use disk::{DiskDocumentStore, DiskObjectStorage, StoredDocument};
pub use fake::{FakeDocumentStore, FakeObjectStorage, StorageCall};
pub use firebase::{to_firestore_fields, FirebaseStorage, Firestore};

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::{BackendKind, RecipePostConfig};
use crate::error::StorageError;
use crate::types::RecipeRecord;

/// Object storage that accepts local files and hands back download URLs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload `local_file` as `namespace/key`.
    async fn upload(&self, namespace: &str, key: &str, local_file: &Path)
        -> Result<(), StorageError>;

    /// Resolve the public download URL of an uploaded object.
    async fn download_url(&self, namespace: &str, key: &str) -> Result<String, StorageError>;

    /// Backend name for logging (e.g., "disk", "firebase", "fake").
    fn backend_name(&self) -> &'static str;
}

/// Document store that creates records with generated identifiers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a new document in `collection`, returning its generated id.
    async fn create(&self, collection: &str, record: &RecipeRecord) -> Result<String, StorageError>;

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}

/// The pair of collaborators a submission needs.
#[derive(Clone)]
pub struct Backend {
    pub objects: Arc<dyn ObjectStorage>,
    pub documents: Arc<dyn DocumentStore>,
}

/// Build the configured backend.
pub fn create_backend(config: &RecipePostConfig) -> Result<Backend, StorageError> {
    match &config.backend {
        BackendKind::Disk => Ok(Backend {
            objects: Arc::new(DiskObjectStorage::new(config.data_dir.clone())),
            documents: Arc::new(DiskDocumentStore::new(config.data_dir.clone())),
        }),
        BackendKind::Firebase(firebase) => {
            let client = reqwest::Client::builder()
                .timeout(config.http_timeout)
                .build()?;
            Ok(Backend {
                objects: Arc::new(FirebaseStorage::new(client.clone(), &firebase.storage_bucket)),
                documents: Arc::new(Firestore::new(client, &firebase.project_id)),
            })
        }
    }
}
