//! In-memory storage backends for testing.
//!
//! Every call is recorded so tests can assert on the exact sequence of
//! collaborator calls a submission made.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use super::{DocumentStore, ObjectStorage};
use crate::error::StorageError;
use crate::types::RecipeRecord;

/// A recorded call against a fake backend.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageCall {
    Upload {
        namespace: String,
        key: String,
        local_file: PathBuf,
    },
    DownloadUrl {
        namespace: String,
        key: String,
    },
    Create {
        collection: String,
        record: RecipeRecord,
    },
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fake object storage.
///
/// Download URLs are `https://storage.invalid/<namespace>/<key>` unless a
/// fixed URL is configured.
#[derive(Debug, Default)]
pub struct FakeObjectStorage {
    calls: Mutex<Vec<StorageCall>>,
    download_url: Option<String>,
    upload_error: Option<String>,
    url_error: Option<String>,
    upload_gate: Option<Arc<Notify>>,
}

impl FakeObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always return this URL from `download_url`.
    pub fn with_download_url(mut self, url: &str) -> Self {
        self.download_url = Some(url.to_string());
        self
    }

    /// Fail every upload with this message.
    pub fn failing_upload(mut self, message: &str) -> Self {
        self.upload_error = Some(message.to_string());
        self
    }

    /// Fail every download URL lookup with this message.
    pub fn failing_download_url(mut self, message: &str) -> Self {
        self.url_error = Some(message.to_string());
        self
    }

    /// Block uploads until `gate` is notified.
    pub fn holding_uploads(mut self, gate: Arc<Notify>) -> Self {
        self.upload_gate = Some(gate);
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<StorageCall> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ObjectStorage for FakeObjectStorage {
    async fn upload(
        &self,
        namespace: &str,
        key: &str,
        local_file: &Path,
    ) -> Result<(), StorageError> {
        lock(&self.calls).push(StorageCall::Upload {
            namespace: namespace.to_string(),
            key: key.to_string(),
            local_file: local_file.to_path_buf(),
        });

        if let Some(gate) = &self.upload_gate {
            gate.notified().await;
        }

        match &self.upload_error {
            Some(message) => Err(StorageError::Rejected(message.clone())),
            None => Ok(()),
        }
    }

    async fn download_url(&self, namespace: &str, key: &str) -> Result<String, StorageError> {
        lock(&self.calls).push(StorageCall::DownloadUrl {
            namespace: namespace.to_string(),
            key: key.to_string(),
        });

        if let Some(message) = &self.url_error {
            return Err(StorageError::Rejected(message.clone()));
        }
        Ok(self
            .download_url
            .clone()
            .unwrap_or_else(|| format!("https://storage.invalid/{}/{}", namespace, key)))
    }

    fn backend_name(&self) -> &'static str {
        "fake"
    }
}

/// Fake document store. Generated ids are `doc-1`, `doc-2`, ...
#[derive(Debug, Default)]
pub struct FakeDocumentStore {
    calls: Mutex<Vec<StorageCall>>,
    create_error: Option<String>,
}

impl FakeDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every create with this message.
    pub fn failing_create(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<StorageCall> {
        lock(&self.calls).clone()
    }

    /// Records passed to `create`, in order, including failed attempts.
    pub fn created(&self) -> Vec<RecipeRecord> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                StorageCall::Create { record, .. } => Some(record.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn create(&self, collection: &str, record: &RecipeRecord) -> Result<String, StorageError> {
        let mut calls = lock(&self.calls);
        calls.push(StorageCall::Create {
            collection: collection.to_string(),
            record: record.clone(),
        });

        if let Some(message) = &self.create_error {
            return Err(StorageError::Rejected(message.clone()));
        }
        Ok(format!("doc-{}", calls.len()))
    }

    fn backend_name(&self) -> &'static str {
        "fake"
    }
}
