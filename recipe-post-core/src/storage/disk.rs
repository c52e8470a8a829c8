//! Disk-backed storage.
//!
//! Layout under the root directory:
//! - `objects/<namespace>/<key>`: uploaded files
//! - `documents/<collection>/<id>.json`: created records

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use super::{DocumentStore, ObjectStorage};
use crate::error::StorageError;
use crate::types::RecipeRecord;

/// Object storage that copies uploads into a directory tree.
#[derive(Debug, Clone)]
pub struct DiskObjectStorage {
    root: PathBuf,
}

impl DiskObjectStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn object_path(&self, namespace: &str, key: &str) -> PathBuf {
        self.root.join("objects").join(namespace).join(key)
    }
}

#[async_trait]
impl ObjectStorage for DiskObjectStorage {
    async fn upload(
        &self,
        namespace: &str,
        key: &str,
        local_file: &Path,
    ) -> Result<(), StorageError> {
        let dest = self.object_path(namespace, key);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = fs::copy(local_file, &dest).await?;
        tracing::debug!(namespace, key, bytes, "disk: stored object");
        Ok(())
    }

    async fn download_url(&self, namespace: &str, key: &str) -> Result<String, StorageError> {
        let path = self.object_path(namespace, key);
        let absolute = match fs::canonicalize(&path).await {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(format!("{}/{}", namespace, key)))
            }
            Err(e) => return Err(e.into()),
        };
        url::Url::from_file_path(&absolute)
            .map(|u| u.to_string())
            .map_err(|_| {
                StorageError::InvalidResponse(format!(
                    "Cannot express {} as a file URL",
                    absolute.display()
                ))
            })
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}

/// A record as written to disk, with its generated id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub record: RecipeRecord,
}

/// Document store that writes one pretty-printed JSON file per record.
#[derive(Debug, Clone)]
pub struct DiskDocumentStore {
    root: PathBuf,
}

impl DiskDocumentStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join("documents").join(collection)
    }

    /// Read back a single document.
    pub async fn get(&self, collection: &str, id: &str) -> Result<StoredDocument, StorageError> {
        let path = self.collection_dir(collection).join(format!("{}.json", id));
        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(format!("{}/{}", collection, id)))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// All documents in a collection, oldest first.
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    pub async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StorageError> {
        let dir = self.collection_dir(collection);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut docs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let content = match fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable document");
                    continue;
                }
            };
            match serde_json::from_str::<StoredDocument>(&content) {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unparsable document")
                }
            }
        }

        docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(docs)
    }
}

#[async_trait]
impl DocumentStore for DiskDocumentStore {
    async fn create(&self, collection: &str, record: &RecipeRecord) -> Result<String, StorageError> {
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir).await?;

        let doc = StoredDocument {
            id: Uuid::new_v4().simple().to_string(),
            created_at: Utc::now(),
            record: record.clone(),
        };
        let content = serde_json::to_string_pretty(&doc)?;
        fs::write(dir.join(format!("{}.json", doc.id)), content).await?;

        tracing::debug!(collection, id = %doc.id, "disk: created document");
        Ok(doc.id)
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IngredientEntry;
    use tempfile::TempDir;

    fn record(title: &str) -> RecipeRecord {
        RecipeRecord {
            title: title.to_string(),
            description: "desc".to_string(),
            ingredients: vec![IngredientEntry::new("oats", 150)],
            total_calories: 150.0,
            photo_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_upload_then_download_url() {
        let temp_dir = TempDir::new().unwrap();
        let photo = temp_dir.path().join("JPEG_20240101_101010_x1.jpg");
        std::fs::write(&photo, b"jpeg bytes").unwrap();

        let storage = DiskObjectStorage::new(temp_dir.path().join("store"));
        storage
            .upload("recipe_images", "JPEG_20240101_101010_x1.jpg", &photo)
            .await
            .unwrap();
        let url = storage
            .download_url("recipe_images", "JPEG_20240101_101010_x1.jpg")
            .await
            .unwrap();

        assert!(url.starts_with("file://"));
        assert!(url.ends_with("/objects/recipe_images/JPEG_20240101_101010_x1.jpg"));
    }

    #[tokio::test]
    async fn test_download_url_for_missing_object() {
        let temp_dir = TempDir::new().unwrap();
        let storage = DiskObjectStorage::new(temp_dir.path().to_path_buf());
        let err = storage.download_url("recipe_images", "nope.jpg").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let storage = DiskObjectStorage::new(temp_dir.path().to_path_buf());
        let result = storage
            .upload("recipe_images", "a.jpg", &temp_dir.path().join("missing.jpg"))
            .await;
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn test_create_get_list() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskDocumentStore::new(temp_dir.path().to_path_buf());

        let first = store.create("recipes", &record("first")).await.unwrap();
        let second = store.create("recipes", &record("second")).await.unwrap();
        assert_ne!(first, second);

        let doc = store.get("recipes", &first).await.unwrap();
        assert_eq!(doc.record.title, "first");

        let all = store.list("recipes").await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(store.list("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_skips_bad_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskDocumentStore::new(temp_dir.path().to_path_buf());
        let id = store.create("recipes", &record("kept")).await.unwrap();

        let dir = temp_dir.path().join("documents").join("recipes");
        std::fs::write(dir.join("binary.json"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();
        std::fs::write(dir.join("broken.json"), "{ not json").unwrap();

        let all = store.list("recipes").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
    }

    #[tokio::test]
    async fn test_get_missing_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskDocumentStore::new(temp_dir.path().to_path_buf());
        let err = store.get("recipes", "abc").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
