//! Cloud Storage for Firebase and Cloud Firestore over their REST APIs.
//!
//! Requests are unauthenticated; the target project's security rules must
//! allow them.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use std::path::Path;

use super::{DocumentStore, ObjectStorage};
use crate::error::StorageError;
use crate::types::RecipeRecord;

/// Default Cloud Storage for Firebase endpoint.
pub const STORAGE_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// Default Cloud Firestore endpoint.
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StorageError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Object metadata returned by the storage API (only what we read).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Object storage backed by a Firebase Storage bucket.
#[derive(Debug, Clone)]
pub struct FirebaseStorage {
    client: reqwest::Client,
    bucket: String,
    base_url: String,
}

impl FirebaseStorage {
    pub fn new(client: reqwest::Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            base_url: STORAGE_BASE_URL.to_string(),
        }
    }

    /// Point at a different endpoint (e.g., the local emulator).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn objects_url(&self) -> String {
        format!("{}/b/{}/o", self.base_url, self.bucket)
    }

    /// URL of a single object; the object name is encoded as one path segment.
    fn object_url(&self, namespace: &str, key: &str) -> String {
        let name = format!("{}/{}", namespace, key);
        format!("{}/{}", self.objects_url(), urlencoding::encode(&name))
    }

    fn media_url(&self, namespace: &str, key: &str, token: &str) -> String {
        format!(
            "{}?alt=media&token={}",
            self.object_url(namespace, key),
            urlencoding::encode(token)
        )
    }
}

#[async_trait]
impl ObjectStorage for FirebaseStorage {
    async fn upload(
        &self,
        namespace: &str,
        key: &str,
        local_file: &Path,
    ) -> Result<(), StorageError> {
        let data = tokio::fs::read(local_file).await?;
        let content_type = mime_guess::from_path(local_file)
            .first_or_octet_stream()
            .to_string();
        let name = format!("{}/{}", namespace, key);

        tracing::debug!(object = %name, bytes = data.len(), "firebase: uploading object");
        let response = self
            .client
            .post(self.objects_url())
            .query(&[("name", name.as_str())])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;
        error_for_status(response).await?;
        Ok(())
    }

    async fn download_url(&self, namespace: &str, key: &str) -> Result<String, StorageError> {
        let response = self
            .client
            .get(self.object_url(namespace, key))
            .send()
            .await?;
        let metadata: ObjectMetadata = error_for_status(response).await?.json().await?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
            .ok_or_else(|| {
                StorageError::InvalidResponse(format!(
                    "No download token for {}/{}",
                    namespace, key
                ))
            })?;

        Ok(self.media_url(namespace, key, token))
    }

    fn backend_name(&self) -> &'static str {
        "firebase"
    }
}

/// Response of a Firestore document create.
#[derive(Debug, Deserialize)]
struct CreatedDocument {
    name: String,
}

/// Document store backed by Cloud Firestore.
#[derive(Debug, Clone)]
pub struct Firestore {
    client: reqwest::Client,
    project_id: String,
    base_url: String,
}

impl Firestore {
    pub fn new(client: reqwest::Client, project_id: &str) -> Self {
        Self {
            client,
            project_id: project_id.to_string(),
            base_url: FIRESTORE_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, collection
        )
    }
}

#[async_trait]
impl DocumentStore for Firestore {
    async fn create(&self, collection: &str, record: &RecipeRecord) -> Result<String, StorageError> {
        let body = json!({ "fields": to_firestore_fields(record)? });

        let response = self
            .client
            .post(self.collection_url(collection))
            .json(&body)
            .send()
            .await?;
        let created: CreatedDocument = error_for_status(response).await?.json().await?;

        created
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                StorageError::InvalidResponse(format!("Unexpected document name: {}", created.name))
            })
    }

    fn backend_name(&self) -> &'static str {
        "firebase"
    }
}

/// Encode a record as a Firestore `fields` map.
pub fn to_firestore_fields(record: &RecipeRecord) -> Result<Map<String, JsonValue>, StorageError> {
    match serde_json::to_value(record)? {
        JsonValue::Object(map) => Ok(encode_map(&map)),
        other => Err(StorageError::InvalidResponse(format!(
            "Record did not serialize to an object: {}",
            other
        ))),
    }
}

fn encode_map(map: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    map.iter()
        .map(|(k, v)| (k.clone(), to_firestore_value(v)))
        .collect()
}

/// Wrap a JSON value in Firestore's typed value representation.
fn to_firestore_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Null => json!({ "nullValue": null }),
        JsonValue::Bool(b) => json!({ "booleanValue": b }),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Firestore expects int64 values as strings
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        JsonValue::String(s) => json!({ "stringValue": s }),
        JsonValue::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore_value).collect::<Vec<_>>() }
        }),
        JsonValue::Object(map) => json!({ "mapValue": { "fields": encode_map(map) } }),
    }
}
