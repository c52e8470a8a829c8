//! Submission step implementations.

mod create_record;
mod fetch_photo_url;
mod upload_photo;

pub use create_record::CreateRecordStep;
pub use fetch_photo_url::FetchPhotoUrlStep;
pub use upload_photo::UploadPhotoStep;

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::pipeline::{StepContext, StepResult};

fn succeeded<T: Serialize>(
    step_name: &str,
    output: &T,
    next_step: Option<&str>,
    start: Instant,
) -> StepResult {
    match serde_json::to_value(output) {
        Ok(output) => StepResult {
            step_name: step_name.to_string(),
            success: true,
            output,
            error: None,
            duration_ms: start.elapsed().as_millis() as u64,
            next_step: next_step.map(str::to_string),
        },
        Err(e) => failed(step_name, format!("Failed to serialize output: {}", e), start),
    }
}

fn failed(step_name: &str, error: String, start: Instant) -> StepResult {
    StepResult {
        step_name: step_name.to_string(),
        success: false,
        output: serde_json::Value::Null,
        error: Some(error),
        duration_ms: start.elapsed().as_millis() as u64,
        next_step: None,
    }
}

/// Read and decode a prior step's output.
fn read_output<T: DeserializeOwned>(ctx: &StepContext<'_>, step_name: &str) -> Result<T, String> {
    let value = ctx
        .outputs
        .get_output(step_name)
        .ok_or_else(|| format!("Missing output from {}", step_name))?;
    serde_json::from_value(value).map_err(|e| format!("Invalid output from {}: {}", step_name, e))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::photo::PhotoKeyScheme;
    use crate::pipeline::{MemoryOutputStore, PipelineStep, StepOutputStore};
    use crate::storage::{FakeDocumentStore, FakeObjectStorage, StorageCall};
    use crate::types::{IngredientEntry, SubmitStep};
    use crate::validation::ValidatedRecipe;

    fn recipe(photo: Option<&str>) -> ValidatedRecipe {
        ValidatedRecipe {
            title: "Granola".to_string(),
            description: "Crunchy".to_string(),
            ingredients: vec![IngredientEntry::new("oats", 300)],
            total_calories: 450.0,
            photo: photo.map(PathBuf::from),
        }
    }

    #[test]
    fn step_names_match_submit_steps() {
        let names = [
            UploadPhotoStep::NAME,
            FetchPhotoUrlStep::NAME,
            CreateRecordStep::NAME,
        ];
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());

        for (name, step) in names.iter().zip(SubmitStep::ALL) {
            assert_eq!(*name, step.as_str());
        }
    }

    #[tokio::test]
    async fn test_upload_uses_file_name_key() {
        let storage = Arc::new(FakeObjectStorage::new());
        let step = UploadPhotoStep::new(storage.clone(), PhotoKeyScheme::FileName);
        let recipe = recipe(Some("/pics/JPEG_20240101_090000_q1.jpg"));
        let store = MemoryOutputStore::new();
        let ctx = StepContext {
            recipe: &recipe,
            outputs: &store,
        };

        let result = step.execute(&ctx).await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.next_step.as_deref(), Some("fetch_photo_url"));
        assert_eq!(
            result.output,
            json!({ "namespace": "recipe_images", "key": "JPEG_20240101_090000_q1.jpg" })
        );
        assert_eq!(
            storage.calls(),
            vec![StorageCall::Upload {
                namespace: "recipe_images".to_string(),
                key: "JPEG_20240101_090000_q1.jpg".to_string(),
                local_file: PathBuf::from("/pics/JPEG_20240101_090000_q1.jpg"),
            }]
        );
    }

    #[tokio::test]
    async fn test_upload_without_photo_fails() {
        let step = UploadPhotoStep::new(Arc::new(FakeObjectStorage::new()), PhotoKeyScheme::FileName);
        let recipe = recipe(None);
        let store = MemoryOutputStore::new();
        let ctx = StepContext {
            recipe: &recipe,
            outputs: &store,
        };

        let result = step.execute(&ctx).await;
        assert!(!result.success);
        assert!(result.next_step.is_none());
    }

    #[tokio::test]
    async fn test_fetch_url_needs_upload_output() {
        let step = FetchPhotoUrlStep::new(Arc::new(FakeObjectStorage::new()));
        let recipe = recipe(Some("/pics/a.jpg"));
        let store = MemoryOutputStore::new();
        let ctx = StepContext {
            recipe: &recipe,
            outputs: &store,
        };

        let result = step.execute(&ctx).await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Missing output from upload_photo")
        );
    }

    #[tokio::test]
    async fn test_fetch_url_reads_upload_output() {
        let storage = Arc::new(FakeObjectStorage::new().with_download_url("https://x/y.jpg"));
        let step = FetchPhotoUrlStep::new(storage);
        let recipe = recipe(Some("/pics/a.jpg"));
        let mut store = MemoryOutputStore::new();
        store
            .save_output(
                "upload_photo",
                &json!({ "namespace": "recipe_images", "key": "a.jpg" }),
            )
            .unwrap();
        let ctx = StepContext {
            recipe: &recipe,
            outputs: &store,
        };

        let result = step.execute(&ctx).await;
        assert!(result.success);
        assert_eq!(result.output, json!({ "photo_url": "https://x/y.jpg" }));
        assert_eq!(result.next_step.as_deref(), Some("create_record"));
    }

    #[tokio::test]
    async fn test_create_record_refuses_photo_without_url() {
        let documents = Arc::new(FakeDocumentStore::new());
        let step = CreateRecordStep::new(documents.clone());
        let recipe = recipe(Some("/pics/a.jpg"));
        let store = MemoryOutputStore::new();
        let ctx = StepContext {
            recipe: &recipe,
            outputs: &store,
        };

        let result = step.execute(&ctx).await;
        assert!(!result.success);
        assert!(documents.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_record_without_photo() {
        let documents = Arc::new(FakeDocumentStore::new());
        let step = CreateRecordStep::new(documents.clone());
        let recipe = recipe(None);
        let store = MemoryOutputStore::new();
        let ctx = StepContext {
            recipe: &recipe,
            outputs: &store,
        };

        let result = step.execute(&ctx).await;
        assert!(result.success);
        assert!(result.next_step.is_none());
        assert_eq!(result.output["recipe_id"], json!("doc-1"));

        let created = documents.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].photo_url, "");
        assert_eq!(created[0].total_calories, 450.0);
    }
}
