//! UploadPhoto step - uploads the attached photo to object storage.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::photo::PhotoKeyScheme;
use crate::pipeline::{PipelineStep, StepContext, StepMetadata, StepResult};
use crate::storage::ObjectStorage;
use crate::types::{UploadPhotoOutput, RECIPE_IMAGES_NAMESPACE};

use super::{failed, succeeded, FetchPhotoUrlStep};

/// Step that uploads the recipe photo under the recipe images namespace.
pub struct UploadPhotoStep {
    storage: Arc<dyn ObjectStorage>,
    key_scheme: PhotoKeyScheme,
}

impl UploadPhotoStep {
    /// Step name constant.
    pub const NAME: &'static str = "upload_photo";

    pub fn new(storage: Arc<dyn ObjectStorage>, key_scheme: PhotoKeyScheme) -> Self {
        Self {
            storage,
            key_scheme,
        }
    }
}

#[async_trait]
impl PipelineStep for UploadPhotoStep {
    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Upload recipe photo to object storage",
        }
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> StepResult {
        let start = Instant::now();

        let Some(photo) = ctx.recipe.photo.as_deref() else {
            return failed(Self::NAME, "No photo attached".to_string(), start);
        };

        let key = match self.key_scheme.key_for(photo).await {
            Ok(k) => k,
            Err(e) => return failed(Self::NAME, format!("Failed to derive photo key: {}", e), start),
        };

        tracing::info!(
            backend = self.storage.backend_name(),
            namespace = RECIPE_IMAGES_NAMESPACE,
            key = %key,
            "Uploading recipe photo"
        );

        if let Err(e) = self
            .storage
            .upload(RECIPE_IMAGES_NAMESPACE, &key, photo)
            .await
        {
            return failed(Self::NAME, e.to_string(), start);
        }

        let output = UploadPhotoOutput {
            namespace: RECIPE_IMAGES_NAMESPACE.to_string(),
            key,
        };
        succeeded(Self::NAME, &output, Some(FetchPhotoUrlStep::NAME), start)
    }
}
