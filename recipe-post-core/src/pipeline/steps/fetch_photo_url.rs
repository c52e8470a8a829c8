//! FetchPhotoUrl step - resolves the download URL of the uploaded photo.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::pipeline::{PipelineStep, StepContext, StepMetadata, StepResult};
use crate::storage::ObjectStorage;
use crate::types::{FetchPhotoUrlOutput, UploadPhotoOutput};

use super::{failed, read_output, succeeded, CreateRecordStep, UploadPhotoStep};

pub struct FetchPhotoUrlStep {
    storage: Arc<dyn ObjectStorage>,
}

impl FetchPhotoUrlStep {
    /// Step name constant.
    pub const NAME: &'static str = "fetch_photo_url";

    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl PipelineStep for FetchPhotoUrlStep {
    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Fetch download URL of uploaded photo",
        }
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> StepResult {
        let start = Instant::now();

        let uploaded: UploadPhotoOutput = match read_output(ctx, UploadPhotoStep::NAME) {
            Ok(o) => o,
            Err(e) => return failed(Self::NAME, e, start),
        };

        match self
            .storage
            .download_url(&uploaded.namespace, &uploaded.key)
            .await
        {
            Ok(photo_url) => {
                tracing::debug!(key = %uploaded.key, url = %photo_url, "Resolved photo URL");
                let output = FetchPhotoUrlOutput { photo_url };
                succeeded(Self::NAME, &output, Some(CreateRecordStep::NAME), start)
            }
            Err(e) => failed(Self::NAME, e.to_string(), start),
        }
    }
}
