//! CreateRecord step - persists the recipe record in the document store.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::pipeline::{PipelineStep, StepContext, StepMetadata, StepResult};
use crate::storage::DocumentStore;
use crate::types::{CreateRecordOutput, FetchPhotoUrlOutput, RecipeRecord, RECIPES_COLLECTION};

use super::{failed, read_output, succeeded, FetchPhotoUrlStep};

/// Step that creates the recipe document.
///
/// With a photo attached, the photo URL must come from a completed
/// fetch_photo_url step; the step refuses to run otherwise so a local path
/// never ends up in a persisted record.
pub struct CreateRecordStep {
    documents: Arc<dyn DocumentStore>,
}

impl CreateRecordStep {
    /// Step name constant.
    pub const NAME: &'static str = "create_record";

    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl PipelineStep for CreateRecordStep {
    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Create recipe record in document store",
        }
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> StepResult {
        let start = Instant::now();

        let photo_url = if ctx.recipe.photo.is_some() {
            match read_output::<FetchPhotoUrlOutput>(ctx, FetchPhotoUrlStep::NAME) {
                Ok(o) => o.photo_url,
                Err(e) => return failed(Self::NAME, e, start),
            }
        } else {
            String::new()
        };

        let record = RecipeRecord {
            title: ctx.recipe.title.clone(),
            description: ctx.recipe.description.clone(),
            ingredients: ctx.recipe.ingredients.clone(),
            total_calories: ctx.recipe.total_calories,
            photo_url,
        };

        match self.documents.create(RECIPES_COLLECTION, &record).await {
            Ok(recipe_id) => {
                tracing::info!(
                    backend = self.documents.backend_name(),
                    collection = RECIPES_COLLECTION,
                    recipe_id = %recipe_id,
                    "create recipe"
                );
                let output = CreateRecordOutput { recipe_id, record };
                succeeded(Self::NAME, &output, None, start)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create recipe");
                failed(Self::NAME, e.to_string(), start)
            }
        }
    }
}
