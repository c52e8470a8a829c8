//! The compose-recipe screen, minus rendering.
//!
//! `RecipeComposer` owns the draft and the form's error line and wires user
//! actions to the collaborators: the ingredient picker, the camera, and the
//! submitter.

use std::sync::Arc;

use crate::draft::RecipeDraft;
use crate::error::CaptureError;
use crate::photo::{discard, PhotoCapture, TakePhotoResult};
use crate::picker::IngredientPicker;
use crate::submission::{RecipeSubmitter, SubmitError, SubmitOutcome};
use crate::types::IngredientEntry;

pub struct RecipeComposer {
    draft: RecipeDraft,
    error_message: String,
    picker: Arc<dyn IngredientPicker>,
    photo_capture: PhotoCapture,
    submitter: Arc<RecipeSubmitter>,
}

impl RecipeComposer {
    pub fn new(
        picker: Arc<dyn IngredientPicker>,
        photo_capture: PhotoCapture,
        submitter: Arc<RecipeSubmitter>,
    ) -> Self {
        Self {
            draft: RecipeDraft::new(),
            error_message: String::new(),
            picker,
            photo_capture,
            submitter,
        }
    }

    pub fn draft(&self) -> &RecipeDraft {
        &self.draft
    }

    /// Direct access for text-field edits.
    pub fn draft_mut(&mut self) -> &mut RecipeDraft {
        &mut self.draft
    }

    /// The message at the top of the form; empty when there is none.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Open the ingredient picker and append whatever it returns.
    pub async fn add_ingredient(&mut self) -> Option<&IngredientEntry> {
        let entry = self.picker.pick_one().await?;
        tracing::debug!(ingredient = %entry.name, kcal = entry.kcal, "Ingredient added");
        self.draft.add_ingredient(entry);
        self.draft.ingredients().last()
    }

    pub fn remove_ingredient(&mut self, index: usize) -> Option<IngredientEntry> {
        self.draft.remove_ingredient(index)
    }

    /// Take a photo and attach it on success, replacing and deleting any
    /// earlier capture.
    ///
    /// Cancellation, a missing permission, or a camera failure leave the
    /// draft's photo as it was.
    pub async fn take_photo(&mut self) -> Result<TakePhotoResult, CaptureError> {
        let result = self.photo_capture.take_photo().await?;
        if let TakePhotoResult::Captured(path) = &result {
            if let Some(previous) = self.draft.clear_photo() {
                discard(&previous).await;
            }
            self.draft.attach_photo(path.clone());
        }
        Ok(result)
    }

    /// Remove the attached photo, if any, and delete its file.
    pub async fn clear_photo(&mut self) {
        if let Some(path) = self.draft.clear_photo() {
            tracing::debug!(path = %path.display(), "Photo removed from draft");
            discard(&path).await;
        }
    }

    /// Submit the draft.
    ///
    /// Validation failures are also written to the form's error line. On
    /// success the caller should close the screen; on any failure the draft
    /// is untouched so the user can retry.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        self.error_message.clear();

        let result = self.submitter.submit(&self.draft).await;
        if let Err(SubmitError::Validation(e)) = &result {
            self.error_message = e.to_string();
        }
        result
    }
}
