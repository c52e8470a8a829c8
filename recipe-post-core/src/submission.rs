//! Submission orchestration: validate, stage the photo, persist the record.

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::draft::RecipeDraft;
use crate::error::ValidationError;
use crate::photo::PhotoKeyScheme;
use crate::pipeline::steps::{CreateRecordStep, FetchPhotoUrlStep, UploadPhotoStep};
use crate::pipeline::{run_pipeline, MemoryOutputStore, StepRegistry, StepResult};
use crate::storage::Backend;
use crate::types::{CreateRecordOutput, RecipeRecord, SubmitStep};
use crate::validation::validate;

/// Notice shown after the record was created.
pub const NOTICE_RECIPE_CREATED: &str = "recipe created";

/// Notice shown when the record could not be created.
pub const NOTICE_CREATE_FAILED: &str = "recipe created failed";

/// Notice shown when the photo could not be uploaded.
pub const NOTICE_UPLOAD_FAILED: &str = "upload photo failed";

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A submission is already in progress")]
    AlreadySubmitting,

    #[error("Photo upload failed: {0}")]
    PhotoUpload(String),

    #[error("Recipe creation failed: {0}")]
    Persist(String),
}

impl SubmitError {
    /// The user-visible text for this failure.
    pub fn notice(&self) -> String {
        match self {
            SubmitError::Validation(e) => e.to_string(),
            SubmitError::AlreadySubmitting => self.to_string(),
            SubmitError::PhotoUpload(_) => NOTICE_UPLOAD_FAILED.to_string(),
            SubmitError::Persist(_) => NOTICE_CREATE_FAILED.to_string(),
        }
    }
}

/// A successful submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub recipe_id: String,
    pub record: RecipeRecord,
    /// Every step that ran, in order.
    pub steps: Vec<StepResult>,
}

impl SubmitOutcome {
    pub fn notice(&self) -> &'static str {
        NOTICE_RECIPE_CREATED
    }
}

/// Where the submitter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    /// The last attempt failed after validation; a new attempt is allowed.
    Failed,
}

/// Runs submissions against a backend, one at a time.
pub struct RecipeSubmitter {
    registry: StepRegistry,
    state: Mutex<SubmitState>,
}

impl RecipeSubmitter {
    pub fn new(backend: Backend, key_scheme: PhotoKeyScheme) -> Self {
        let mut registry = StepRegistry::new();
        registry.register(Box::new(UploadPhotoStep::new(
            backend.objects.clone(),
            key_scheme,
        )));
        registry.register(Box::new(FetchPhotoUrlStep::new(backend.objects)));
        registry.register(Box::new(CreateRecordStep::new(backend.documents)));

        Self {
            registry,
            state: Mutex::new(SubmitState::Idle),
        }
    }

    pub fn state(&self) -> SubmitState {
        *self.lock_state()
    }

    fn lock_state(&self) -> MutexGuard<'_, SubmitState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Submit a draft.
    ///
    /// The draft is only read; whatever happens it is left as it was so the
    /// user can retry. Validation runs first, even while another submission
    /// is in flight; its failures make no collaborator calls and leave the
    /// submitter's state as it was.
    pub async fn submit(&self, draft: &RecipeDraft) -> Result<SubmitOutcome, SubmitError> {
        let recipe = validate(draft)?;
        let mut guard = InFlight::begin(self)?;

        let first_step = if recipe.photo.is_some() {
            UploadPhotoStep::NAME
        } else {
            CreateRecordStep::NAME
        };

        let mut store = MemoryOutputStore::new();
        let steps = run_pipeline(first_step, &recipe, &mut store, &self.registry).await;

        match into_outcome(steps) {
            Ok(outcome) => {
                guard.finish(SubmitState::Idle);
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Recipe submission failed");
                guard.finish(SubmitState::Failed);
                Err(e)
            }
        }
    }
}

fn into_outcome(steps: Vec<StepResult>) -> Result<SubmitOutcome, SubmitError> {
    let Some(last) = steps.last() else {
        return Err(SubmitError::Persist("No pipeline step ran".to_string()));
    };

    if !last.success {
        let message = last
            .error
            .clone()
            .unwrap_or_else(|| "unknown error".to_string());
        return match SubmitStep::from_name(&last.step_name) {
            Some(step) if step.is_photo_stage() => Err(SubmitError::PhotoUpload(message)),
            _ => Err(SubmitError::Persist(message)),
        };
    }

    if SubmitStep::from_name(&last.step_name) != Some(SubmitStep::CreateRecord) {
        return Err(SubmitError::Persist(format!(
            "Pipeline stopped after {}",
            last.step_name
        )));
    }

    let created: CreateRecordOutput = serde_json::from_value(last.output.clone())
        .map_err(|e| SubmitError::Persist(format!("Invalid create_record output: {}", e)))?;

    Ok(SubmitOutcome {
        recipe_id: created.recipe_id,
        record: created.record,
        steps,
    })
}

/// Marks the submitter busy for the lifetime of one attempt.
///
/// Dropping without `finish` (the submit future was cancelled) records the
/// attempt as failed.
struct InFlight<'a> {
    submitter: &'a RecipeSubmitter,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn begin(submitter: &'a RecipeSubmitter) -> Result<Self, SubmitError> {
        let mut state = submitter.lock_state();
        if *state == SubmitState::Submitting {
            return Err(SubmitError::AlreadySubmitting);
        }
        *state = SubmitState::Submitting;
        Ok(Self {
            submitter,
            finished: false,
        })
    }

    fn finish(&mut self, next: SubmitState) {
        *self.submitter.lock_state() = next;
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.submitter.lock_state() = SubmitState::Failed;
        }
    }
}
