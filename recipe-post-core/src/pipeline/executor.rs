//! Pipeline executor and step registry.

use std::collections::HashMap;

use tracing::{info_span, Instrument};

use crate::pipeline::step::{PipelineStep, StepContext, StepOutputStore, StepResult};
use crate::validation::ValidatedRecipe;

/// Registry that maps step names to their implementations.
pub struct StepRegistry {
    steps: HashMap<String, Box<dyn PipelineStep>>,
}

impl StepRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
        }
    }

    /// Register a step implementation.
    pub fn register(&mut self, step: Box<dyn PipelineStep>) {
        self.steps.insert(step.metadata().name.to_string(), step);
    }

    /// Get a step by name.
    pub fn get(&self, name: &str) -> Option<&dyn PipelineStep> {
        self.steps.get(name).map(|s| s.as_ref())
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a pipeline starting from the given step.
///
/// Each step returns `next_step` to indicate what runs next. Steps run strictly
/// one after another; the chain ends when a step returns `next_step: None`,
/// when a step fails, or when the next step is not registered.
pub async fn run_pipeline(
    first_step_name: &str,
    recipe: &ValidatedRecipe,
    store: &mut dyn StepOutputStore,
    registry: &StepRegistry,
) -> Vec<StepResult> {
    let mut results = Vec::new();
    let mut current_step_name = Some(first_step_name.to_string());

    while let Some(step_name) = current_step_name {
        let step = match registry.get(&step_name) {
            Some(s) => s,
            None => {
                tracing::warn!(step = %step_name, "Unknown pipeline step, stopping");
                break;
            }
        };

        let meta = step.metadata();
        let ctx = StepContext {
            recipe,
            outputs: &*store,
        };
        let result = step
            .execute(&ctx)
            .instrument(info_span!("pipeline_step", step = %step_name))
            .await;

        if result.success {
            if let Err(e) = store.save_output(meta.name, &result.output) {
                tracing::warn!("Failed to save output for step {}: {}", meta.name, e);
            }
        } else {
            tracing::debug!(
                step = meta.name,
                error = result.error.as_deref().unwrap_or(""),
                "Pipeline step failed"
            );
        }

        let succeeded = result.success;
        let next = result.next_step.clone();
        results.push(result);

        if !succeeded {
            break;
        }

        current_step_name = next;
    }

    results
}
