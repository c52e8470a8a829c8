//! Step pipeline for submitting a recipe.
//!
//! This module provides a trait-based pipeline where:
//! - Steps are defined via the `PipelineStep` trait
//! - Each step returns `next_step` to indicate what runs next
//! - Outputs of earlier steps are read back through a `StepOutputStore`
//!
//! A submission runs `upload_photo` → `fetch_photo_url` → `create_record`,
//! or only `create_record` when no photo is attached.

mod executor;
mod step;
pub mod steps;

pub use executor::{run_pipeline, StepRegistry};
pub use step::{
    MemoryOutputStore, PipelineStep, StepContext, StepMetadata, StepOutputStore, StepResult,
};
