//! Ingredient picker collaborator.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::types::IngredientEntry;

/// A dialog that yields at most one ingredient per invocation.
#[async_trait]
pub trait IngredientPicker: Send + Sync {
    /// `None` when the user closed the picker without choosing.
    async fn pick_one(&self) -> Option<IngredientEntry>;
}

/// A picker that hands out pre-loaded entries in order, then `None`.
#[derive(Debug, Default)]
pub struct QueuedPicker {
    queue: Mutex<VecDeque<IngredientEntry>>,
}

impl QueuedPicker {
    pub fn new(entries: impl IntoIterator<Item = IngredientEntry>) -> Self {
        Self {
            queue: Mutex::new(entries.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue
            .lock()
            .map(|q| q.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}

#[async_trait]
impl IngredientPicker for QueuedPicker {
    async fn pick_one(&self) -> Option<IngredientEntry> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }
}
