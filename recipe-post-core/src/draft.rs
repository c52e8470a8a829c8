//! The in-progress recipe post held by the compose screen.

use std::path::{Path, PathBuf};

use crate::types::IngredientEntry;

/// A recipe being composed. Nothing here is persisted until submission.
///
/// `total_calories` is the text of the total field, not a number. Changing the
/// ingredient list rewrites it with the ingredient sum, but the user may edit
/// it afterwards and submission uses whatever text is there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub total_calories: String,
    ingredients: Vec<IngredientEntry>,
    photo: Option<PathBuf>,
}

impl RecipeDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingredients(&self) -> &[IngredientEntry] {
        &self.ingredients
    }

    /// Append an ingredient and recompute the total field.
    pub fn add_ingredient(&mut self, entry: IngredientEntry) {
        self.ingredients.push(entry);
        self.recompute_total();
    }

    /// Remove the ingredient at `index` and recompute the total field.
    pub fn remove_ingredient(&mut self, index: usize) -> Option<IngredientEntry> {
        if index >= self.ingredients.len() {
            return None;
        }
        let removed = self.ingredients.remove(index);
        self.recompute_total();
        Some(removed)
    }

    /// Sum of the ingredients' kcal.
    pub fn ingredient_kcal(&self) -> u64 {
        self.ingredients.iter().map(|i| u64::from(i.kcal)).sum()
    }

    fn recompute_total(&mut self) {
        self.total_calories = self.ingredient_kcal().to_string();
    }

    pub fn photo(&self) -> Option<&Path> {
        self.photo.as_deref()
    }

    pub fn attach_photo(&mut self, path: PathBuf) {
        self.photo = Some(path);
    }

    /// Detach the photo. Returns the previous path, if any.
    pub fn clear_photo(&mut self) -> Option<PathBuf> {
        self.photo.take()
    }

    /// Whether the delete-photo affordance should be shown.
    pub fn delete_photo_visible(&self) -> bool {
        self.photo.is_some()
    }
}
