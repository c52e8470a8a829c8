//! Submit-time validation of the compose form.

use std::path::PathBuf;

use crate::draft::RecipeDraft;
use crate::error::ValidationError;
use crate::types::IngredientEntry;

/// Values captured from a draft once it passed validation.
///
/// Later edits to the draft do not affect an in-flight submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<IngredientEntry>,
    pub total_calories: f64,
    pub photo: Option<PathBuf>,
}

/// Validate the draft, stopping at the first failing field.
///
/// Order: title, description, total kCal present, total kCal numeric.
pub fn validate(draft: &RecipeDraft) -> Result<ValidatedRecipe, ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if draft.description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    if draft.total_calories.is_empty() {
        return Err(ValidationError::EmptyTotalCalories);
    }
    let total_calories = parse_total_calories(&draft.total_calories)?;

    Ok(ValidatedRecipe {
        title: draft.title.clone(),
        description: draft.description.clone(),
        ingredients: draft.ingredients().to_vec(),
        total_calories,
        photo: draft.photo().map(|p| p.to_path_buf()),
    })
}

fn parse_total_calories(text: &str) -> Result<f64, ValidationError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidTotalCalories(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> RecipeDraft {
        let mut draft = RecipeDraft::new();
        draft.title = "Banana bread".to_string();
        draft.description = "Moist and dense".to_string();
        draft.add_ingredient(IngredientEntry::new("banana", 105));
        draft
    }

    #[test]
    fn test_empty_title_reported_first() {
        let draft = RecipeDraft::new();
        let err = validate(&draft).unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
        assert_eq!(err.to_string(), "Title cannot be empty!");
    }

    #[test]
    fn test_whitespace_title_is_empty() {
        let mut draft = valid_draft();
        draft.title = "   ".to_string();
        assert_eq!(validate(&draft).unwrap_err(), ValidationError::EmptyTitle);
    }

    #[test]
    fn test_empty_description() {
        let mut draft = valid_draft();
        draft.description.clear();
        assert_eq!(
            validate(&draft).unwrap_err().to_string(),
            "Description cannot be empty!"
        );
    }

    #[test]
    fn test_empty_total() {
        let mut draft = valid_draft();
        draft.total_calories.clear();
        assert_eq!(
            validate(&draft).unwrap_err().to_string(),
            "Total kCal cannot be empty!"
        );
    }

    #[test]
    fn test_non_numeric_total() {
        for text in ["abc", "12kcal", " ", "NaN", "inf"] {
            let mut draft = valid_draft();
            draft.total_calories = text.to_string();
            assert_eq!(
                validate(&draft).unwrap_err(),
                ValidationError::InvalidTotalCalories(text.to_string()),
                "expected {:?} to be rejected",
                text
            );
        }
    }

    #[test]
    fn test_total_uses_displayed_text_not_sum() {
        let mut draft = valid_draft();
        draft.total_calories = " 412.5 ".to_string();
        let recipe = validate(&draft).unwrap();
        assert_eq!(recipe.total_calories, 412.5);
        assert_eq!(draft.ingredient_kcal(), 105);
    }

    #[test]
    fn test_captures_fields() {
        let mut draft = valid_draft();
        draft.attach_photo(PathBuf::from("/pics/JPEG_20240101_120000_abc.jpg"));
        let recipe = validate(&draft).unwrap();
        assert_eq!(recipe.title, "Banana bread");
        assert_eq!(recipe.ingredients.len(), 1);
        assert_eq!(recipe.total_calories, 105.0);
        assert_eq!(
            recipe.photo.as_deref(),
            Some(std::path::Path::new("/pics/JPEG_20240101_120000_abc.jpg"))
        );
    }
}
